use crate::templates::desktop_layout;
use crate::templates::pages::fmt_tl;
use crate::valuation::comps::CompEstimate;
use crate::valuation::model::HedonicFit;
use crate::valuation::Subject;
use maud::{html, Markup};

pub fn estimate_page(city: &str) -> Markup {
    desktop_layout(
        "Estimate",
        city,
        html! {
            main class="container" {
                h1 { "Price Estimate" }
                p { "Describe the dwelling; both models run over the clean, deduplicated inventory." }

                form action="/estimate/result" method="get" class="card" {
                    p {
                        label for="kind" { "Kind " }
                        select name="kind" id="kind" {
                            option value="sale" { "Sale" }
                            option value="rent" { "Rent" }
                        }
                    }
                    p {
                        label for="district" { "District " }
                        input type="text" name="district" id="district" required placeholder="Kadıköy";
                    }
                    p {
                        label for="rooms" { "Rooms " }
                        input type="number" name="rooms" id="rooms" required min="0" value="2";
                        label for="living_rooms" { " + " }
                        input type="number" name="living_rooms" id="living_rooms" required min="0" value="1";
                    }
                    p {
                        label for="net_m2" { "Net m² " }
                        input type="number" name="net_m2" id="net_m2" required min="10" step="0.5" placeholder="95";
                    }
                    p {
                        label for="building_age" { "Building age (optional) " }
                        input type="number" name="building_age" id="building_age" min="0";
                    }
                    p {
                        label for="floor" { "Floor (optional) " }
                        input type="number" name="floor" id="floor";
                    }
                    p {
                        label for="furnished" { "Furnished " }
                        input type="checkbox" name="furnished" id="furnished" value="1";
                    }
                    button type="submit" { "Estimate" }
                }
            }
        },
    )
}

pub struct EstimateVm {
    pub subject: Subject,
    /// Fit plus the predicted price for the subject.
    pub hedonic: Option<(HedonicFit, f64)>,
    pub comps: Option<CompEstimate>,
}

pub fn estimate_result_page(city: &str, vm: &EstimateVm) -> Markup {
    let s = &vm.subject;
    desktop_layout(
        "Estimate",
        city,
        html! {
            main class="container" {
                h1 { "Price Estimate" }
                p {
                    "Subject: " strong { (s.rooms_key()) } " in " strong { (s.district) }
                    ", " (format!("{:.0}", s.net_m2)) " m² net ("
                    (s.listing_kind) ")"
                }

                section class="card" {
                    h3 { "Hedonic model" }
                    @match &vm.hedonic {
                        Some((fit, prediction)) => {
                            p { "Estimate: " strong { (fmt_tl(*prediction as i64)) } }
                            p {
                                "Fitted on " (fit.n) " listings, R² = "
                                (format!("{:.2}", fit.r_squared)) " (log space)"
                            }
                        }
                        None => p {
                            "Not enough clean listings of this kind to fit the model."
                        }
                    }
                }

                section class="card" {
                    h3 { "Comparables" }
                    @match &vm.comps {
                        Some(est) => {
                            p { "Estimate: " strong { (fmt_tl(est.estimate as i64)) } }
                            p {
                                "Range " (fmt_tl(est.low as i64)) " – " (fmt_tl(est.high as i64))
                                ", from " (est.comp_count) " comparable listings"
                            }
                        }
                        None => p {
                            "No comparable listings in this district and room layout yet."
                        }
                    }
                }

                p { a href="/estimate" { "New estimate" } }
            }
        },
    )
}
