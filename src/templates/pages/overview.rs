use crate::analytics::market::MarketOverview;
use crate::templates::pages::{fmt_tl, fmt_unix};
use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

pub fn overview_page(city: &str, vm: &MarketOverview) -> Markup {
    desktop_layout(
        "Overview",
        city,
        html! {
            main class="container" {
                h1 { "Market Overview" }

                section class="card" {
                    h3 { "Inventory" }
                    p { "Tracked listings: " strong { (vm.total_listings) } }
                    p { "Distinct dwellings: " strong { (vm.total_dwellings) } }
                    p { "New this month: " strong { (vm.new_this_month) } }
                    p { "Stale (unseen > 14 days): " strong { (vm.stale) } }
                    p { "Delisted (unseen > 30 days): " strong { (vm.delisted) } }
                }

                section class="card" {
                    h3 { "Prices" }
                    @match vm.median_sale_price {
                        Some(p) => p { "Median sale price: " strong { (fmt_tl(p as i64)) } },
                        None => p { "Median sale price: " strong { "n/a" } },
                    }
                    @match vm.median_rent_price {
                        Some(p) => p { "Median rent: " strong { (fmt_tl(p as i64)) } },
                        None => p { "Median rent: " strong { "n/a" } },
                    }
                }

                (card("Top districts", html! {
                    @if vm.top_districts.is_empty() {
                        p { "No clean listings yet. Run a scrape to populate the database." }
                    } @else {
                        ul {
                            @for (district, count) in &vm.top_districts {
                                li { (district) ": " (count) " dwellings" }
                            }
                        }
                    }
                }))

                section class="card" {
                    h3 { "Collector" }
                    @match &vm.last_run {
                        Some(run) => {
                            p { "Last run: " (fmt_unix(run.started_at)) " (" (run.source) ")" }
                            @match run.success {
                                Some(true) => p { "Result: " strong { "ok" } ", "
                                    (run.listings_saved.unwrap_or(0)) " saved, "
                                    (run.listings_rejected.unwrap_or(0)) " rejected" },
                                Some(false) => p { "Result: " strong { "failed" } },
                                None => p { "Result: unknown" },
                            }
                        }
                        None => p { "No scrape runs yet." }
                    }
                    form action="/scrape" method="post" {
                        button type="submit" { "Start scrape" }
                    }
                }
            }
        },
    )
}
