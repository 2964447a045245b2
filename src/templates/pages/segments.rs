use crate::analytics::market::SegmentStats;
use crate::templates::desktop_layout;
use crate::templates::pages::fmt_tl;
use maud::{html, Markup};

pub fn segments_page(city: &str, stats: &[SegmentStats]) -> Markup {
    desktop_layout(
        "Segments",
        city,
        html! {
            main class="container" {
                h1 { "Market Segments" }
                p {
                    "Robust statistics per (kind, district, rooms) segment, computed over "
                    "one representative listing per dwelling. "
                    a href="/export/segments.csv" { "Download CSV" }
                }

                @if stats.is_empty() {
                    p { "No segment has enough clean listings to display yet." }
                } @else {
                    table {
                        thead {
                            tr {
                                th { "Kind" }
                                th { "District" }
                                th { "Rooms" }
                                th { "Count" }
                                th { "Median" }
                                th { "P25" }
                                th { "P75" }
                                th { "TL/m² (median)" }
                                th { "TL/m² (MAD)" }
                                th { "Gross yield" }
                            }
                        }
                        tbody {
                            @for s in stats {
                                tr {
                                    td { (s.listing_kind) }
                                    td { (s.district) }
                                    td { (s.rooms_key) }
                                    td { (s.count) }
                                    td { (fmt_tl(s.median_price as i64)) }
                                    td { (fmt_tl(s.p25_price as i64)) }
                                    td { (fmt_tl(s.p75_price as i64)) }
                                    td {
                                        @match s.median_ppm2 {
                                            Some(v) => { (format!("{v:.0}")) }
                                            None => { "-" }
                                        }
                                    }
                                    td {
                                        @match s.mad_ppm2 {
                                            Some(v) => { (format!("{v:.0}")) }
                                            None => { "-" }
                                        }
                                    }
                                    td {
                                        @match s.gross_yield {
                                            Some(y) => { (format!("{:.1}%", y * 100.0)) }
                                            None => { "-" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
