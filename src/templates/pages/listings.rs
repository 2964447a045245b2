use crate::domain::listing::ListingRow;
use crate::templates::desktop_layout;
use crate::templates::pages::fmt_tl;
use maud::{html, Markup};

pub struct ListingFilters {
    pub kind: Option<String>,
    pub district: Option<String>,
    pub rooms: Option<String>,
}

pub fn listings_page(city: &str, rows: &[ListingRow], filters: &ListingFilters) -> Markup {
    desktop_layout(
        "Listings",
        city,
        html! {
            main class="container" {
                h1 { "Listings" }

                form action="/listings" method="get" style="display: flex; gap: 10px; align-items: center; margin-bottom: 1rem;" {
                    select name="kind" style="padding: 8px;" {
                        option value="" selected[filters.kind.is_none()] { "Sale + Rent" }
                        option value="sale" selected[filters.kind.as_deref() == Some("sale")] { "Sale" }
                        option value="rent" selected[filters.kind.as_deref() == Some("rent")] { "Rent" }
                    }
                    input type="text" name="district" placeholder="District"
                        value=(filters.district.as_deref().unwrap_or(""))
                        style="padding: 8px;";
                    input type="text" name="rooms" placeholder="Rooms (3+1)"
                        value=(filters.rooms.as_deref().unwrap_or(""))
                        style="padding: 8px;";
                    button type="submit" style="padding: 8px 16px;" { "Filter" }
                    a href="/export/listings.xlsx" { "Download XLSX" }
                }

                @if rows.is_empty() {
                    p { "No listings match the current filters." }
                } @else {
                    table {
                        thead {
                            tr {
                                th { "Title" }
                                th { "Kind" }
                                th { "District" }
                                th { "Rooms" }
                                th { "Net m²" }
                                th { "Price" }
                                th { "Flags" }
                                th { "Dwelling" }
                                th { "Last seen" }
                            }
                        }
                        tbody {
                            @for row in rows {
                                tr {
                                    td { (row.title.as_deref().unwrap_or("(no title)")) }
                                    td { (row.listing_kind) }
                                    td {
                                        (row.district)
                                        @if let Some(n) = &row.neighborhood { ", " (n) }
                                    }
                                    td { (row.rooms_key) }
                                    td {
                                        @match row.net_m2 {
                                            Some(m2) => { (format!("{m2:.0}")) }
                                            None => { "-" }
                                        }
                                    }
                                    td { (fmt_tl(row.price_tl)) }
                                    td { (row.outlier_flags) }
                                    td {
                                        @match row.dwelling_id {
                                            Some(d) => { (d) }
                                            None => { "-" }
                                        }
                                    }
                                    td { (row.last_seen_at.format("%Y-%m-%d")) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
