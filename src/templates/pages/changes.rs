use crate::domain::changes::ChangeViewModel;
use crate::templates::desktop_layout;
use crate::templates::pages::fmt_tl;
use maud::{html, Markup};

pub fn changes_page(city: &str, changes: &[ChangeViewModel]) -> Markup {
    desktop_layout(
        "Changes",
        city,
        html! {
            main class="container" {
                h1 { "Recent Changes" }

                @if changes.is_empty() {
                    p { "No tracked-field changes in the window." }
                } @else {
                    table {
                        thead {
                            tr {
                                th { "Date" }
                                th { "Type" }
                                th { "Listing" }
                                th { "District" }
                                th { "Rooms" }
                                th { "Status" }
                                th { "Before" }
                                th { "After" }
                                th { "Reduction" }
                            }
                        }
                        tbody {
                            @for c in changes {
                                tr {
                                    td { (c.change_date.format("%Y-%m-%d %H:%M")) }
                                    td { (c.change_type) }
                                    td { (c.title.as_deref().unwrap_or("(no title)")) }
                                    td {
                                        (c.district)
                                        @if let Some(n) = &c.neighborhood { ", " (n) }
                                    }
                                    td { (c.rooms_key) }
                                    td { (c.lifecycle_status) }
                                    td { (c.previous_value) }
                                    td { (c.current_value) }
                                    td {
                                        @match c.price_reduction {
                                            Some(r) => { (fmt_tl(r)) }
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
