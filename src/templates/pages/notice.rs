use crate::templates::desktop_layout;
use maud::{html, Markup};

/// Small confirmation page, used after POST /scrape.
pub fn notice_page(city: &str, title: &str, message: &str) -> Markup {
    desktop_layout(
        title,
        city,
        html! {
            main class="container" {
                h1 { (title) }
                p { (message) }
                p { a href="/runs" { "View runs" } " · " a href="/" { "Back to overview" } }
            }
        },
    )
}
