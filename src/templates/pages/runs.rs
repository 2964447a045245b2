use crate::db::runs::ScrapeRun;
use crate::templates::desktop_layout;
use crate::templates::pages::fmt_unix;
use maud::{html, Markup};

pub fn runs_page(city: &str, runs: &[ScrapeRun]) -> Markup {
    desktop_layout(
        "Runs",
        city,
        html! {
            main class="container" {
                h1 { "Scrape Runs" }

                form action="/scrape" method="post" style="margin-bottom: 1rem;" {
                    button type="submit" { "Start scrape" }
                }

                @if runs.is_empty() {
                    p { "No runs recorded yet." }
                } @else {
                    table {
                        thead {
                            tr {
                                th { "Started" }
                                th { "Finished" }
                                th { "Source" }
                                th { "Pages" }
                                th { "Seen" }
                                th { "Saved" }
                                th { "Rejected" }
                                th { "Result" }
                            }
                        }
                        tbody {
                            @for run in runs {
                                tr {
                                    td { (fmt_unix(run.started_at)) }
                                    td {
                                        @match run.finished_at {
                                            Some(t) => { (fmt_unix(t)) }
                                            None => { "running" }
                                        }
                                    }
                                    td { (run.source) }
                                    td { (run.pages_fetched.unwrap_or(0)) }
                                    td { (run.listings_seen.unwrap_or(0)) }
                                    td { (run.listings_saved.unwrap_or(0)) }
                                    td { (run.listings_rejected.unwrap_or(0)) }
                                    td {
                                        @match (run.success, &run.error_message) {
                                            (Some(true), _) => { "ok" }
                                            (Some(false), Some(msg)) => { (msg) }
                                            (Some(false), None) => { "failed" }
                                            (None, _) => { "-" }
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
