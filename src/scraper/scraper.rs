// scraper.rs
use crate::config::Config;
use crate::db::connection::Database;
use crate::db::listings::{save_raw_listings, SaveOutcome};
use crate::scraper::field_map::canonical_key;
use crate::scraper::RawListing;
use crate::scraper::ScraperError;
use chrono::Utc;
use rand::Rng;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Only one collector pass at a time; the dashboard gets a notice page
/// instead of a queued second run.
static SCRAPE_RUNNING: AtomicBool = AtomicBool::new(false);

/// A listing summary from a list-view card (phase 1). The detail page
/// fills in the rest (phase 2).
#[derive(Debug, Clone, PartialEq)]
pub struct ListCard {
    pub href: String,
    pub title: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
}

pub struct EmlakScraper {
    client: Client,
    source: String,
}

impl EmlakScraper {
    pub fn new(source: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self {
            client,
            source: source.to_string(),
        })
    }

    /// Walks list-view pages `{base_url}&page={n}`, deep-scrapes every card's
    /// detail page, and hands each page's batch to `on_page` before fetching
    /// the next one, so an aborted run keeps everything collected so far.
    ///
    /// Returns (pages fetched, listings seen).
    pub fn fetch_all_listings_paginated<F>(
        &self,
        base_url: &str,
        max_pages: u32,
        mut on_page: F,
    ) -> Result<(usize, usize), ScraperError>
    where
        F: FnMut(Vec<RawListing>, &str) -> Result<(), ScraperError>,
    {
        let mut pages = 0;
        let mut seen = 0;
        let mut consecutive_failures = 0;

        let mut page = 1;
        while page <= max_pages {
            let page_url = format!("{base_url}&page={page}");
            eprintln!("📄 Scraping page {page}: {page_url}");

            let html = match self.fetch_html(&page_url) {
                Ok(html) => {
                    consecutive_failures = 0;
                    html
                }
                Err(e) => {
                    consecutive_failures += 1;
                    eprintln!("⚠️ Page {page} failed (attempt {consecutive_failures}): {e}");
                    if consecutive_failures >= 3 {
                        eprintln!("❌ Too many page failures, aborting scrape");
                        return Err(e);
                    }
                    std::thread::sleep(Duration::from_secs(2));
                    continue;
                }
            };

            let cards = parse_list_page(&html)?;
            if cards.is_empty() {
                eprintln!("🏁 No listings found on page {page}, stopping");
                break;
            }
            eprintln!("✅ Page {page} parsed ({} listings)", cards.len());
            pages += 1;
            seen += cards.len();

            let batch = self.scrape_card_details(&page_url, &cards);
            on_page(batch, &page_url)?;

            page += 1;
            polite_pause();
        }

        Ok((pages, seen))
    }

    /// Phase 2: visit each card's detail page. A listing that keeps failing
    /// is skipped; the run continues.
    fn scrape_card_details(&self, page_url: &str, cards: &[ListCard]) -> Vec<RawListing> {
        let mut batch = Vec::with_capacity(cards.len());

        for card in cards {
            let detail_url = match absolute_url(page_url, &card.href) {
                Some(u) => u,
                None => {
                    eprintln!("⚠️ Skipping card with unusable href: {}", card.href);
                    continue;
                }
            };
            let listing_id = listing_id_from_url(&detail_url);

            let mut details = None;
            for attempt in 1..=3u64 {
                eprintln!("🔎 Extracting details for ID:{listing_id}");
                match self.fetch_listing_details(&detail_url) {
                    Ok(map) if !map.is_empty() => {
                        details = Some(map);
                        break;
                    }
                    Ok(_) | Err(_) if attempt < 3 => {
                        // Soft-block assumption: cool down before retrying.
                        let wait = 60 * attempt;
                        eprintln!(
                            "⚠️ Listing ID:{listing_id} couldn't be scraped ({attempt}/3), cooling down {wait}s"
                        );
                        std::thread::sleep(Duration::from_secs(wait));
                    }
                    Ok(_) => {
                        eprintln!("⚠️ Giving up on listing ID:{listing_id}: empty detail page");
                    }
                    Err(e) => {
                        eprintln!("⚠️ Giving up on listing ID:{listing_id}: {e}");
                    }
                }
            }

            let Some(details) = details else { continue };
            eprintln!(
                "✅ Scraped ID:{listing_id}. Last updated: {}",
                details.get("last_updated").map(String::as_str).unwrap_or("?")
            );

            batch.push(RawListing {
                source: self.source.clone(),
                source_listing_id: listing_id,
                url: Some(detail_url),
                title: card.title.clone(),
                price: card.price.clone(),
                location: card.location.clone(),
                details,
                collected_at: Utc::now().naive_utc(),
            });

            polite_pause();
        }

        batch
    }

    fn fetch_listing_details(&self, url: &str) -> Result<BTreeMap<String, String>, ScraperError> {
        let html = self.fetch_html(url)?;
        parse_detail_page(&html)
    }

    fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        if status.as_u16() == 403 || status.as_u16() == 429 {
            return Err(ScraperError::Blocked(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(ScraperError::Network(format!("HTTP {status} for {url}")));
        }
        Ok(text)
    }
}

/// Phase 1: pull the listing cards out of a list-view page.
pub fn parse_list_page(html: &str) -> Result<Vec<ListCard>, ScraperError> {
    let document = Html::parse_document(html);
    let card_sel = selector("div.list-view-content")?;
    let link_sel = selector("a.card-link")?;
    let title_sel = selector("header.list-view-header > h3")?;
    let price_sel = selector("span.list-view-price")?;
    let location_sel = selector("span.list-view-location")?;

    let mut cards = Vec::new();
    for card in document.select(&card_sel) {
        let Some(href) = card
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            // A card without a detail link is useless downstream.
            continue;
        };

        cards.push(ListCard {
            href: href.to_string(),
            title: element_text(&card, &title_sel),
            price: element_text(&card, &price_sel),
            location: element_text(&card, &location_sel),
        });
    }
    Ok(cards)
}

/// Phase 2: harvest the label/value spec items of a detail page through the
/// field mapping table. Unmapped labels are ignored. Value extraction is a
/// chained fallback: value node, then an anchor, then the item text minus
/// its label.
pub fn parse_detail_page(html: &str) -> Result<BTreeMap<String, String>, ScraperError> {
    let document = Html::parse_document(html);
    let item_sel = selector("ul.adv-info-list li.spec-item")?;
    let label_sel = selector(".txt")?;
    let value_sel = selector(".value-txt")?;
    let anchor_sel = selector("a")?;

    let mut details = BTreeMap::new();
    for item in document.select(&item_sel) {
        let Some(label) = element_text(&item, &label_sel) else {
            continue;
        };
        let Some(key) = canonical_key(&label) else {
            continue;
        };

        let value = element_text(&item, &value_sel)
            .or_else(|| element_text(&item, &anchor_sel))
            .or_else(|| {
                let full: String = item.text().collect();
                let stripped = full.replace(&label, "");
                let trimmed = stripped.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            });

        if let Some(value) = value {
            details.insert(key.to_string(), value);
        }
    }
    Ok(details)
}

fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::HtmlParse(e.to_string()))
}

fn element_text(parent: &ElementRef, sel: &Selector) -> Option<String> {
    let el = parent.select(sel).next()?;
    let text: String = el.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// The portal's listing id is the last path segment of the detail URL.
pub fn listing_id_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

fn absolute_url(page_url: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = Url::parse(page_url).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Random 3-8 s pause between fetches, per the portal's tolerance.
fn polite_pause() {
    let secs = rand::thread_rng().gen_range(3..=8);
    std::thread::sleep(Duration::from_secs(secs));
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// One collector pass with scrape-run bookkeeping. Used by the `scrape` CLI
/// command and by the background thread.
pub fn run_scrape_blocking(db: &Database, config: &Config) -> Result<(), crate::errors::ServerError> {
    let base_url = config.require_base_url()?.to_string();

    let run_id = db.with_conn(|conn| {
        crate::db::runs::start_scrape_run(conn, &config.source, now_unix())
    })?;

    let scraper = EmlakScraper::new(&config.source)
        .map_err(|e| crate::errors::ServerError::Config(e.to_string()))?;

    let mut totals = SaveOutcome::default();
    let result = scraper.fetch_all_listings_paginated(&base_url, config.max_pages, |batch, page_url| {
        let outcome = save_raw_listings(db, &batch, page_url)
            .map_err(|e| ScraperError::UnexpectedShape(e.to_string()))?;
        totals.saved += outcome.saved;
        totals.rejected += outcome.rejected;
        Ok(())
    });

    match result {
        Ok((pages, seen)) => {
            eprintln!("✅ Scrape complete: {pages} pages, {seen} listings seen");
            db.with_conn(|conn| {
                crate::db::runs::end_scrape_run(
                    conn,
                    run_id,
                    now_unix(),
                    pages,
                    seen,
                    totals.saved,
                    totals.rejected,
                    true,
                    None,
                )
            })?;
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Scrape failed: {e}");
            db.with_conn(|conn| {
                crate::db::runs::end_scrape_run(
                    conn,
                    run_id,
                    now_unix(),
                    0,
                    0,
                    totals.saved,
                    totals.rejected,
                    false,
                    Some(e.to_string()),
                )
            })?;
            Err(crate::errors::ServerError::Config(e.to_string()))
        }
    }
}

/// Spawns a background collector pass. Returns false when one is already
/// running.
pub fn spawn_scrape(db: &Database, config: &Config) -> bool {
    if SCRAPE_RUNNING
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return false;
    }

    let db = db.clone(); // cheap clone (path only)
    let config = config.clone();
    std::thread::spawn(move || {
        eprintln!("🧵 Scraper thread started for {}", config.source);
        if let Err(e) = run_scrape_blocking(&db, &config) {
            eprintln!("Scrape thread ended with error: {e}");
        }
        SCRAPE_RUNNING.store(false, Ordering::SeqCst);
    });
    true
}
