mod field_map;
mod models;
#[allow(clippy::module_inception)]
mod scraper;
mod scraper_error;

pub use models::RawListing;
pub use scraper::{run_scrape_blocking, spawn_scrape, EmlakScraper};
pub use scraper_error::ScraperError;
