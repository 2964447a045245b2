use crate::analytics::market::{self, segment_statistics};
use crate::cleaning::parse::fold_text;
use crate::config::Config;
use crate::db::connection::Database;
use crate::db::{changes, listings, runs, segments};
use crate::domain::listing::ListingKind;
use crate::errors::ServerError;
use crate::responses::html_response;
use crate::responses::ResultResp;
use crate::scraper;
use crate::spreadsheets::{export_listings_xlsx, export_segments_csv};
use crate::templates::pages::{self, EstimateVm, ListingFilters};
use crate::valuation::comps::comparables_estimate;
use crate::valuation::model::{fit_hedonic, predict_price};
use crate::valuation::Subject;
use astra::Request;
use std::collections::HashMap;

const LISTING_TABLE_LIMIT: usize = 200;
const EXPORT_LIMIT: usize = 10_000;
const CHANGE_FEED_DAYS: i64 = 30;
const CHANGE_FEED_LIMIT: usize = 200;

pub fn handle(req: Request, db: &Database, config: &Config) -> ResultResp {
    let method = req.method().as_str();
    let path = req.uri().path();

    match (method, path) {
        ("GET", "/") => overview_route(db, config),
        ("GET", "/listings") => listings_route(&req, db, config),
        ("GET", "/segments") => segments_route(db, config),
        ("GET", "/changes") => changes_route(db, config),
        ("GET", "/runs") => runs_route(db, config),
        ("GET", "/estimate") => html_response(pages::estimate_page(&config.city)),
        ("GET", "/estimate/result") => estimate_route(&req, db, config),
        ("GET", "/export/listings.xlsx") => export_listings_route(db, config),
        ("GET", "/export/segments.csv") => export_segments_route(db, config),
        ("POST", "/scrape") => scrape_route(db, config),
        _ => Err(ServerError::NotFound),
    }
}

fn overview_route(db: &Database, config: &Config) -> ResultResp {
    let vm = market::market_overview(db)?;
    html_response(pages::overview_page(&config.city, &vm))
}

fn listings_route(req: &Request, db: &Database, config: &Config) -> ResultResp {
    let params = parse_query(req);
    let filters = ListingFilters {
        kind: non_empty(&params, "kind"),
        district: non_empty(&params, "district"),
        rooms: non_empty(&params, "rooms"),
    };

    let rows = listings::get_listings_filtered(
        db,
        filters.kind.as_deref(),
        filters.district.as_deref(),
        filters.rooms.as_deref(),
        LISTING_TABLE_LIMIT,
    )?;
    html_response(pages::listings_page(&config.city, &rows, &filters))
}

fn segments_route(db: &Database, config: &Config) -> ResultResp {
    let rows = segments::get_segment_rows(db)?;
    let stats = segment_statistics(&rows);
    html_response(pages::segments_page(&config.city, &stats))
}

fn changes_route(db: &Database, config: &Config) -> ResultResp {
    let feed = changes::get_recent_changes(db, CHANGE_FEED_DAYS, CHANGE_FEED_LIMIT)?;
    html_response(pages::changes_page(&config.city, &feed))
}

fn runs_route(db: &Database, config: &Config) -> ResultResp {
    let runs = db.with_conn(|conn| runs::get_recent_scrapes(conn))?;
    html_response(pages::runs_page(&config.city, &runs))
}

fn estimate_route(req: &Request, db: &Database, config: &Config) -> ResultResp {
    let params = parse_query(req);
    let subject = subject_from_params(&params)?;

    let rows = segments::get_segment_rows(db)?;
    let kind_rows: Vec<_> = rows
        .iter()
        .filter(|r| r.listing_kind == subject.listing_kind.as_str())
        .cloned()
        .collect();

    let hedonic = fit_hedonic(&kind_rows).map(|fit| {
        let prediction = predict_price(&fit, &subject);
        (fit, prediction)
    });
    let comps = comparables_estimate(&rows, &subject, None);

    let vm = EstimateVm {
        subject,
        hedonic,
        comps,
    };
    html_response(pages::estimate_result_page(&config.city, &vm))
}

fn subject_from_params(params: &HashMap<String, String>) -> Result<Subject, ServerError> {
    let listing_kind = match params.get("kind").map(String::as_str) {
        None | Some("sale") => ListingKind::Sale,
        Some("rent") => ListingKind::Rent,
        Some(other) => {
            return Err(ServerError::BadRequest(format!(
                "Unknown listing kind '{other}'"
            )))
        }
    };

    let district = non_empty(params, "district")
        .ok_or_else(|| ServerError::BadRequest("A district is required".to_string()))?;

    let rooms: u32 = parse_param(params, "rooms")?
        .ok_or_else(|| ServerError::BadRequest("A room count is required".to_string()))?;
    let living_rooms: u32 = parse_param(params, "living_rooms")?.unwrap_or(0);

    let net_m2: f64 = parse_param(params, "net_m2")?
        .ok_or_else(|| ServerError::BadRequest("A net area is required".to_string()))?;
    if net_m2 <= 0.0 {
        return Err(ServerError::BadRequest(
            "The net area must be positive".to_string(),
        ));
    }

    Ok(Subject {
        listing_kind,
        district,
        rooms,
        living_rooms,
        net_m2,
        building_age: parse_param(params, "building_age")?,
        floor: parse_param(params, "floor")?,
        furnished: params.get("furnished").is_some_and(|v| !v.is_empty()),
    })
}

/// Parses an optional numeric parameter; a present but malformed value is a
/// BadRequest, an absent or empty one is None.
fn parse_param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, ServerError> {
    match params.get(name).map(|s| s.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ServerError::BadRequest(format!("Invalid value for '{name}'"))),
    }
}

fn export_listings_route(db: &Database, config: &Config) -> ResultResp {
    let rows = listings::get_listings_filtered(db, None, None, None, EXPORT_LIMIT)?;
    export_listings_xlsx(&rows, &fold_text(&config.city))
}

fn export_segments_route(db: &Database, config: &Config) -> ResultResp {
    let rows = segments::get_segment_rows(db)?;
    let stats = segment_statistics(&rows);
    export_segments_csv(&stats, &fold_text(&config.city))
}

fn scrape_route(db: &Database, config: &Config) -> ResultResp {
    config.require_base_url()?;

    if scraper::spawn_scrape(db, config) {
        html_response(pages::notice_page(
            &config.city,
            "Scrape started",
            "The collector is running in the background. Results appear as pages are saved.",
        ))
    } else {
        html_response(pages::notice_page(
            &config.city,
            "Scrape already running",
            "A collector pass is already in progress; a second one was not queued.",
        ))
    }
}

fn non_empty(params: &HashMap<String, String>, name: &str) -> Option<String> {
    params
        .get(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Query string as a map, with percent-encoding and `+` decoded; Turkish
/// district names arrive encoded.
fn parse_query(req: &Request) -> HashMap<String, String> {
    let mut map = HashMap::new();

    if let Some(q) = req.uri().query() {
        for (k, v) in url::form_urlencoded::parse(q.as_bytes()) {
            map.insert(k.into_owned(), v.into_owned());
        }
    }

    map
}
