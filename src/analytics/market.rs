// src/analytics/market.rs

use crate::analytics::stats::{mad, median, quantile};
use crate::db::connection::Database;
use crate::db::runs::{get_last_run, ScrapeRun};
use crate::db::segments::SegmentRow;
use crate::db::{listings, segments};
use crate::errors::ServerError;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A segment must have this many clean, deduped listings to be displayed.
pub const MIN_SEGMENT_DISPLAY: usize = 3;

/// Robust statistics for one (kind, district, rooms) market segment.
#[derive(Debug, Clone)]
pub struct SegmentStats {
    pub listing_kind: String,
    pub district: String,
    pub district_key: String,
    pub rooms_key: String,
    pub count: usize,
    pub median_price: f64,
    pub p25_price: f64,
    pub p75_price: f64,
    pub median_ppm2: Option<f64>,
    pub mad_ppm2: Option<f64>,
    /// Gross rental yield for sale segments with a rent counterpart:
    /// 12 × median rent / median sale price.
    pub gross_yield: Option<f64>,
}

/// Groups segment rows by (kind, district, rooms) and computes the robust
/// statistics; sale segments get a yield when the matching rent segment
/// also clears the display minimum.
pub fn segment_statistics(rows: &[SegmentRow]) -> Vec<SegmentStats> {
    let mut groups: BTreeMap<(String, String, String), Vec<&SegmentRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((
                row.listing_kind.clone(),
                row.district_key.clone(),
                row.rooms_key.clone(),
            ))
            .or_default()
            .push(row);
    }

    let mut stats: Vec<SegmentStats> = Vec::new();
    for ((kind, district_key, rooms_key), members) in &groups {
        if members.len() < MIN_SEGMENT_DISPLAY {
            continue;
        }
        let prices: Vec<f64> = members.iter().map(|r| r.price_tl as f64).collect();
        let ppm2: Vec<f64> = members.iter().filter_map(|r| r.price_per_m2()).collect();

        stats.push(SegmentStats {
            listing_kind: kind.clone(),
            district: members[0].district.clone(),
            district_key: district_key.clone(),
            rooms_key: rooms_key.clone(),
            count: members.len(),
            median_price: median(&prices).unwrap_or(0.0),
            p25_price: quantile(&prices, 0.25).unwrap_or(0.0),
            p75_price: quantile(&prices, 0.75).unwrap_or(0.0),
            median_ppm2: median(&ppm2),
            mad_ppm2: mad(&ppm2),
            gross_yield: None,
        });
    }

    // Join rent medians onto sale segments for the ROI column.
    let rent_medians: BTreeMap<(String, String), f64> = stats
        .iter()
        .filter(|s| s.listing_kind == "rent")
        .map(|s| {
            (
                (s.district_key.clone(), s.rooms_key.clone()),
                s.median_price,
            )
        })
        .collect();

    for s in stats.iter_mut() {
        if s.listing_kind == "sale" && s.median_price > 0.0 {
            if let Some(rent) = rent_medians.get(&(s.district_key.clone(), s.rooms_key.clone())) {
                s.gross_yield = Some(12.0 * rent / s.median_price);
            }
        }
    }

    stats
}

/// Citywide overview for the dashboard landing page.
#[derive(Debug)]
pub struct MarketOverview {
    pub total_listings: i64,
    pub total_dwellings: i64,
    pub new_this_month: i64,
    pub stale: i64,
    pub delisted: i64,
    pub median_sale_price: Option<f64>,
    pub median_rent_price: Option<f64>,
    pub top_districts: Vec<(String, usize)>,
    pub last_run: Option<ScrapeRun>,
}

pub fn market_overview(db: &Database) -> Result<MarketOverview, ServerError> {
    let now = Utc::now().naive_utc();
    let month_start = start_of_month();
    let stale_cutoff = now - Duration::days(14);
    let delisted_cutoff = now - Duration::days(30);

    let rows = segments::get_segment_rows(db)?;

    let sale_prices: Vec<f64> = rows
        .iter()
        .filter(|r| r.listing_kind == "sale")
        .map(|r| r.price_tl as f64)
        .collect();
    let rent_prices: Vec<f64> = rows
        .iter()
        .filter(|r| r.listing_kind == "rent")
        .map(|r| r.price_tl as f64)
        .collect();

    let mut by_district: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &rows {
        *by_district.entry(row.district.as_str()).or_default() += 1;
    }
    let mut top_districts: Vec<(String, usize)> = by_district
        .into_iter()
        .map(|(d, n)| (d.to_string(), n))
        .collect();
    top_districts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    top_districts.truncate(5);

    db.with_conn(|conn| {
        Ok(MarketOverview {
            total_listings: listings::count_listings(conn)?,
            total_dwellings: listings::count_dwellings(conn)?,
            new_this_month: listings::count_new_since(conn, month_start)?,
            stale: listings::count_unseen_since(conn, stale_cutoff)?,
            delisted: listings::count_unseen_since(conn, delisted_cutoff)?,
            median_sale_price: median(&sale_prices),
            median_rent_price: median(&rent_prices),
            top_districts,
            last_run: get_last_run(conn)?,
        })
    })
}

/// Start of the current calendar month (UTC), as a naive timestamp
/// comparable with `first_seen_at`.
fn start_of_month() -> chrono::NaiveDateTime {
    let dt = OffsetDateTime::now_utc();
    let unix = dt
        .replace_day(1)
        .unwrap_or(dt) // day 1 is valid for every month
        .replace_time(time::Time::MIDNIGHT)
        .unix_timestamp();
    DateTime::from_timestamp(unix, 0)
        .map(|d| d.naive_utc())
        .unwrap_or_else(|| Utc::now().naive_utc())
}
