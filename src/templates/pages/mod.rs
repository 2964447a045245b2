pub mod changes;
pub mod estimate;
pub mod listings;
pub mod notice;
pub mod overview;
pub mod runs;
pub mod segments;

pub use changes::changes_page;
pub use estimate::{estimate_page, estimate_result_page, EstimateVm};
pub use listings::{listings_page, ListingFilters};
pub use notice::notice_page;
pub use overview::overview_page;
pub use runs::runs_page;
pub use segments::segments_page;

/// TL amount with Turkish thousands separators: 5500000 -> "5.500.000 TL".
pub fn fmt_tl(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{grouped} TL")
    } else {
        format!("{grouped} TL")
    }
}

/// Unix timestamp as a readable UTC datetime for the runs page.
pub fn fmt_unix(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}
