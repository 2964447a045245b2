// src/domain/changes.rs

use chrono::NaiveDateTime;

/// A ViewModel representing a single change event for a listing.
/// This is the structure behind both the change feed page and any export,
/// so it carries the listing context alongside the change itself.
#[derive(Debug)]
pub struct ChangeViewModel {
    // Event
    pub change_date: NaiveDateTime,
    /// Simplified for the user: "Price Change", "Status Change", "Detail Change".
    pub change_type: String,
    pub field_name: String,
    pub previous_value: String,
    pub current_value: String,

    // Listing context at the time of the query
    pub listing_id: i64,
    pub title: Option<String>,
    pub district: String,
    pub neighborhood: Option<String>,
    pub rooms_key: String,
    pub price_tl: i64,
    /// Derived lifecycle status ("New", "PriceReduced", ...).
    pub lifecycle_status: String,

    /// Positive when a price change was a reduction.
    pub price_reduction: Option<i64>,
}
