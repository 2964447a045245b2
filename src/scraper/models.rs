use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// RawListing
//  ├── list view:   url, title, price, location  (phase 1)
//  └── detail page: details map, canonical key -> raw value (phase 2)
//
// Nothing is interpreted here; all payload fields are the portal's raw text.
// Cleaning turns this into a NormalizedListing.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub source: String,
    /// The portal's listing id, taken from the detail URL.
    pub source_listing_id: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
    /// Canonical-key -> raw-value pairs from the detail page spec items.
    pub details: BTreeMap<String, String>,
    pub collected_at: NaiveDateTime,
}
