// src/domain/listing.rs

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Whether a listing offers the dwelling for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    Sale,
    Rent,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Sale => "sale",
            ListingKind::Rent => "rent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(ListingKind::Sale),
            "rent" => Some(ListingKind::Rent),
            _ => None,
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listing after cleaning: every inconsistent portal field canonicalized,
/// ready for dedup, storage and analytics. This is the anti-corruption layer
/// between the raw scrape and everything downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedListing {
    // Identity
    pub source: String,
    pub source_listing_id: String,
    pub url: Option<String>,
    pub title: Option<String>,

    pub listing_kind: ListingKind,
    pub property_type: Option<String>,

    // Location
    pub district: String,
    pub neighborhood: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // Rooms ("3+1" = 3 rooms + 1 living room)
    pub rooms: Option<u32>,
    pub living_rooms: Option<u32>,
    pub bathrooms: Option<u32>,

    // Area
    pub gross_m2: Option<f64>,
    pub net_m2: Option<f64>,

    // Building
    pub floor: Option<i32>,
    pub total_floors: Option<u32>,
    pub building_age: Option<u32>,
    pub heating: Option<String>,
    pub furnished: Option<bool>,
    pub facade: Option<String>,

    pub price_tl: i64,
    pub last_updated: Option<NaiveDate>,

    /// Dedup signature over the canonical attribute tuple.
    pub signature: String,
}

impl NormalizedListing {
    /// Price per square meter over net area, falling back to gross.
    pub fn price_per_m2(&self) -> Option<f64> {
        let m2 = self.net_m2.or(self.gross_m2)?;
        if m2 > 0.0 {
            Some(self.price_tl as f64 / m2)
        } else {
            None
        }
    }

    /// Rooms in the portal's "3+1" notation, "?" when unknown.
    pub fn rooms_key(&self) -> String {
        match (self.rooms, self.living_rooms) {
            (Some(r), Some(l)) => format!("{r}+{l}"),
            (Some(r), None) => format!("{r}+0"),
            _ => "?".to_string(),
        }
    }

    /// Count of non-null optional fields, used to break survivorship ties.
    pub fn completeness(&self) -> usize {
        [
            self.url.is_some(),
            self.title.is_some(),
            self.property_type.is_some(),
            self.neighborhood.is_some(),
            self.latitude.is_some(),
            self.longitude.is_some(),
            self.rooms.is_some(),
            self.living_rooms.is_some(),
            self.bathrooms.is_some(),
            self.gross_m2.is_some(),
            self.net_m2.is_some(),
            self.floor.is_some(),
            self.total_floors.is_some(),
            self.building_age.is_some(),
            self.heating.is_some(),
            self.furnished.is_some(),
            self.facade.is_some(),
            self.last_updated.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }
}

/// The current state of a listing as stored in `listings`, for diffing
/// a fresh scrape against the previous observation.
#[derive(Debug, Clone)]
pub struct TrackedListing {
    pub id: i64,
    pub price_tl: i64,
    pub listing_kind: String,
    pub furnished: Option<bool>,
    pub heating: Option<String>,
    pub title: Option<String>,
}

/// A single change to a tracked field, to be stored in `listing_history`.
#[derive(Debug)]
pub struct ListingChange {
    pub listing_id: i64,
    pub field_name: String,
    pub previous_value: Option<String>,
    pub current_value: String,
}

impl TrackedListing {
    /// Compares the stored state with a freshly normalized scrape and
    /// produces the changes to log.
    pub fn diff(&self, new: &NormalizedListing) -> Vec<ListingChange> {
        let mut changes = Vec::new();

        let mut push = |field: &str, prev: Option<String>, curr: String| {
            changes.push(ListingChange {
                listing_id: self.id,
                field_name: field.to_string(),
                previous_value: prev,
                current_value: curr,
            });
        };

        if self.price_tl != new.price_tl {
            push(
                "price_tl",
                Some(self.price_tl.to_string()),
                new.price_tl.to_string(),
            );
        }
        if self.listing_kind != new.listing_kind.as_str() {
            push(
                "listing_kind",
                Some(self.listing_kind.clone()),
                new.listing_kind.to_string(),
            );
        }
        if self.furnished != new.furnished {
            push(
                "furnished",
                self.furnished.map(|v| v.to_string()),
                new.furnished.map(|v| v.to_string()).unwrap_or_default(),
            );
        }
        if self.heating != new.heating {
            push(
                "heating",
                self.heating.clone(),
                new.heating.clone().unwrap_or_default(),
            );
        }
        if self.title != new.title {
            push(
                "title",
                self.title.clone(),
                new.title.clone().unwrap_or_default(),
            );
        }

        changes
    }
}

/// Row view model for the listings table and XLSX export.
#[derive(Debug)]
pub struct ListingRow {
    pub id: i64,
    pub source: String,
    pub source_listing_id: String,
    pub title: Option<String>,
    pub listing_kind: String,
    pub district: String,
    pub neighborhood: Option<String>,
    pub rooms_key: String,
    pub net_m2: Option<f64>,
    pub gross_m2: Option<f64>,
    pub floor: Option<i32>,
    pub building_age: Option<u32>,
    pub price_tl: i64,
    pub outlier_flags: String,
    pub dwelling_id: Option<i64>,
    pub match_method: Option<String>,
    pub first_seen_at: NaiveDateTime,
    pub last_seen_at: NaiveDateTime,
}
