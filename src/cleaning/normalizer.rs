// src/cleaning/normalizer.rs

use crate::cleaning::parse::{
    fold_text, parse_building_age, parse_floor, parse_furnished, parse_location, parse_m2_info,
    parse_price, parse_rooms, parse_turkish_date, tidy_text,
};
use crate::dedup::signature::compute_signature;
use crate::domain::listing::{ListingKind, NormalizedListing};
use crate::scraper::RawListing;

/// Converts a raw scraped record into a `NormalizedListing`, rejecting
/// records that cannot identify a dwelling or carry a usable price.
/// The error string is the reject reason, counted per run.
pub fn normalize(raw: &RawListing) -> Result<NormalizedListing, String> {
    let source_listing_id = raw.source_listing_id.trim();
    if source_listing_id.is_empty() {
        return Err("missing source listing id".to_string());
    }

    let price_tl = raw
        .price
        .as_deref()
        .and_then(parse_price)
        .ok_or("missing or unparseable price")?;
    if price_tl <= 0 {
        return Err("non-positive price".to_string());
    }

    let (district, neighborhood) = raw
        .location
        .as_deref()
        .and_then(parse_location)
        .ok_or("district could not be determined")?;

    let listing_kind = match raw.details.get("listing_type") {
        Some(v) if fold_text(v).contains("kiralik") => ListingKind::Rent,
        _ => ListingKind::Sale,
    };

    let (gross_m2, net_m2) = raw
        .details
        .get("m2_info")
        .map(|v| parse_m2_info(v))
        .unwrap_or((None, None));

    let rooms_pair = raw.details.get("room_count").and_then(|v| parse_rooms(v));
    let total_floors = raw
        .details
        .get("total_floors")
        .and_then(|v| v.trim().parse().ok());
    let floor = raw
        .details
        .get("floor_location")
        .and_then(|v| parse_floor(v, total_floors));

    let mut listing = NormalizedListing {
        source: raw.source.clone(),
        source_listing_id: source_listing_id.to_string(),
        url: raw.url.clone(),
        title: raw.title.as_deref().map(tidy_text).filter(|t| !t.is_empty()),
        listing_kind,
        property_type: raw
            .details
            .get("property_type")
            .map(|v| fold_text(v))
            .filter(|v| !v.is_empty()),
        district,
        neighborhood,
        latitude: raw.details.get("latitude").and_then(|v| v.parse().ok()),
        longitude: raw.details.get("longitude").and_then(|v| v.parse().ok()),
        rooms: rooms_pair.map(|(r, _)| r),
        living_rooms: rooms_pair.map(|(_, l)| l),
        bathrooms: raw
            .details
            .get("bathroom_count")
            .and_then(|v| v.trim().parse().ok()),
        gross_m2,
        net_m2,
        floor,
        total_floors,
        building_age: raw
            .details
            .get("building_age")
            .and_then(|v| parse_building_age(v)),
        heating: raw
            .details
            .get("heating_type")
            .map(|v| tidy_text(v))
            .filter(|v| !v.is_empty()),
        furnished: raw
            .details
            .get("is_furnished")
            .and_then(|v| parse_furnished(v)),
        facade: raw
            .details
            .get("facade")
            .map(|v| tidy_text(v))
            .filter(|v| !v.is_empty()),
        price_tl,
        last_updated: raw
            .details
            .get("last_updated")
            .and_then(|v| parse_turkish_date(v)),
        signature: String::new(),
    };

    listing.signature = compute_signature(&listing);
    Ok(listing)
}
