// src/dedup/matcher.rs
//
// Near-duplicate detection: listings that differ in small ways (re-posted
// with a new title, prices drifted across portals). Candidates are only
// compared within the same (kind, district, rooms) block; the pair score is
// a weighted sum over the evidence both sides actually have, with weights
// renormalized over the present evidence.

use crate::cleaning::parse::fold_text;
use crate::domain::listing::NormalizedListing;
use strsim::normalized_levenshtein;

pub const DUPLICATE_THRESHOLD: f64 = 0.85;
pub const POSSIBLE_THRESHOLD: f64 = 0.70;

const W_TITLE: f64 = 0.35;
const W_PRICE: f64 = 0.25;
const W_AREA: f64 = 0.20;
const W_GEO: f64 = 0.10;
const W_FLOOR: f64 = 0.05;
const W_AGE: f64 = 0.05;

/// Geo proximity is full evidence at 25 m and none at 500 m.
const GEO_NEAR_M: f64 = 25.0;
const GEO_FAR_M: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    Duplicate,
    Possible,
    Distinct,
}

pub fn verdict(score: f64) -> MatchVerdict {
    if score >= DUPLICATE_THRESHOLD {
        MatchVerdict::Duplicate
    } else if score >= POSSIBLE_THRESHOLD {
        MatchVerdict::Possible
    } else {
        MatchVerdict::Distinct
    }
}

/// A stored listing loaded for comparison, already restricted to the
/// incoming listing's block.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub id: i64,
    pub dwelling_id: Option<i64>,
    pub signature: String,
    pub title: Option<String>,
    pub price_tl: i64,
    pub net_m2: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub floor: Option<i32>,
    pub building_age: Option<u32>,
}

/// Weighted evidence score in [0, 1]. A signature match short-circuits
/// to 1.0.
pub fn score_pair(listing: &NormalizedListing, candidate: &MatchCandidate) -> f64 {
    if listing.signature == candidate.signature {
        return 1.0;
    }

    let mut score = 0.0;
    let mut weight = 0.0;

    if let (Some(a), Some(b)) = (listing.title.as_deref(), candidate.title.as_deref()) {
        score += W_TITLE * normalized_levenshtein(&fold_text(a), &fold_text(b));
        weight += W_TITLE;
    }

    score += W_PRICE * closeness(listing.price_tl as f64, candidate.price_tl as f64);
    weight += W_PRICE;

    if let (Some(a), Some(b)) = (listing.net_m2, candidate.net_m2) {
        score += W_AREA * closeness(a, b);
        weight += W_AREA;
    }

    if let (Some(la), Some(lo), Some(ca), Some(co)) = (
        listing.latitude,
        listing.longitude,
        candidate.latitude,
        candidate.longitude,
    ) {
        score += W_GEO * geo_evidence(haversine_m(la, lo, ca, co));
        weight += W_GEO;
    }

    if let (Some(a), Some(b)) = (listing.floor, candidate.floor) {
        score += W_FLOOR * if a == b { 1.0 } else { 0.0 };
        weight += W_FLOOR;
    }
    if let (Some(a), Some(b)) = (listing.building_age, candidate.building_age) {
        score += W_AGE * if a == b { 1.0 } else { 0.0 };
        weight += W_AGE;
    }

    if weight == 0.0 {
        return 0.0;
    }
    score / weight
}

/// `1 - |Δ| / max`, clamped at 0. Used for both price and area closeness.
fn closeness(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max <= 0.0 {
        return 0.0;
    }
    (1.0 - (a - b).abs() / max).max(0.0)
}

fn geo_evidence(distance_m: f64) -> f64 {
    if distance_m <= GEO_NEAR_M {
        1.0
    } else if distance_m >= GEO_FAR_M {
        0.0
    } else {
        (GEO_FAR_M - distance_m) / (GEO_FAR_M - GEO_NEAR_M)
    }
}

/// Great-circle distance in meters.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::ListingKind;

    fn listing() -> NormalizedListing {
        NormalizedListing {
            source: "hepsiemlak".to_string(),
            source_listing_id: "1".to_string(),
            url: None,
            title: Some("Kadıköy Caferağa'da satılık 3+1 daire".to_string()),
            listing_kind: ListingKind::Sale,
            property_type: Some("daire".to_string()),
            district: "Kadıköy".to_string(),
            neighborhood: Some("Caferağa".to_string()),
            latitude: Some(40.9830),
            longitude: Some(29.0270),
            rooms: Some(3),
            living_rooms: Some(1),
            bathrooms: Some(1),
            gross_m2: Some(130.0),
            net_m2: Some(110.0),
            floor: Some(2),
            total_floors: Some(5),
            building_age: Some(7),
            heating: None,
            furnished: None,
            facade: None,
            price_tl: 5_500_000,
            last_updated: None,
            signature: "sig-a".to_string(),
        }
    }

    fn candidate_from(l: &NormalizedListing) -> MatchCandidate {
        MatchCandidate {
            id: 10,
            dwelling_id: Some(4),
            signature: "sig-other".to_string(),
            title: l.title.clone(),
            price_tl: l.price_tl,
            net_m2: l.net_m2,
            latitude: l.latitude,
            longitude: l.longitude,
            floor: l.floor,
            building_age: l.building_age,
        }
    }

    #[test]
    fn signature_match_is_always_duplicate() {
        let l = listing();
        let mut c = candidate_from(&l);
        c.signature = l.signature.clone();
        c.price_tl = 1; // evidence would disagree, signature wins
        assert_eq!(score_pair(&l, &c), 1.0);
        assert_eq!(verdict(1.0), MatchVerdict::Duplicate);
    }

    #[test]
    fn retitled_repost_with_small_price_drift_clears_duplicate() {
        let l = listing();
        let mut c = candidate_from(&l);
        c.title = Some("Caferağa'da satılık 3+1 daire".to_string());
        c.price_tl = 5_250_000; // ~5% below
        let score = score_pair(&l, &c);
        assert!(score >= DUPLICATE_THRESHOLD, "score was {score}");
    }

    #[test]
    fn different_dwelling_in_same_block_stays_distinct() {
        let l = listing();
        let mut c = candidate_from(&l);
        c.title = Some("Fenerbahçe'de yeni binada lüks 3+1".to_string());
        c.price_tl = 9_800_000;
        c.net_m2 = Some(150.0);
        c.floor = Some(8);
        c.building_age = Some(0);
        c.latitude = Some(40.9690);
        c.longitude = Some(29.0520);
        let score = score_pair(&l, &c);
        assert!(score < POSSIBLE_THRESHOLD, "score was {score}");
    }

    #[test]
    fn missing_evidence_renormalizes_instead_of_penalizing() {
        let mut l = listing();
        l.title = None;
        l.latitude = None;
        l.longitude = None;
        let mut c = candidate_from(&l);
        c.title = None;
        c.latitude = None;
        c.longitude = None;
        // Remaining evidence (price, area, floor, age) agrees fully.
        let score = score_pair(&l, &c);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn geo_evidence_shape() {
        assert_eq!(geo_evidence(10.0), 1.0);
        assert_eq!(geo_evidence(600.0), 0.0);
        let mid = geo_evidence(262.5);
        assert!(mid > 0.49 && mid < 0.51);
    }

    #[test]
    fn haversine_sanity() {
        // ~1 degree of latitude is ~111 km
        let d = haversine_m(41.0, 29.0, 42.0, 29.0);
        assert!((d - 111_000.0).abs() < 1_000.0);
        assert!(haversine_m(41.0, 29.0, 41.0, 29.0) < 1e-6);
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(verdict(0.9), MatchVerdict::Duplicate);
        assert_eq!(verdict(0.75), MatchVerdict::Possible);
        assert_eq!(verdict(0.5), MatchVerdict::Distinct);
    }
}
