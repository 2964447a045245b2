// src/cleaning/outliers.rs
//
// Outlier and fraud filtering. Flagged listings stay in storage but are
// excluded from segment statistics and model training.

use crate::domain::listing::{ListingKind, NormalizedListing};
use std::fmt;

/// Modified z-score cutoff (Iglewicz-Hoaglin) for the segment price screen.
const Z_CUTOFF: f64 = 3.5;
/// The screen needs this many clean peers in the segment to be meaningful.
pub const MIN_PEERS_FOR_SCREEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierFlag {
    PriceImplausible,
    AreaImplausible,
    NetExceedsGross,
    PriceOutlier,
}

impl OutlierFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierFlag::PriceImplausible => "PriceImplausible",
            OutlierFlag::AreaImplausible => "AreaImplausible",
            OutlierFlag::NetExceedsGross => "NetExceedsGross",
            OutlierFlag::PriceOutlier => "PriceOutlier",
        }
    }
}

impl fmt::Display for OutlierFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma-joined form stored in the `outlier_flags` column.
pub fn join_flags(flags: &[OutlierFlag]) -> String {
    flags
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Hard plausibility bounds, always applied at save time.
pub fn hard_flags(listing: &NormalizedListing) -> Vec<OutlierFlag> {
    let mut flags = Vec::new();

    let price_ok = match listing.listing_kind {
        ListingKind::Sale => (100_000..=500_000_000).contains(&listing.price_tl),
        ListingKind::Rent => (1_000..=2_000_000).contains(&listing.price_tl),
    };
    if !price_ok {
        flags.push(OutlierFlag::PriceImplausible);
    }

    if let Some(net) = listing.net_m2 {
        if !(10.0..=2000.0).contains(&net) {
            flags.push(OutlierFlag::AreaImplausible);
        }
        if let Some(gross) = listing.gross_m2 {
            if net > gross * 1.05 {
                flags.push(OutlierFlag::NetExceedsGross);
            }
        }
    }

    flags
}

/// Robust per-segment screen on ln(price per m²): modified z-score using
/// median and MAD. Returns the ids whose |z| exceeds the cutoff. Callers
/// pass one (id, price per m²) pair per clean listing in the segment.
pub fn screen_segment_prices(pairs: &[(i64, f64)]) -> Vec<i64> {
    if pairs.len() < MIN_PEERS_FOR_SCREEN {
        return Vec::new();
    }

    let logs: Vec<f64> = pairs.iter().map(|(_, p)| p.ln()).collect();
    let med = median(&logs);
    let deviations: Vec<f64> = logs.iter().map(|x| (x - med).abs()).collect();
    let mad = median(&deviations);
    if mad == 0.0 {
        // Degenerate segment (all identical prices); nothing to flag.
        return Vec::new();
    }

    pairs
        .iter()
        .zip(logs.iter())
        .filter(|(_, x)| (0.6745 * (**x - med) / mad).abs() > Z_CUTOFF)
        .map(|((id, _), _)| *id)
        .collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::NormalizedListing;

    fn listing(kind: ListingKind, price: i64, gross: Option<f64>, net: Option<f64>) -> NormalizedListing {
        NormalizedListing {
            source: "hepsiemlak".to_string(),
            source_listing_id: "1".to_string(),
            url: None,
            title: None,
            listing_kind: kind,
            property_type: None,
            district: "Kadıköy".to_string(),
            neighborhood: None,
            latitude: None,
            longitude: None,
            rooms: Some(2),
            living_rooms: Some(1),
            bathrooms: None,
            gross_m2: gross,
            net_m2: net,
            floor: None,
            total_floors: None,
            building_age: None,
            heating: None,
            furnished: None,
            facade: None,
            price_tl: price,
            last_updated: None,
            signature: "s".to_string(),
        }
    }

    #[test]
    fn sale_price_bounds() {
        assert!(hard_flags(&listing(ListingKind::Sale, 50_000, None, None))
            .contains(&OutlierFlag::PriceImplausible));
        assert!(hard_flags(&listing(ListingKind::Sale, 600_000_000, None, None))
            .contains(&OutlierFlag::PriceImplausible));
        assert!(hard_flags(&listing(ListingKind::Sale, 5_000_000, None, None)).is_empty());
    }

    #[test]
    fn rent_price_bounds() {
        assert!(hard_flags(&listing(ListingKind::Rent, 500, None, None))
            .contains(&OutlierFlag::PriceImplausible));
        assert!(hard_flags(&listing(ListingKind::Rent, 45_000, None, None)).is_empty());
    }

    #[test]
    fn area_bounds_and_net_gross_consistency() {
        assert!(hard_flags(&listing(ListingKind::Sale, 5_000_000, None, Some(5.0)))
            .contains(&OutlierFlag::AreaImplausible));
        assert!(hard_flags(&listing(ListingKind::Sale, 5_000_000, Some(100.0), Some(120.0)))
            .contains(&OutlierFlag::NetExceedsGross));
        // 5% tolerance for rounding on the portal side
        assert!(hard_flags(&listing(ListingKind::Sale, 5_000_000, Some(100.0), Some(104.0)))
            .is_empty());
    }

    #[test]
    fn screen_flags_extreme_price_per_m2() {
        // 9 peers around 100k TL/m², one at 10x
        let mut pairs: Vec<(i64, f64)> = (0..9)
            .map(|i| (i, 95_000.0 + (i as f64) * 1_500.0))
            .collect();
        pairs.push((99, 1_000_000.0));

        let flagged = screen_segment_prices(&pairs);
        assert_eq!(flagged, vec![99]);
    }

    #[test]
    fn screen_needs_enough_peers() {
        let pairs: Vec<(i64, f64)> = vec![(1, 100.0), (2, 110.0), (3, 5000.0)];
        assert!(screen_segment_prices(&pairs).is_empty());
    }

    #[test]
    fn screen_tolerates_identical_prices() {
        let pairs: Vec<(i64, f64)> = (0..10).map(|i| (i, 100_000.0)).collect();
        assert!(screen_segment_prices(&pairs).is_empty());
    }
}
