// src/valuation/comps.rs
//
// Comparables estimate: the k nearest clean listings in the subject's
// segment by net-m² distance (geo distance as tiebreak when both sides
// have coordinates). The estimate is a weighted median price per m² scaled
// by the subject's net area; the range comes from the comp p25/p75.

use crate::analytics::stats::{quantile, weighted_median};
use crate::db::segments::SegmentRow;
use crate::dedup::matcher::haversine_m;
use crate::valuation::Subject;

pub const COMP_K: usize = 7;

#[derive(Debug, Clone)]
pub struct CompEstimate {
    pub estimate: f64,
    pub low: f64,
    pub high: f64,
    pub comp_count: usize,
}

pub fn comparables_estimate(
    rows: &[SegmentRow],
    subject: &Subject,
    subject_lat_lon: Option<(f64, f64)>,
) -> Option<CompEstimate> {
    let district_key = crate::cleaning::parse::fold_text(&subject.district);
    let rooms_key = subject.rooms_key();

    let mut comps: Vec<&SegmentRow> = rows
        .iter()
        .filter(|r| {
            r.listing_kind == subject.listing_kind.as_str()
                && r.district_key == district_key
                && r.rooms_key == rooms_key
                && r.price_per_m2().is_some()
        })
        .collect();
    if comps.is_empty() {
        return None;
    }

    comps.sort_by(|a, b| {
        let da = area_distance(a, subject.net_m2);
        let db = area_distance(b, subject.net_m2);
        da.total_cmp(&db)
            .then_with(|| geo_distance(a, subject_lat_lon).total_cmp(&geo_distance(b, subject_lat_lon)))
            .then(a.id.cmp(&b.id))
    });
    comps.truncate(COMP_K);

    let pairs: Vec<(f64, f64)> = comps
        .iter()
        .filter_map(|r| {
            let ppm2 = r.price_per_m2()?;
            let weight = 1.0 / (1.0 + area_distance(r, subject.net_m2));
            Some((ppm2, weight))
        })
        .collect();

    let median_ppm2 = weighted_median(&pairs)?;
    let ppm2_values: Vec<f64> = pairs.iter().map(|(v, _)| *v).collect();
    let low = quantile(&ppm2_values, 0.25)?;
    let high = quantile(&ppm2_values, 0.75)?;

    Some(CompEstimate {
        estimate: median_ppm2 * subject.net_m2,
        low: low * subject.net_m2,
        high: high * subject.net_m2,
        comp_count: pairs.len(),
    })
}

fn area_distance(row: &SegmentRow, subject_net: f64) -> f64 {
    match row.net_m2.or(row.gross_m2) {
        Some(net) => (net - subject_net).abs(),
        None => f64::MAX,
    }
}

fn geo_distance(row: &SegmentRow, subject: Option<(f64, f64)>) -> f64 {
    match (subject, row.latitude, row.longitude) {
        (Some((slat, slon)), Some(lat), Some(lon)) => haversine_m(slat, slon, lat, lon),
        _ => f64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::listing::ListingKind;

    fn row(id: i64, net: f64, price: i64) -> SegmentRow {
        SegmentRow {
            id,
            listing_kind: "sale".to_string(),
            district: "Kadıköy".to_string(),
            district_key: "kadikoy".to_string(),
            rooms_key: "2+1".to_string(),
            rooms: Some(2),
            living_rooms: Some(1),
            price_tl: price,
            net_m2: Some(net),
            gross_m2: None,
            floor: None,
            building_age: None,
            furnished: None,
            latitude: None,
            longitude: None,
        }
    }

    fn subject(net: f64) -> Subject {
        Subject {
            listing_kind: ListingKind::Sale,
            district: "Kadıköy".to_string(),
            rooms: 2,
            living_rooms: 1,
            net_m2: net,
            building_age: None,
            floor: None,
            furnished: false,
        }
    }

    #[test]
    fn estimates_from_nearby_areas() {
        // 100k TL/m² across the segment
        let rows: Vec<SegmentRow> = (0..10)
            .map(|i| {
                let net = 80.0 + i as f64 * 5.0;
                row(i, net, (net * 100_000.0) as i64)
            })
            .collect();

        let est = comparables_estimate(&rows, &subject(100.0), None).expect("estimate");
        assert_eq!(est.comp_count, COMP_K);
        let rel_err = (est.estimate - 10_000_000.0).abs() / 10_000_000.0;
        assert!(rel_err < 0.01, "relative error {rel_err}");
        assert!(est.low <= est.estimate && est.estimate <= est.high);
    }

    #[test]
    fn ignores_other_segments() {
        let mut rows = vec![row(1, 100.0, 10_000_000)];
        rows[0].district_key = "besiktas".to_string();
        assert!(comparables_estimate(&rows, &subject(100.0), None).is_none());
    }

    #[test]
    fn prefers_closest_net_areas() {
        // Two tight comps at the subject's size and many far away with a
        // different price level.
        let mut rows = vec![row(1, 100.0, 10_000_000), row(2, 102.0, 10_200_000)];
        for i in 0..8 {
            rows.push(row(10 + i, 200.0, 50_000_000));
        }
        let est = comparables_estimate(&rows, &subject(100.0), None).expect("estimate");
        // Weighted median sits with the nearby comps, not the far ones.
        assert!(est.estimate < 15_000_000.0, "estimate {}", est.estimate);
    }
}
