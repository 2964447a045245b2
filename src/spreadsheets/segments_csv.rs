use crate::analytics::market::SegmentStats;
use crate::responses::csv::csv_field;
use crate::responses::{csv_response, ResultResp};

/// Segment statistics as CSV, one row per (kind, district, rooms) segment.
pub fn export_segments_csv(stats: &[SegmentStats], city: &str) -> ResultResp {
    let mut body = String::from(
        "kind,district,rooms,count,median_price,p25_price,p75_price,median_ppm2,mad_ppm2,gross_yield\n",
    );

    for s in stats {
        body.push_str(&format!(
            "{},{},{},{},{:.0},{:.0},{:.0},{},{},{}\n",
            csv_field(&s.listing_kind),
            csv_field(&s.district),
            csv_field(&s.rooms_key),
            s.count,
            s.median_price,
            s.p25_price,
            s.p75_price,
            s.median_ppm2.map(|v| format!("{v:.0}")).unwrap_or_default(),
            s.mad_ppm2.map(|v| format!("{v:.0}")).unwrap_or_default(),
            s.gross_yield
                .map(|v| format!("{v:.4}"))
                .unwrap_or_default(),
        ));
    }

    csv_response(body, &format!("segments_{city}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_the_header() {
        let stats = vec![SegmentStats {
            listing_kind: "sale".to_string(),
            district: "Kadıköy".to_string(),
            district_key: "kadikoy".to_string(),
            rooms_key: "2+1".to_string(),
            count: 12,
            median_price: 5_500_000.0,
            p25_price: 5_000_000.0,
            p75_price: 6_000_000.0,
            median_ppm2: Some(55_000.0),
            mad_ppm2: Some(4_000.0),
            gross_yield: None,
        }];

        let resp = export_segments_csv(&stats, "istanbul").unwrap();
        assert_eq!(resp.status(), 200);
    }
}
