use crate::db::connection::Database;
use crate::errors::ServerError;

const SQL_SEGMENT_ROWS: &str = include_str!("../../sql/segment_rows.sql");

/// One representative listing per dwelling with the fields analytics and
/// valuation need. Outlier-flagged listings are already excluded.
#[derive(Debug, Clone)]
pub struct SegmentRow {
    pub id: i64,
    pub listing_kind: String,
    pub district: String,
    pub district_key: String,
    pub rooms_key: String,
    pub rooms: Option<u32>,
    pub living_rooms: Option<u32>,
    pub price_tl: i64,
    pub net_m2: Option<f64>,
    pub gross_m2: Option<f64>,
    pub floor: Option<i32>,
    pub building_age: Option<u32>,
    pub furnished: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SegmentRow {
    pub fn price_per_m2(&self) -> Option<f64> {
        let m2 = self.net_m2.or(self.gross_m2)?;
        if m2 > 0.0 {
            Some(self.price_tl as f64 / m2)
        } else {
            None
        }
    }

    pub fn rooms_total(&self) -> Option<u32> {
        Some(self.rooms? + self.living_rooms.unwrap_or(0))
    }
}

pub fn get_segment_rows(db: &Database) -> Result<Vec<SegmentRow>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(SQL_SEGMENT_ROWS)?;
        let rows = stmt.query_map([], |row| {
            Ok(SegmentRow {
                id: row.get(0)?,
                listing_kind: row.get(1)?,
                district: row.get(2)?,
                district_key: row.get(3)?,
                rooms_key: row.get(4)?,
                rooms: row.get(5)?,
                living_rooms: row.get(6)?,
                price_tl: row.get(7)?,
                net_m2: row.get(8)?,
                gross_m2: row.get(9)?,
                floor: row.get(10)?,
                building_age: row.get(11)?,
                furnished: row.get(12)?,
                latitude: row.get(13)?,
                longitude: row.get(14)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}
