use crate::db::connection::Database;
use crate::domain::changes::ChangeViewModel;
use crate::domain::logic::derive_lifecycle_status;
use crate::errors::ServerError;
use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::params;

/// Recent change feed: every tracked-field change in the window, joined
/// with the listing's current context. The lifecycle status is derived per
/// row at query time, not stored.
pub fn get_recent_changes(
    db: &Database,
    days: i64,
    limit: usize,
) -> Result<Vec<ChangeViewModel>, ServerError> {
    let now = Utc::now().naive_utc();
    let window_start = now - Duration::days(days);
    let reduction_window = now - Duration::days(7);

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT
                h.observed_at,
                h.field_name,
                h.previous_value,
                h.current_value,
                l.id,
                l.title,
                l.district,
                l.neighborhood,
                l.rooms_key,
                l.price_tl,
                l.first_seen_at,
                l.last_seen_at,
                EXISTS(
                    SELECT 1 FROM listing_history r
                    WHERE r.listing_id = l.id
                      AND r.field_name = 'price_tl'
                      AND r.previous_value IS NOT NULL
                      AND CAST(r.current_value AS INTEGER) < CAST(r.previous_value AS INTEGER)
                      AND r.observed_at >= ?1
                ) AS recently_reduced
            FROM listing_history h
            JOIN listings l ON l.id = h.listing_id
            WHERE h.observed_at >= ?2
              AND h.previous_value IS NOT NULL
            ORDER BY h.observed_at DESC
            LIMIT {limit}
            "#
        ))?;

        let rows = stmt.query_map(params![reduction_window, window_start], |row| {
            let field_name: String = row.get(1)?;
            let previous_value: Option<String> = row.get(2)?;
            let current_value: String = row.get(3)?;
            let first_seen_at: NaiveDateTime = row.get(10)?;
            let last_seen_at: NaiveDateTime = row.get(11)?;
            let recently_reduced: bool = row.get(12)?;

            let change_type = match field_name.as_str() {
                "price_tl" => "Price Change",
                "listing_kind" => "Status Change",
                _ => "Detail Change",
            };

            let previous_value = previous_value.unwrap_or_default();
            let price_reduction = if field_name == "price_tl" {
                match (previous_value.parse::<i64>(), current_value.parse::<i64>()) {
                    (Ok(p), Ok(c)) if p > c => Some(p - c),
                    _ => None,
                }
            } else {
                None
            };

            Ok(ChangeViewModel {
                change_date: row.get(0)?,
                change_type: change_type.to_string(),
                field_name,
                previous_value,
                current_value,
                listing_id: row.get(4)?,
                title: row.get(5)?,
                district: row.get(6)?,
                neighborhood: row.get(7)?,
                rooms_key: row.get(8)?,
                price_tl: row.get(9)?,
                lifecycle_status: derive_lifecycle_status(
                    first_seen_at,
                    last_seen_at,
                    recently_reduced,
                    now,
                )
                .to_string(),
                price_reduction,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}
