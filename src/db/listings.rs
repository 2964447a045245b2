use crate::cleaning::normalizer::normalize;
use crate::cleaning::outliers::{self, OutlierFlag};
use crate::cleaning::parse::fold_text;
use crate::db::connection::Database;
use crate::db::dwellings;
use crate::domain::listing::{ListingRow, NormalizedListing, TrackedListing};
use crate::errors::ServerError;
use crate::scraper::RawListing;
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

/// Per-batch counters surfaced on the scrape run row.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaveOutcome {
    pub saved: usize,
    pub rejected: usize,
}

/// Main entry point for saving scraped data, one transaction per page of
/// results: normalize each raw record (rejects logged and counted), diff
/// tracked fields against the stored state, log changes, upsert, append the
/// raw observation, and assign the listing to a dwelling. After the batch
/// commits, the robust price screen is re-run.
pub fn save_raw_listings(
    db: &Database,
    raws: &[RawListing],
    page_url: &str,
) -> Result<SaveOutcome, ServerError> {
    let now = Utc::now().naive_utc();

    let outcome = db.with_conn(|conn| {
        let tx = conn.transaction()?;
        let mut outcome = SaveOutcome::default();

        for raw in raws {
            let normalized = match normalize(raw) {
                Ok(n) => n,
                Err(reason) => {
                    eprintln!(
                        "⚠️ Rejecting record {}:{}: {reason}",
                        raw.source, raw.source_listing_id
                    );
                    outcome.rejected += 1;
                    continue;
                }
            };
            process_one_listing(&tx, raw, &normalized, page_url, now)?;
            outcome.saved += 1;
        }

        tx.commit()?;
        Ok(outcome)
    })?;

    rescreen_price_outliers(db)?;
    Ok(outcome)
}

fn process_one_listing(
    tx: &Connection,
    raw: &RawListing,
    nl: &NormalizedListing,
    page_url: &str,
    now: NaiveDateTime,
) -> Result<i64, ServerError> {
    let hard_flags = outliers::join_flags(&outliers::hard_flags(nl));

    let listing_id = match find_listing(tx, &nl.source, &nl.source_listing_id)? {
        Some(found) => {
            let changes = found.tracked.diff(nl);
            if !changes.is_empty() {
                log_changes(tx, &changes, now)?;
            }
            update_listing(tx, found.tracked.id, nl, &hard_flags, now)?;

            if found.signature != nl.signature {
                // The dwelling identity changed; drop the old membership
                // and re-match.
                dwellings::unassign_listing(tx, found.tracked.id, found.dwelling_id, now)?;
                dwellings::assign_dwelling(tx, found.tracked.id, nl, now)?;
            } else if let Some(dwelling_id) = found.dwelling_id {
                dwellings::touch_dwelling(tx, dwelling_id, now)?;
            }
            found.tracked.id
        }
        None => {
            let id = insert_listing(tx, nl, &hard_flags, now)?;
            log_initial_state(tx, id, nl, now)?;
            dwellings::assign_dwelling(tx, id, nl, now)?;
            id
        }
    };

    record_observation(tx, listing_id, raw, page_url, now)?;
    Ok(listing_id)
}

struct FoundListing {
    tracked: TrackedListing,
    signature: String,
    dwelling_id: Option<i64>,
}

fn find_listing(
    conn: &Connection,
    source: &str,
    source_listing_id: &str,
) -> Result<Option<FoundListing>, ServerError> {
    conn.query_row(
        "SELECT id, price_tl, listing_kind, furnished, heating, title, signature, dwelling_id \
         FROM listings WHERE source = ?1 AND source_listing_id = ?2",
        params![source, source_listing_id],
        |row| {
            Ok(FoundListing {
                tracked: TrackedListing {
                    id: row.get(0)?,
                    price_tl: row.get(1)?,
                    listing_kind: row.get(2)?,
                    furnished: row.get(3)?,
                    heating: row.get(4)?,
                    title: row.get(5)?,
                },
                signature: row.get(6)?,
                dwelling_id: row.get(7)?,
            })
        },
    )
    .optional()
    .map_err(ServerError::from)
}

fn insert_listing(
    tx: &Connection,
    nl: &NormalizedListing,
    outlier_flags: &str,
    now: NaiveDateTime,
) -> Result<i64, ServerError> {
    tx.execute(
        r#"
        INSERT INTO listings (
            source, source_listing_id, url, title, listing_kind, property_type,
            district, neighborhood, district_key, neighborhood_key, latitude, longitude,
            rooms, living_rooms, rooms_key, bathrooms, gross_m2, net_m2,
            floor, total_floors, building_age, heating, furnished, facade,
            price_tl, last_updated, signature, outlier_flags,
            first_seen_at, last_seen_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16, ?17, ?18,
            ?19, ?20, ?21, ?22, ?23, ?24,
            ?25, ?26, ?27, ?28,
            ?29, ?30
        )
        "#,
        params![
            nl.source,
            nl.source_listing_id,
            nl.url,
            nl.title,
            nl.listing_kind.as_str(),
            nl.property_type,
            nl.district,
            nl.neighborhood,
            fold_text(&nl.district),
            nl.neighborhood.as_deref().map(fold_text),
            nl.latitude,
            nl.longitude,
            nl.rooms,
            nl.living_rooms,
            nl.rooms_key(),
            nl.bathrooms,
            nl.gross_m2,
            nl.net_m2,
            nl.floor,
            nl.total_floors,
            nl.building_age,
            nl.heating,
            nl.furnished,
            nl.facade,
            nl.price_tl,
            nl.last_updated,
            nl.signature,
            outlier_flags,
            now,
            now,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

fn update_listing(
    tx: &Connection,
    listing_id: i64,
    nl: &NormalizedListing,
    outlier_flags: &str,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    tx.execute(
        r#"
        UPDATE listings SET
            url = ?1, title = ?2, listing_kind = ?3, property_type = ?4,
            district = ?5, neighborhood = ?6, district_key = ?7, neighborhood_key = ?8,
            latitude = ?9, longitude = ?10,
            rooms = ?11, living_rooms = ?12, rooms_key = ?13, bathrooms = ?14,
            gross_m2 = ?15, net_m2 = ?16, floor = ?17, total_floors = ?18,
            building_age = ?19, heating = ?20, furnished = ?21, facade = ?22,
            price_tl = ?23, last_updated = ?24, signature = ?25, outlier_flags = ?26,
            last_seen_at = ?27
        WHERE id = ?28
        "#,
        params![
            nl.url,
            nl.title,
            nl.listing_kind.as_str(),
            nl.property_type,
            nl.district,
            nl.neighborhood,
            fold_text(&nl.district),
            nl.neighborhood.as_deref().map(fold_text),
            nl.latitude,
            nl.longitude,
            nl.rooms,
            nl.living_rooms,
            nl.rooms_key(),
            nl.bathrooms,
            nl.gross_m2,
            nl.net_m2,
            nl.floor,
            nl.total_floors,
            nl.building_age,
            nl.heating,
            nl.furnished,
            nl.facade,
            nl.price_tl,
            nl.last_updated,
            nl.signature,
            outlier_flags,
            now,
            listing_id,
        ],
    )?;
    Ok(())
}

fn log_changes(
    tx: &Connection,
    changes: &[crate::domain::listing::ListingChange],
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    let mut stmt = tx.prepare(
        "INSERT INTO listing_history (listing_id, observed_at, field_name, previous_value, current_value) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for change in changes {
        stmt.execute(params![
            change.listing_id,
            now,
            change.field_name,
            change.previous_value,
            change.current_value,
        ])?;
    }
    Ok(())
}

/// For a newly discovered listing, logs the initial state of the tracked
/// fields so the history starts at discovery, not at the first change.
fn log_initial_state(
    tx: &Connection,
    listing_id: i64,
    nl: &NormalizedListing,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    let mut stmt = tx.prepare(
        "INSERT INTO listing_history (listing_id, observed_at, field_name, previous_value, current_value) \
         VALUES (?1, ?2, ?3, NULL, ?4)",
    )?;

    stmt.execute(params![listing_id, now, "price_tl", nl.price_tl.to_string()])?;
    stmt.execute(params![
        listing_id,
        now,
        "listing_kind",
        nl.listing_kind.as_str()
    ])?;
    if let Some(furnished) = nl.furnished {
        stmt.execute(params![listing_id, now, "furnished", furnished.to_string()])?;
    }
    if let Some(heating) = &nl.heating {
        stmt.execute(params![listing_id, now, "heating", heating])?;
    }
    if let Some(title) = &nl.title {
        stmt.execute(params![listing_id, now, "title", title])?;
    }
    Ok(())
}

fn record_observation(
    tx: &Connection,
    listing_id: i64,
    raw: &RawListing,
    page_url: &str,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    let raw_json = serde_json::to_string(raw).map_err(|e| ServerError::DbError(e.to_string()))?;
    tx.execute(
        "INSERT INTO listing_observations (listing_id, observed_at, page_url, raw_json) \
         VALUES (?1, ?2, ?3, ?4)",
        params![listing_id, now, page_url, raw_json],
    )?;
    Ok(())
}

/// Filterable listing table for the dashboard and the XLSX export.
/// Filters are matched against the folded keys, so "Kadıköy" and "kadikoy"
/// find the same rows.
pub fn get_listings_filtered(
    db: &Database,
    kind: Option<&str>,
    district: Option<&str>,
    rooms: Option<&str>,
    limit: usize,
) -> Result<Vec<ListingRow>, ServerError> {
    let mut sql = String::from(
        "SELECT id, source, source_listing_id, title, listing_kind, district, neighborhood, \
         rooms_key, net_m2, gross_m2, floor, building_age, price_tl, outlier_flags, \
         dwelling_id, match_method, first_seen_at, last_seen_at \
         FROM listings WHERE 1=1",
    );
    let mut filters: Vec<String> = Vec::new();

    if let Some(kind) = kind {
        sql.push_str(" AND listing_kind = ?");
        filters.push(kind.to_string());
    }
    if let Some(district) = district {
        sql.push_str(" AND district_key = ?");
        filters.push(fold_text(district));
    }
    if let Some(rooms) = rooms {
        sql.push_str(" AND rooms_key = ?");
        filters.push(rooms.trim().to_string());
    }
    sql.push_str(&format!(" ORDER BY last_seen_at DESC LIMIT {limit}"));

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filters.iter()), |row| {
            Ok(ListingRow {
                id: row.get(0)?,
                source: row.get(1)?,
                source_listing_id: row.get(2)?,
                title: row.get(3)?,
                listing_kind: row.get(4)?,
                district: row.get(5)?,
                neighborhood: row.get(6)?,
                rooms_key: row.get(7)?,
                net_m2: row.get(8)?,
                gross_m2: row.get(9)?,
                floor: row.get(10)?,
                building_age: row.get(11)?,
                price_tl: row.get(12)?,
                outlier_flags: row.get(13)?,
                dwelling_id: row.get(14)?,
                match_method: row.get(15)?,
                first_seen_at: row.get(16)?,
                last_seen_at: row.get(17)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}

/// Re-runs the robust per-segment price screen over every listing that is
/// either clean or flagged only by a previous screen pass, and rewrites the
/// `PriceOutlier` flag in both directions.
pub fn rescreen_price_outliers(db: &Database) -> Result<(), ServerError> {
    use std::collections::HashMap;

    let price_flag = OutlierFlag::PriceOutlier.as_str();

    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, listing_kind, district_key, rooms_key, \
                    CAST(price_tl AS REAL) / COALESCE(net_m2, gross_m2), outlier_flags \
             FROM listings \
             WHERE outlier_flags IN ('', ?1) AND COALESCE(net_m2, gross_m2) > 0",
        )?;
        let rows = stmt.query_map(params![price_flag], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut segments: HashMap<(String, String, String), Vec<(i64, f64)>> = HashMap::new();
        let mut previously_flagged: Vec<i64> = Vec::new();
        for r in rows {
            let (id, kind, district_key, rooms_key, ppm2, flags) = r?;
            if flags == price_flag {
                previously_flagged.push(id);
            }
            segments
                .entry((kind, district_key, rooms_key))
                .or_default()
                .push((id, ppm2));
        }

        let mut now_flagged: Vec<i64> = Vec::new();
        for pairs in segments.values() {
            now_flagged.extend(outliers::screen_segment_prices(pairs));
        }

        for id in &now_flagged {
            conn.execute(
                "UPDATE listings SET outlier_flags = ?1 WHERE id = ?2 AND outlier_flags = ''",
                params![price_flag, id],
            )?;
        }
        for id in previously_flagged {
            if !now_flagged.contains(&id) {
                conn.execute(
                    "UPDATE listings SET outlier_flags = '' WHERE id = ?1 AND outlier_flags = ?2",
                    params![id, price_flag],
                )?;
            }
        }
        Ok(())
    })
}

pub fn count_listings(conn: &Connection) -> Result<i64, ServerError> {
    conn.query_row("SELECT COUNT(*) FROM listings", [], |r| r.get(0))
        .map_err(ServerError::from)
}

pub fn count_dwellings(conn: &Connection) -> Result<i64, ServerError> {
    conn.query_row("SELECT COUNT(*) FROM dwellings", [], |r| r.get(0))
        .map_err(ServerError::from)
}

/// Listings first seen at or after the cutoff.
pub fn count_new_since(conn: &Connection, cutoff: NaiveDateTime) -> Result<i64, ServerError> {
    conn.query_row(
        "SELECT COUNT(*) FROM listings WHERE first_seen_at >= ?1",
        params![cutoff],
        |r| r.get(0),
    )
    .map_err(ServerError::from)
}

/// Listings not seen for longer than the cutoff.
pub fn count_unseen_since(conn: &Connection, cutoff: NaiveDateTime) -> Result<i64, ServerError> {
    conn.query_row(
        "SELECT COUNT(*) FROM listings WHERE last_seen_at < ?1",
        params![cutoff],
        |r| r.get(0),
    )
    .map_err(ServerError::from)
}
