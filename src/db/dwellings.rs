use crate::dedup::matcher::{self, MatchCandidate, MatchVerdict};
use crate::dedup::merge::{choose_representative, MemberSummary};
use crate::domain::listing::NormalizedListing;
use crate::errors::ServerError;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

// SQLite evaluates `col IS NOT NULL` to 0/1, so summing them gives the
// completeness count used by survivorship.
const COMPLETENESS_EXPR: &str = "(url IS NOT NULL) + (title IS NOT NULL) + \
    (property_type IS NOT NULL) + (neighborhood IS NOT NULL) + \
    (latitude IS NOT NULL) + (longitude IS NOT NULL) + (rooms IS NOT NULL) + \
    (bathrooms IS NOT NULL) + (gross_m2 IS NOT NULL) + (net_m2 IS NOT NULL) + \
    (floor IS NOT NULL) + (total_floors IS NOT NULL) + (building_age IS NOT NULL) + \
    (heating IS NOT NULL) + (furnished IS NOT NULL) + (facade IS NOT NULL) + \
    (last_updated IS NOT NULL)";

/// Links a freshly saved listing to its dwelling: an exact signature match
/// joins outright; otherwise the fuzzy matcher scores candidates in the
/// listing's block; otherwise a new dwelling is created. Near-miss pairs
/// are stored in `possible_matches` for review, never merged.
pub fn assign_dwelling(
    tx: &Connection,
    listing_id: i64,
    nl: &NormalizedListing,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    // Exact duplicates: same dedup signature.
    let exact: Option<i64> = tx
        .query_row(
            "SELECT id FROM dwellings WHERE signature = ?1 LIMIT 1",
            params![nl.signature],
            |r| r.get(0),
        )
        .optional()?;

    if let Some(dwelling_id) = exact {
        join_dwelling(tx, listing_id, dwelling_id, "exact", 1.0, now)?;
        return Ok(());
    }

    // Near duplicates: score candidates within the same block.
    let candidates = block_candidates(tx, listing_id, nl)?;
    let mut best: Option<(f64, &MatchCandidate)> = None;
    for candidate in &candidates {
        let score = matcher::score_pair(nl, candidate);
        match matcher::verdict(score) {
            MatchVerdict::Duplicate | MatchVerdict::Possible => {
                if best.map(|(s, _)| score > s).unwrap_or(true) {
                    best = Some((score, candidate));
                }
                if matcher::verdict(score) == MatchVerdict::Possible {
                    record_possible_match(tx, listing_id, candidate.id, score, now)?;
                }
            }
            MatchVerdict::Distinct => {}
        }
    }

    if let Some((score, candidate)) = best {
        if matcher::verdict(score) == MatchVerdict::Duplicate {
            if let Some(dwelling_id) = candidate.dwelling_id {
                join_dwelling(tx, listing_id, dwelling_id, "fuzzy", score, now)?;
                return Ok(());
            }
        }
    }

    new_dwelling(tx, listing_id, nl, now)
}

/// Drops the listing from its dwelling (before re-matching after a
/// signature change). An emptied dwelling is deleted, a survivor group
/// gets a fresh representative.
pub fn unassign_listing(
    tx: &Connection,
    listing_id: i64,
    dwelling_id: Option<i64>,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    tx.execute(
        "UPDATE listings SET dwelling_id = NULL, match_method = NULL, match_score = NULL WHERE id = ?1",
        params![listing_id],
    )?;
    if let Some(dwelling_id) = dwelling_id {
        refresh_dwelling(tx, dwelling_id, now)?;
    }
    Ok(())
}

pub fn touch_dwelling(
    tx: &Connection,
    dwelling_id: i64,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    tx.execute(
        "UPDATE dwellings SET last_seen_at = ?1 WHERE id = ?2",
        params![now, dwelling_id],
    )?;
    Ok(())
}

fn block_candidates(
    tx: &Connection,
    listing_id: i64,
    nl: &NormalizedListing,
) -> Result<Vec<MatchCandidate>, ServerError> {
    let mut stmt = tx.prepare(
        "SELECT id, dwelling_id, signature, title, price_tl, net_m2, latitude, longitude, \
                floor, building_age \
         FROM listings \
         WHERE listing_kind = ?1 AND district_key = ?2 AND rooms_key = ?3 AND id != ?4",
    )?;
    let rows = stmt.query_map(
        params![
            nl.listing_kind.as_str(),
            crate::cleaning::parse::fold_text(&nl.district),
            nl.rooms_key(),
            listing_id
        ],
        |row| {
            Ok(MatchCandidate {
                id: row.get(0)?,
                dwelling_id: row.get(1)?,
                signature: row.get(2)?,
                title: row.get(3)?,
                price_tl: row.get(4)?,
                net_m2: row.get(5)?,
                latitude: row.get(6)?,
                longitude: row.get(7)?,
                floor: row.get(8)?,
                building_age: row.get(9)?,
            })
        },
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn join_dwelling(
    tx: &Connection,
    listing_id: i64,
    dwelling_id: i64,
    method: &str,
    score: f64,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    tx.execute(
        "UPDATE listings SET dwelling_id = ?1, match_method = ?2, match_score = ?3 WHERE id = ?4",
        params![dwelling_id, method, score, listing_id],
    )?;
    refresh_dwelling(tx, dwelling_id, now)
}

fn new_dwelling(
    tx: &Connection,
    listing_id: i64,
    nl: &NormalizedListing,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    tx.execute(
        "INSERT INTO dwellings (signature, representative_listing_id, district, neighborhood, \
                                rooms_key, member_count, first_seen_at, last_seen_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
        params![
            nl.signature,
            listing_id,
            nl.district,
            nl.neighborhood,
            nl.rooms_key(),
            now
        ],
    )?;
    let dwelling_id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE listings SET dwelling_id = ?1, match_method = 'new', match_score = NULL WHERE id = ?2",
        params![dwelling_id, listing_id],
    )?;
    Ok(())
}

/// Recomputes member count and representative after membership changed.
fn refresh_dwelling(
    tx: &Connection,
    dwelling_id: i64,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    let sql = format!(
        "SELECT id, last_updated, {COMPLETENESS_EXPR} FROM listings WHERE dwelling_id = ?1"
    );
    let mut stmt = tx.prepare(&sql)?;
    let rows = stmt.query_map(params![dwelling_id], |row| {
        Ok(MemberSummary {
            listing_id: row.get(0)?,
            last_updated: row.get(1)?,
            completeness: row.get(2)?,
        })
    })?;

    let mut members = Vec::new();
    for r in rows {
        members.push(r?);
    }

    match choose_representative(&members) {
        Some(representative) => {
            tx.execute(
                "UPDATE dwellings SET representative_listing_id = ?1, member_count = ?2, last_seen_at = ?3 \
                 WHERE id = ?4",
                params![representative, members.len() as i64, now, dwelling_id],
            )?;
        }
        None => {
            tx.execute("DELETE FROM dwellings WHERE id = ?1", params![dwelling_id])?;
        }
    }
    Ok(())
}

fn record_possible_match(
    tx: &Connection,
    listing_id: i64,
    other_listing_id: i64,
    score: f64,
    now: NaiveDateTime,
) -> Result<(), ServerError> {
    tx.execute(
        "INSERT INTO possible_matches (listing_id, other_listing_id, score, created_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(listing_id, other_listing_id) DO UPDATE SET score = excluded.score",
        params![listing_id, other_listing_id, score, now],
    )?;
    Ok(())
}
