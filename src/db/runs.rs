use crate::errors::ServerError;
use rusqlite::{params, Connection};

#[derive(Debug)]
pub struct ScrapeRun {
    pub id: i64,
    pub source: String,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub pages_fetched: Option<i64>,
    pub listings_seen: Option<i64>,
    pub listings_saved: Option<i64>,
    pub listings_rejected: Option<i64>,
    pub success: Option<bool>,
    pub error_message: Option<String>,
}

pub fn start_scrape_run(conn: &Connection, source: &str, now: i64) -> Result<i64, ServerError> {
    conn.execute(
        "INSERT INTO scrape_runs (source, started_at, success) VALUES (?, ?, 0)",
        params![source, now],
    )?;
    Ok(conn.last_insert_rowid())
}

#[allow(clippy::too_many_arguments)]
pub fn end_scrape_run(
    conn: &Connection,
    run_id: i64,
    now: i64,
    pages: usize,
    seen: usize,
    saved: usize,
    rejected: usize,
    success: bool,
    error: Option<String>,
) -> Result<(), ServerError> {
    conn.execute(
        "UPDATE scrape_runs SET finished_at = ?, pages_fetched = ?, listings_seen = ?, listings_saved = ?, listings_rejected = ?, success = ?, error_message = ? WHERE id = ?",
        params![now, pages, seen, saved, rejected, success, error, run_id],
    )?;
    Ok(())
}

pub fn get_recent_scrapes(conn: &Connection) -> Result<Vec<ScrapeRun>, ServerError> {
    let mut stmt = conn.prepare(
        "SELECT id, source, started_at, finished_at, pages_fetched, listings_seen, listings_saved, listings_rejected, success, error_message \
         FROM scrape_runs ORDER BY started_at DESC LIMIT 50",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(ScrapeRun {
            id: row.get(0)?,
            source: row.get(1)?,
            started_at: row.get(2)?,
            finished_at: row.get(3)?,
            pages_fetched: row.get(4)?,
            listings_seen: row.get(5)?,
            listings_saved: row.get(6)?,
            listings_rejected: row.get(7)?,
            success: row.get(8)?,
            error_message: row.get(9)?,
        })
    })?;

    let mut runs = Vec::new();
    for r in rows {
        runs.push(r?);
    }
    Ok(runs)
}

pub fn get_last_run(conn: &Connection) -> Result<Option<ScrapeRun>, ServerError> {
    Ok(get_recent_scrapes(conn)?.into_iter().next())
}
