use crate::config::Config;
use crate::db::connection::{init_db, Database};
use crate::router::handle;
use astra::Server;
use std::net::SocketAddr;

mod analytics;
mod cleaning;
mod config;
mod db;
mod dedup;
mod domain;
mod errors;
mod responses;
mod router;
mod scraper;
mod spreadsheets;
mod templates;
mod valuation;

#[cfg(test)]
mod tests;

fn main() {
    let config = Config::from_env();
    let db = Database::new(config.db_path.clone());

    if let Err(e) = init_db(&db, "sql/schema.sql") {
        eprintln!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    match std::env::args().nth(1).as_deref() {
        // One collector pass, then exit.
        Some("scrape") => {
            if let Err(e) = scraper::run_scrape_blocking(&db, &config) {
                eprintln!("❌ Scrape failed: {e}");
                std::process::exit(1);
            }
        }
        // Schema is already applied above; nothing else to do.
        Some("init") => {
            println!("Database ready at {}", config.db_path);
        }
        Some(other) => {
            eprintln!("Unknown command '{other}'. Usage: emlak_radar [scrape|init]");
            std::process::exit(2);
        }
        None => serve(db, config),
    }
}

fn serve(db: Database, config: Config) {
    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("❌ Invalid EMLAK_BIND '{}': {e}", config.bind_addr);
            std::process::exit(1);
        }
    };
    println!("Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &db, &config) {
        Ok(resp) => resp,
        Err(err) => templates::html_error_response(err),
    });

    if let Err(e) = result {
        eprintln!("Server ended with error: {e}");
    }

    println!("Server shut down cleanly.");
}
