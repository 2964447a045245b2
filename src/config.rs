use crate::errors::ServerError;
use std::env;

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// List-view URL including its query string; pages are appended
    /// as `&page={n}`. Required for scraping, not for serving.
    pub base_url: Option<String>,
    pub db_path: String,
    pub bind_addr: String,
    pub city: String,
    pub max_pages: u32,
    pub source: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            base_url: env::var("EMLAK_BASE_URL").ok().filter(|s| !s.is_empty()),
            db_path: env::var("EMLAK_DB").unwrap_or_else(|_| "emlak.sqlite3".to_string()),
            bind_addr: env::var("EMLAK_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            city: env::var("EMLAK_CITY").unwrap_or_else(|_| "İstanbul".to_string()),
            max_pages: env::var("EMLAK_PAGES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            source: env::var("EMLAK_SOURCE").unwrap_or_else(|_| "hepsiemlak".to_string()),
        }
    }

    /// Base URL or a config error naming the missing variable.
    pub fn require_base_url(&self) -> Result<&str, ServerError> {
        self.base_url
            .as_deref()
            .ok_or_else(|| ServerError::Config("EMLAK_BASE_URL is not set".to_string()))
    }
}

#[cfg(test)]
impl Config {
    /// Config for tests; no scraping, throwaway defaults.
    pub fn for_tests() -> Self {
        Config {
            base_url: None,
            db_path: ":memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            city: "İstanbul".to_string(),
            max_pages: 1,
            source: "hepsiemlak".to_string(),
        }
    }
}
