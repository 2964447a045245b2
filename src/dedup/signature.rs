// src/dedup/signature.rs
//
// Exact-duplicate detection. Two listings with equal signatures describe the
// same dwelling regardless of source. The signature is stable across runs
// and across field ordering: it hashes a canonical attribute tuple.

use crate::cleaning::parse::fold_text;
use crate::domain::listing::NormalizedListing;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// URL-safe base64 (no padding) of the SHA-256 digest of the canonical tuple.
pub fn compute_signature(listing: &NormalizedListing) -> String {
    let tuple = canonical_tuple(listing);
    let digest = Sha256::digest(tuple.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Building-age buckets used in the signature; a year of drift between
/// scrapes must not split a dwelling.
pub fn age_bucket(age: Option<u32>) -> &'static str {
    match age {
        None => "?",
        Some(0) => "0",
        Some(1..=5) => "1-5",
        Some(6..=10) => "6-10",
        Some(11..=20) => "11-20",
        Some(_) => "21+",
    }
}

fn canonical_tuple(l: &NormalizedListing) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        l.listing_kind.as_str(),
        fold_text(&l.district),
        l.neighborhood.as_deref().map(fold_text).unwrap_or_default(),
        l.rooms_key(),
        round_m2(l.net_m2),
        round_m2(l.gross_m2),
        l.floor.map(|f| f.to_string()).unwrap_or_else(|| "?".into()),
        age_bucket(l.building_age),
    )
}

/// Nearest multiple of 5; portals round areas inconsistently.
fn round_m2(m2: Option<f64>) -> String {
    match m2 {
        Some(v) => (((v / 5.0).round() as i64) * 5).to_string(),
        None => "?".to_string(),
    }
}
