// src/domain/logic.rs

use chrono::NaiveDateTime;

/// Determines the lifecycle status of a listing from its seen timestamps
/// and recent price history. The order of checks determines the precedence
/// of the status lifecycle.
///
/// A listing can be both recently reduced and stale; the reduction wins
/// while the listing is still being observed, absence wins once it is not.
pub fn derive_lifecycle_status(
    first_seen_at: NaiveDateTime,
    last_seen_at: NaiveDateTime,
    recently_reduced: bool,
    now: NaiveDateTime,
) -> &'static str {
    let age_days = (now - first_seen_at).num_days();
    let unseen_days = (now - last_seen_at).num_days();

    if age_days < 7 {
        return "New";
    }
    if unseen_days > 30 {
        return "Delisted";
    }
    if unseen_days > 14 {
        return "Stale";
    }
    if recently_reduced {
        return "PriceReduced";
    }
    "Active"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn fresh_listing_is_new_even_when_reduced() {
        let now = dt(2025, 8, 20);
        let status = derive_lifecycle_status(dt(2025, 8, 18), dt(2025, 8, 20), true, now);
        assert_eq!(status, "New");
    }

    #[test]
    fn long_unseen_listing_is_delisted() {
        let now = dt(2025, 8, 20);
        let status = derive_lifecycle_status(dt(2025, 5, 1), dt(2025, 7, 1), true, now);
        assert_eq!(status, "Delisted");
    }

    #[test]
    fn moderately_unseen_listing_is_stale() {
        let now = dt(2025, 8, 20);
        let status = derive_lifecycle_status(dt(2025, 5, 1), dt(2025, 8, 1), false, now);
        assert_eq!(status, "Stale");
    }

    #[test]
    fn reduced_and_seen_listing_is_price_reduced() {
        let now = dt(2025, 8, 20);
        let status = derive_lifecycle_status(dt(2025, 5, 1), dt(2025, 8, 19), true, now);
        assert_eq!(status, "PriceReduced");
    }

    #[test]
    fn otherwise_active() {
        let now = dt(2025, 8, 20);
        let status = derive_lifecycle_status(dt(2025, 5, 1), dt(2025, 8, 19), false, now);
        assert_eq!(status, "Active");
    }
}
