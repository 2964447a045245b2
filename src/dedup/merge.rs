// src/dedup/merge.rs
//
// Survivorship: when a dwelling group gains a member, one listing becomes
// the representative. Duplicate listings are never deleted; the dwelling is
// the unit of analysis, listings remain the unit of observation.

use chrono::NaiveDate;

/// What survivorship needs to know about each member of a dwelling group.
#[derive(Debug, Clone)]
pub struct MemberSummary {
    pub listing_id: i64,
    pub last_updated: Option<NaiveDate>,
    /// Count of non-null fields, the tiebreak.
    pub completeness: i64,
}

/// The representative is the member with the freshest `last_updated`
/// (members without one lose); ties go to the most complete record, then
/// to the lowest id so the choice is stable.
pub fn choose_representative(members: &[MemberSummary]) -> Option<i64> {
    members
        .iter()
        .max_by(|a, b| {
            a.last_updated
                .cmp(&b.last_updated)
                .then(a.completeness.cmp(&b.completeness))
                .then(b.listing_id.cmp(&a.listing_id))
        })
        .map(|m| m.listing_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, date: Option<(i32, u32, u32)>, completeness: i64) -> MemberSummary {
        MemberSummary {
            listing_id: id,
            last_updated: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            completeness,
        }
    }

    #[test]
    fn freshest_last_updated_wins() {
        let members = vec![
            member(1, Some((2025, 8, 1)), 18),
            member(2, Some((2025, 8, 15)), 3),
            member(3, None, 18),
        ];
        assert_eq!(choose_representative(&members), Some(2));
    }

    #[test]
    fn completeness_breaks_ties() {
        let members = vec![
            member(1, Some((2025, 8, 15)), 5),
            member(2, Some((2025, 8, 15)), 12),
        ];
        assert_eq!(choose_representative(&members), Some(2));
    }

    #[test]
    fn lowest_id_is_the_stable_fallback() {
        let members = vec![member(7, None, 4), member(3, None, 4)];
        assert_eq!(choose_representative(&members), Some(3));
    }

    #[test]
    fn empty_group_has_no_representative() {
        assert_eq!(choose_representative(&[]), None);
    }
}
