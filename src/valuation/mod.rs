pub mod comps;
pub mod model;

use crate::domain::listing::ListingKind;

/// The dwelling whose price is being estimated, as entered on the
/// dashboard form.
#[derive(Debug, Clone)]
pub struct Subject {
    pub listing_kind: ListingKind,
    pub district: String,
    pub rooms: u32,
    pub living_rooms: u32,
    pub net_m2: f64,
    pub building_age: Option<u32>,
    pub floor: Option<i32>,
    pub furnished: bool,
}

impl Subject {
    pub fn rooms_key(&self) -> String {
        format!("{}+{}", self.rooms, self.living_rooms)
    }

    pub fn rooms_total(&self) -> u32 {
        self.rooms + self.living_rooms
    }
}
