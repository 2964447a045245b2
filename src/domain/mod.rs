pub mod changes;
pub mod listing;
pub mod logic;
