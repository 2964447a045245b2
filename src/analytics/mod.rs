pub mod market;
pub mod stats;
