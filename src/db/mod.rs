pub mod changes;
pub mod connection;
pub mod dwellings;
pub mod listings;
pub mod runs;
pub mod segments;

pub use connection::Database;
