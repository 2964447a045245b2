pub mod matcher;
pub mod merge;
pub mod signature;
