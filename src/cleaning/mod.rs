pub mod normalizer;
pub mod outliers;
pub mod parse;
