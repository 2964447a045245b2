pub mod export_xlsx;
pub mod segments_csv;

pub use export_xlsx::export_listings_xlsx;
pub use segments_csv::export_segments_csv;
