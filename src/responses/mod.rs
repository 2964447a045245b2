pub mod csv;
pub mod html;
pub mod xlsx;

// The alias lives in errors.rs; re-exported here so handlers can import
// everything response-shaped from one place.
pub use crate::errors::ResultResp;

pub use csv::csv_response;
pub use html::html_response;
pub use xlsx::xlsx_response;
