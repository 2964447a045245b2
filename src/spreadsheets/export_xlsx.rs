use crate::domain::listing::ListingRow;
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use rust_xlsxwriter::Workbook;

pub fn export_listings_xlsx(listings: &[ListingRow], city: &str) -> ResultResp {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    // Headers
    let headers = [
        "Source",
        "Listing ID",
        "Title",
        "Kind",
        "District",
        "Neighborhood",
        "Rooms",
        "Net m²",
        "Gross m²",
        "Floor",
        "Building Age",
        "Price (TL)",
        "Flags",
        "Dwelling",
        "First Seen",
        "Last Seen",
    ];

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| {
                ServerError::XlsxError(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    // Rows
    for (i, listing) in listings.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet
            .write_string(r, 0, &listing.source)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write source: {}", e)))?;

        worksheet
            .write_string(r, 1, &listing.source_listing_id)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write listing id: {}", e)))?;

        let title = listing.title.as_deref().unwrap_or("");
        worksheet
            .write_string(r, 2, title)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write title: {}", e)))?;

        worksheet
            .write_string(r, 3, &listing.listing_kind)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write kind: {}", e)))?;

        worksheet
            .write_string(r, 4, &listing.district)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write district: {}", e)))?;

        let neighborhood = listing.neighborhood.as_deref().unwrap_or("");
        worksheet
            .write_string(r, 5, neighborhood)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write neighborhood: {}", e)))?;

        worksheet
            .write_string(r, 6, &listing.rooms_key)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write rooms: {}", e)))?;

        worksheet
            .write_number(r, 7, listing.net_m2.unwrap_or(0.0))
            .map_err(|e| ServerError::XlsxError(format!("Failed to write net m2: {}", e)))?;

        worksheet
            .write_number(r, 8, listing.gross_m2.unwrap_or(0.0))
            .map_err(|e| ServerError::XlsxError(format!("Failed to write gross m2: {}", e)))?;

        worksheet
            .write_number(r, 9, listing.floor.unwrap_or(0) as f64)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write floor: {}", e)))?;

        worksheet
            .write_number(r, 10, listing.building_age.unwrap_or(0) as f64)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write building age: {}", e)))?;

        worksheet
            .write_number(r, 11, listing.price_tl as f64)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write price: {}", e)))?;

        worksheet
            .write_string(r, 12, &listing.outlier_flags)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write flags: {}", e)))?;

        let dwelling = listing
            .dwelling_id
            .map(|d| d.to_string())
            .unwrap_or_default();
        worksheet
            .write_string(r, 13, &dwelling)
            .map_err(|e| ServerError::XlsxError(format!("Failed to write dwelling: {}", e)))?;

        worksheet
            .write_string(r, 14, &listing.first_seen_at.format("%Y-%m-%d").to_string())
            .map_err(|e| ServerError::XlsxError(format!("Failed to write first seen: {}", e)))?;

        worksheet
            .write_string(r, 15, &listing.last_seen_at.format("%Y-%m-%d").to_string())
            .map_err(|e| ServerError::XlsxError(format!("Failed to write last seen: {}", e)))?;
    }

    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {}", e)))?;

    xlsx_response(buffer, &format!("listings_{city}.xlsx"))
}
