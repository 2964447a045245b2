use crate::config::Config;
use crate::db::listings::save_raw_listings;
use crate::router::handle;
use crate::tests::utils::{body_string, get, make_db, sample_raw};

#[test]
fn listings_export_is_a_spreadsheet_download() {
    let db = make_db("export_xlsx");
    let config = Config::for_tests();

    let raw = sample_raw("123-45", "5.500.000 TL", "130 m2 / 110 m2");
    save_raw_listings(&db, &[raw], "page-1").unwrap();

    let resp = handle(get("/export/listings.xlsx"), &db, &config).unwrap();
    assert_eq!(resp.status(), 200);

    let content_type = resp
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.contains("spreadsheetml"));

    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(disposition.contains(".xlsx"));
}

#[test]
fn segments_export_is_csv() {
    let db = make_db("export_csv");
    let config = Config::for_tests();

    let batch = vec![
        sample_raw("1-1", "4.000.000 TL", "95 m2 / 80 m2"),
        sample_raw("2-2", "5.000.000 TL", "120 m2 / 100 m2"),
        sample_raw("3-3", "6.000.000 TL", "150 m2 / 125 m2"),
    ];
    save_raw_listings(&db, &batch, "page-1").unwrap();

    let mut resp = handle(get("/export/segments.csv"), &db, &config).unwrap();
    assert_eq!(resp.status(), 200);

    let content_type = resp
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.contains("text/csv"));

    let body = body_string(&mut resp);
    assert!(body.starts_with("kind,district,rooms,count"));
    assert!(body.contains("sale,Kadıköy,3+1,3"));
}
