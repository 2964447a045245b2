use crate::config::Config;
use crate::db::listings::save_raw_listings;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, get, make_db, sample_raw};

#[test]
fn estimate_form_renders() {
    let db = make_db("estimate_form");
    let config = Config::for_tests();

    let mut resp = handle(get("/estimate"), &db, &config).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("action=\"/estimate/result\""));
    assert!(body.contains("net_m2"));
}

#[test]
fn estimate_result_with_empty_database() {
    let db = make_db("estimate_empty");
    let config = Config::for_tests();

    let mut resp = handle(
        get("/estimate/result?kind=sale&district=Kadikoy&rooms=3&living_rooms=1&net_m2=100"),
        &db,
        &config,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("Not enough clean listings"));
    assert!(body.contains("No comparable listings"));
}

#[test]
fn estimate_result_finds_comparables() {
    let db = make_db("estimate_comps");
    let config = Config::for_tests();

    let batch = vec![
        sample_raw("1-1", "4.000.000 TL", "95 m2 / 80 m2"),
        sample_raw("2-2", "5.000.000 TL", "120 m2 / 100 m2"),
        sample_raw("3-3", "6.000.000 TL", "150 m2 / 125 m2"),
    ];
    save_raw_listings(&db, &batch, "page-1").unwrap();

    // The folded filter key matches the stored "Kadıköy" rows.
    let mut resp = handle(
        get("/estimate/result?kind=sale&district=kadikoy&rooms=3&living_rooms=1&net_m2=100"),
        &db,
        &config,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("Comparables"));
    assert!(body.contains("Range"));
    assert!(body.contains("comparable listings"));
}

#[test]
fn estimate_result_validates_its_inputs() {
    let db = make_db("estimate_validation");
    let config = Config::for_tests();

    let missing_district = handle(
        get("/estimate/result?kind=sale&rooms=3&net_m2=100"),
        &db,
        &config,
    )
    .unwrap_err();
    assert!(matches!(missing_district, ServerError::BadRequest(_)));

    let bad_area = handle(
        get("/estimate/result?kind=sale&district=Kadikoy&rooms=3&net_m2=abc"),
        &db,
        &config,
    )
    .unwrap_err();
    assert!(matches!(bad_area, ServerError::BadRequest(_)));

    let bad_kind = handle(
        get("/estimate/result?kind=timeshare&district=Kadikoy&rooms=3&net_m2=100"),
        &db,
        &config,
    )
    .unwrap_err();
    assert!(matches!(bad_kind, ServerError::BadRequest(_)));
}
