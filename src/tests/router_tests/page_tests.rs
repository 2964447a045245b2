use crate::config::Config;
use crate::db::listings::save_raw_listings;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, get, make_db, post, sample_raw};

#[test]
fn overview_page_renders() {
    let db = make_db("router_overview");
    let config = Config::for_tests();

    let mut resp = handle(get("/"), &db, &config).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(&mut resp);
    assert!(body.contains("Market Overview"));
    assert!(body.contains("No scrape runs yet."));
}

#[test]
fn listings_page_filters_by_encoded_district() {
    let db = make_db("router_listings");
    let config = Config::for_tests();

    let raw = sample_raw("123-45", "5.500.000 TL", "130 m2 / 110 m2");
    save_raw_listings(&db, &[raw], "page-1").unwrap();

    // "Kadıköy" percent-encoded, as a browser sends it.
    let mut resp = handle(
        get("/listings?district=Kad%C4%B1k%C3%B6y&kind=sale"),
        &db,
        &config,
    )
    .unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(&mut resp);
    assert!(body.contains("Kadıköy"));
    assert!(body.contains("5.500.000 TL"));

    let mut other = handle(
        get("/listings?district=Be%C5%9Fikta%C5%9F"),
        &db,
        &config,
    )
    .unwrap();
    let other_body = body_string(&mut other);
    assert!(other_body.contains("No listings match"));
}

#[test]
fn segments_page_renders_after_saving() {
    let db = make_db("router_segments");
    let config = Config::for_tests();

    let batch = vec![
        sample_raw("1-1", "4.000.000 TL", "95 m2 / 80 m2"),
        sample_raw("2-2", "5.000.000 TL", "120 m2 / 100 m2"),
        sample_raw("3-3", "6.000.000 TL", "150 m2 / 125 m2"),
    ];
    save_raw_listings(&db, &batch, "page-1").unwrap();

    let mut resp = handle(get("/segments"), &db, &config).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(&mut resp);
    assert!(body.contains("Kadıköy"));
    assert!(body.contains("3+1"));
}

#[test]
fn changes_and_runs_pages_render_empty() {
    let db = make_db("router_empty_pages");
    let config = Config::for_tests();

    let mut changes = handle(get("/changes"), &db, &config).unwrap();
    assert_eq!(changes.status(), 200);
    assert!(body_string(&mut changes).contains("No tracked-field changes"));

    let mut runs = handle(get("/runs"), &db, &config).unwrap();
    assert_eq!(runs.status(), 200);
    assert!(body_string(&mut runs).contains("No runs recorded yet."));
}

#[test]
fn unknown_route_is_not_found() {
    let db = make_db("router_not_found");
    let config = Config::for_tests();

    let err = handle(get("/nope"), &db, &config).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));
}

#[test]
fn scrape_without_base_url_is_a_config_error() {
    let db = make_db("router_scrape_config");
    let config = Config::for_tests(); // base_url is None

    let err = handle(post("/scrape"), &db, &config).unwrap_err();
    assert!(matches!(err, ServerError::Config(_)));
}
