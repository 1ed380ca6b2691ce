//! HTTP-level tests for brands, vehicles, bulk import and the health probe.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn create_brand(app: &TestApp, token: &str, name: &str) -> i64 {
    let (status, body) = app
        .post("/api/v1/brands", Some(token), json!({ "name": name }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "brand creation failed: {body}");
    body["data"]["id"].as_i64().expect("brand id")
}

async fn create_vehicle(app: &TestApp, token: &str, brand_id: i64, name: &str) -> i64 {
    let (status, body) = app
        .post(
            "/api/v1/vehicles",
            Some(token),
            json!({ "brand_id": brand_id, "name": name, "price": 195000, "seats": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "vehicle creation failed: {body}");
    body["data"]["id"].as_i64().expect("vehicle id")
}

fn names(list: &Value) -> Vec<&str> {
    list.as_array()
        .map(|items| items.iter().filter_map(|v| v["name"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_healthy"], true);
}

#[tokio::test]
async fn catalog_is_public_to_read() {
    let app = TestApp::new().await;

    let (brands, body) = app.get("/api/v1/brands", None).await;
    let (vehicles, _) = app.get("/api/v1/vehicles", None).await;

    assert_eq!(brands, StatusCode::OK);
    assert_eq!(vehicles, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn writes_need_a_session_and_capability() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("alice", "user").await;
    let brand = json!({ "name": "Annis" });

    let (anonymous, _) = app.post("/api/v1/brands", None, brand.clone()).await;
    let (plain_user, body) = app.post("/api/v1/brands", Some(&token), brand).await;

    assert_eq!(anonymous, StatusCode::UNAUTHORIZED);
    assert_eq!(plain_user, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn brand_without_dealership_is_placed_by_name() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;

    let (status, body) = app
        .post(
            "/api/v1/brands",
            Some(&token),
            json!({ "name": "Annis", "dealership_name": "  " }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["dealership_name"], "Concessionnaire A-F");
    assert_eq!(body["data"]["dealership_location"], "Perrytonia");
}

#[tokio::test]
async fn duplicate_brand_name_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;
    create_brand(&app, &token, "Annis").await;

    let (status, body) = app
        .post("/api/v1/brands", Some(&token), json!({ "name": "Annis" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_NAME");
}

#[tokio::test]
async fn brand_detail_lists_its_vehicles() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;
    let annis = create_brand(&app, &token, "Annis").await;
    let pegassi = create_brand(&app, &token, "Pegassi").await;
    create_vehicle(&app, &token, annis, "Elegy").await;
    create_vehicle(&app, &token, annis, "Euros").await;
    create_vehicle(&app, &token, pegassi, "Zentorno").await;

    let (status, body) = app.get(&format!("/api/v1/brands/{annis}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body["data"]["vehicles"]), vec!["Elegy", "Euros"]);

    let (_, body) = app
        .get(&format!("/api/v1/vehicles?brand_id={pegassi}"), None)
        .await;
    assert_eq!(names(&body["data"]), vec!["Zentorno"]);

    let (_, body) = app.get("/api/v1/brands", None).await;
    let counts: Vec<i64> = body["data"]
        .as_array()
        .map(|list| list.iter().filter_map(|b| b["vehicle_count"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(counts.iter().sum::<i64>(), 3);
}

#[tokio::test]
async fn vehicle_for_missing_brand_is_not_found() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;

    let (status, body) = app
        .post(
            "/api/v1/vehicles",
            Some(&token),
            json!({ "brand_id": 4242, "name": "Ghost" }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;
    let brand = create_brand(&app, &token, "Annis").await;

    let (status, body) = app
        .post(
            "/api/v1/vehicles",
            Some(&token),
            json!({ "brand_id": brand, "name": "Elegy", "price": -1 }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn vehicle_update_and_delete() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;
    let brand = create_brand(&app, &token, "Annis").await;
    let vehicle = create_vehicle(&app, &token, brand, "Elegy").await;

    let (status, body) = app
        .put(
            &format!("/api/v1/vehicles/{vehicle}"),
            Some(&token),
            json!({ "brand_id": brand, "name": "Elegy RH8", "price": 95000 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Elegy RH8");
    assert_eq!(body["data"]["price"], 95000);

    let (status, _) = app
        .delete(&format!("/api/v1/vehicles/{vehicle}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/v1/vehicles/{vehicle}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_brand_removes_its_vehicles() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;
    let brand = create_brand(&app, &token, "Annis").await;
    let vehicle = create_vehicle(&app, &token, brand, "Elegy").await;

    let (status, _) = app
        .delete(&format!("/api/v1/brands/{brand}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (brand_status, _) = app.get(&format!("/api/v1/brands/{brand}"), None).await;
    let (vehicle_status, _) = app.get(&format!("/api/v1/vehicles/{vehicle}"), None).await;
    assert_eq!(brand_status, StatusCode::NOT_FOUND);
    assert_eq!(vehicle_status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn import_counts_created_and_rejected_entries() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;
    create_brand(&app, &token, "Pegassi").await;

    let (status, body) = app
        .post(
            "/api/v1/import",
            Some(&token),
            json!({ "vehicles": [
                { "brand": "Pegassi", "name": "Zentorno", "price": "725000" },
                { "brand": "Pegassi", "model": "Osiris", "vmax": "250 km/h" },
                { "brand": "Shitzu", "name": "Hakuchou", "category": "moto" },
                { "name": "No brand at all" }
            ] }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], 3);
    assert_eq!(body["data"]["errors"], 1);

    let (_, body) = app.get("/api/v1/brands", None).await;
    let shitzu = body["data"]
        .as_array()
        .and_then(|list| list.iter().find(|b| b["name"] == "Shitzu"))
        .cloned()
        .expect("imported brand created");
    assert_eq!(shitzu["dealership_name"], "Concessionnaire Moto/Quad");

    let (_, body) = app.get("/api/v1/vehicles", None).await;
    let osiris = body["data"]
        .as_array()
        .and_then(|list| list.iter().find(|v| v["name"] == "Osiris"))
        .cloned()
        .expect("named from model");
    assert_eq!(osiris["vmax"], 250);
}

#[tokio::test]
async fn import_requires_a_vehicle_array() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("boss", "admin").await;

    let (status, body) = app
        .post("/api/v1/import", Some(&token), json!({ "vehicles": "nope" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn import_is_refused_without_capability() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_and_login("alice", "user").await;

    let (status, _) = app
        .post("/api/v1/import", Some(&token), json!({ "vehicles": [] }))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
