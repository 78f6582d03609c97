//! API integration tests
//!
//! Each test serves the full router with in-memory storage on an ephemeral port.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use rental_inventory_server::{
    api, config::AppConfig, repository::Repository, services::Services, AppState,
};

/// Start a server and return its API base URL
async fn spawn_app() -> String {
    let state = AppState::new(AppConfig::in_memory(), Services::new(Repository::in_memory()));
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    format!("http://{}/api/v1", addr)
}

async fn post_json(client: &Client, url: String, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get_json(client: &Client, url: String) -> (StatusCode, Value) {
    let response = client.get(url).send().await.expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Create a rental point and an equipment type, returning their ids
async fn seed_catalog(client: &Client, base: &str) -> (i64, i64) {
    let (status, point) = post_json(
        client,
        format!("{}/rental-points", base),
        json!({
            "name": "Absolut Sport",
            "address": "123 Main St",
            "opening_hours": "Mon-Sun 9:00-21:00"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, equipment_type) = post_json(
        client,
        format!("{}/equipment-types", base),
        json!({
            "type_name": "Mountain Bike",
            "category": "Bikes",
            "description": "21 speed"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        point["id"].as_i64().expect("point id"),
        equipment_type["id"].as_i64().expect("type id"),
    )
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) = get_json(&client, format!("{}/health", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&client, format!("{}/ready", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_rental_point_crud() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, point) = post_json(
        &client,
        format!("{}/rental-points", base),
        json!({ "name": "Velo City", "address": "7 River Rd", "opening_hours": "10-18" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = point["id"].as_i64().expect("id");

    let response = client
        .put(format!("{}/rental-points/{}", base, id))
        .json(&json!({ "name": "Velo City 2", "address": "7 River Rd", "opening_hours": "9-19" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["name"], "Velo City 2");

    let (status, found) = get_json(&client, format!("{}/rental-points?name=velo", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().map(Vec::len), Some(1));

    let response = client
        .delete(format!("{}/rental-points/{}", base, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, body) = get_json(&client, format!("{}/rental-points/{}", base, id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_duplicate_address_conflict() {
    let base = spawn_app().await;
    let client = Client::new();
    seed_catalog(&client, &base).await;

    let (status, body) = post_json(
        &client,
        format!("{}/rental-points", base),
        json!({ "name": "Other", "address": "123 Main St", "opening_hours": "9-21" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DuplicateAddress");
}

#[tokio::test]
async fn test_blank_name_rejected() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) = post_json(
        &client,
        format!("{}/equipment-types", base),
        json!({ "type_name": "", "category": "Bikes" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_rent_and_return_flow() {
    let base = spawn_app().await;
    let client = Client::new();
    let (point_id, type_id) = seed_catalog(&client, &base).await;

    let (status, record) = post_json(
        &client,
        format!("{}/available-equipment", base),
        json!({
            "rental_point_id": point_id,
            "equipment_type_id": type_id,
            "total_count": 10,
            "cost": 500
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["available_count"], 10);
    let id = record["id"].as_i64().expect("id");

    let (status, rented) = post_json(
        &client,
        format!("{}/available-equipment/{}/rent", base, id),
        json!({ "quantity": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rented["available_count"], 7);
    assert_eq!(rented["total_count"], 10);

    let (status, body) = post_json(
        &client,
        format!("{}/available-equipment/{}/rent", base, id),
        json!({ "quantity": 8 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "InsufficientStock");

    let (status, body) = post_json(
        &client,
        format!("{}/available-equipment/{}/return", base, id),
        json!({ "quantity": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ExceedsTotal");

    let (status, returned) = post_json(
        &client,
        format!("{}/available-equipment/{}/return", base, id),
        json!({ "quantity": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["available_count"], 10);

    let (_, availability) =
        get_json(&client, format!("{}/available-equipment/{}/availability", base, id)).await;
    assert_eq!(availability["available"], true);

    let (status, details) =
        get_json(&client, format!("{}/available-equipment/{}/details", base, id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["rental_point"]["name"], "Absolut Sport");
    assert_eq!(details["equipment_type"]["type_name"], "Mountain Bike");
    assert!(details["cost_unit"].is_string());
}

#[tokio::test]
async fn test_inventory_rules() {
    let base = spawn_app().await;
    let client = Client::new();
    let (point_id, type_id) = seed_catalog(&client, &base).await;

    let (status, body) = post_json(
        &client,
        format!("{}/available-equipment", base),
        json!({
            "rental_point_id": point_id,
            "equipment_type_id": type_id,
            "total_count": 2,
            "available_count": 3,
            "cost": 100
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "InvariantViolation");

    let (status, body) = post_json(
        &client,
        format!("{}/available-equipment", base),
        json!({
            "rental_point_id": 999,
            "equipment_type_id": type_id,
            "total_count": 2,
            "cost": 100
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "InvalidReference");

    let payload = json!({
        "rental_point_id": point_id,
        "equipment_type_id": type_id,
        "total_count": 5,
        "available_count": 0,
        "cost": 100
    });
    let (status, _) = post_json(&client, format!("{}/available-equipment", base), payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = post_json(&client, format!("{}/available-equipment", base), payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DuplicatePair");

    // Referenced catalog entries cannot be deleted
    let response = client
        .delete(format!("{}/rental-points/{}", base, point_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let (status, stats) = get_json(&client, format!("{}/stats", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["rental_points"], 1);
    assert_eq!(stats["equipment_types"], 1);
    assert_eq!(stats["equipment_records"], 1);
    assert_eq!(stats["equipment_records_in_stock"], 0);

    let (_, at_point) =
        get_json(&client, format!("{}/rental-points/{}/equipment", base, point_id)).await;
    assert_eq!(at_point.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_availability_of_unknown_record_is_false() {
    let base = spawn_app().await;
    let client = Client::new();

    let (status, body) =
        get_json(&client, format!("{}/available-equipment/77/availability", base)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
}
