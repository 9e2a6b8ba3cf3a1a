use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use gear_matcher_api::{
    api::{create_router, AppState},
    config::Config,
    db::{Cache, CatalogSeed, MemoryStore},
};

const ADMIN_TOKEN: &str = "test-admin-token";

/// Mice 1-2, keyboards 10-11, headset 20, monitor 30, chair 40.
/// Bundles pair mouse 1 with keyboard 10 most of the time.
fn seed() -> CatalogSeed {
    serde_json::from_value(json!({
        "gear": [
            {"gear_id": 1, "name": "Viper V3 Pro", "type": "Mouse", "brand": "Razer",
             "specs": {"W (g)": "54", "H / W / L (cm)": "4.0 / 6.3 / 12.7", "Shape": "Ambidextrous", "sentiment_score": 9.2}},
            {"gear_id": 2, "name": "G Pro X Superlight 2", "type": "Mouse", "brand": "Logitech",
             "specs": "{\"W (g)\": \"60\", \"H / W / L (cm)\": \"4.0 / 6.4 / 12.5\", \"sentiment_score\": 8.8}"},
            {"gear_id": 10, "name": "Wooting 60HE", "type": "Keyboard", "brand": "Wooting",
             "specs": {"Form Factor": "60%", "sentiment_score": 9.0}},
            {"gear_id": 11, "name": "Apex Pro TKL", "type": "Keyboard", "brand": "SteelSeries",
             "specs": {"Form Factor": "TKL", "sentiment_score": 8.1}},
            {"gear_id": 20, "name": "Cloud II", "type": "Headset", "brand": "HyperX",
             "specs": {"Connection": "Wired", "sentiment_score": 8.0}},
            {"gear_id": 30, "name": "XL2566K", "type": "Monitor", "brand": "BenQ",
             "specs": {"Refresh Rate": "360Hz", "Resolution": "1920x1080", "Panel Tech": "TN"}},
            {"gear_id": 40, "name": "Titan Evo", "type": "Chair", "brand": "Secretlab",
             "specs": {"Max weight": "130", "Material": "Fabric", "Lumbar support": "Adjustable"}}
        ],
        "bundles": [
            {"id": 1, "gear_ids": [1, 10, 20]},
            {"id": 2, "gear_ids": [1, 10, 30]},
            {"id": 3, "gear_ids": [1, 10]},
            {"id": 4, "gear_ids": [2, 11, 40]},
            {"id": 5, "gear_ids": [2, 11]}
        ],
        "usage": [
            {"player_id": 100, "gear_id": 2},
            {"player_id": 101, "gear_id": 2},
            {"player_id": 102, "gear_id": 1}
        ]
    }))
    .unwrap()
}

fn create_test_server_with(config: Config) -> TestServer {
    let store = Arc::new(MemoryStore::from_seed(seed()));
    let state = AppState::new(store.clone(), store, Cache::in_memory(), &config);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(Config {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..Config::default()
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let response = server.get("/health").await;
    let header = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(header.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_recommendations_for_selected_mouse() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "gear_ids": [1] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(body["count"], recommendations.len());
    assert_eq!(recommendations[0]["gear_id"], 10);
    assert_eq!(recommendations[0]["type"], "Keyboard");
    // 3 of 3 bundles with mouse 1 contain keyboard 10
    assert_eq!(recommendations[0]["confidence"], 100.0);
    assert!(recommendations.iter().all(|r| r["gear_id"] != 1));
}

#[tokio::test]
async fn test_recommendations_respect_exclusions_and_limit() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "gear_ids": [1], "exclude_types": ["Keyboard"], "top_n": 1 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(recommendations.len() <= 1);
    assert!(recommendations.iter().all(|r| r["type"] != "Keyboard"));
}

#[tokio::test]
async fn test_recommendations_require_gear_ids() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "gear_ids": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No gear IDs provided");
}

#[tokio::test]
async fn test_malformed_recommendation_body() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "gear_ids": "one" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_requires_token() {
    let server = create_test_server();

    let response = server.post("/api/v1/rules/refresh").await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = server
        .post("/api/v1/rules/refresh")
        .add_header(
            HeaderName::from_static("x-admin-token"),
            HeaderValue::from_static("wrong"),
        )
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_refresh_disabled_without_configured_token() {
    let server = create_test_server_with(Config::default());

    let response = server
        .post("/api/v1/rules/refresh")
        .add_header(
            HeaderName::from_static("x-admin-token"),
            HeaderValue::from_static(ADMIN_TOKEN),
        )
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_refresh_with_bearer_token() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/rules/refresh")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer test-admin-token"),
        )
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["transaction_count"], 5);
    assert!(body["rule_count"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_refresh_with_insufficient_data() {
    let store = Arc::new(MemoryStore::default());
    let config = Config {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..Config::default()
    };
    let state = AppState::new(store.clone(), store, Cache::in_memory(), &config);
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server
        .post("/api/v1/rules/refresh")
        .add_header(
            HeaderName::from_static("x-admin-token"),
            HeaderValue::from_static(ADMIN_TOKEN),
        )
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to refresh rules - insufficient data");
}

#[tokio::test]
async fn test_variant_setups() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/setups/variants")
        .json(&json!({ "genre": "FPS", "hand_size": "Large", "grip": "Claw" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let variants = body["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 3);
    assert_eq!(variants[0]["name"], "Performance");
    assert_eq!(variants[1]["badge"], "Value Pick");
    assert_eq!(variants[2]["name"], "Pro");

    // Mouse 2 has the most pro usage links
    assert_eq!(variants[2]["picks"]["Mouse"]["gear"]["id"], 2);
    for variant in variants {
        let score = variant["score"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score));
    }
}

#[tokio::test]
async fn test_variant_setups_accept_null_preferences() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/setups/variants")
        .json(&json!({ "genre": null, "hand_size": null, "grip": "Claw" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["variants"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_rank_category() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/setups/categories/keyboard")
        .json(&json!({ "genre": "MOBA" }))
        .await;

    response.assert_status_ok();
    let ranked: Vec<Value> = response.json();
    assert_eq!(ranked.len(), 2);
    // moba-tkl outweighs the sentiment gap
    assert_eq!(ranked[0]["gear"]["id"], 11);
    assert!(ranked[0]["reasons"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "TKL: Perfect size for MOBA"));
}

#[tokio::test]
async fn test_rank_unknown_category() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/setups/categories/speakers")
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
