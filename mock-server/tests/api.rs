use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, RouteLayout, ServerConfig};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

const LISTING: &str = r#"{
    "address": "12 Elm St",
    "price": "$450,000",
    "bedrooms": 3,
    "bathrooms": 2,
    "features": ["Pool"],
    "type": "Condo",
    "city": "Austin"
}"#;

// --- health ---

#[tokio::test]
async fn health_route_answers() {
    let resp = app().oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- queue ---

#[tokio::test]
async fn queue_starts_empty() {
    let resp = app().oneshot(get("/api/queue")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["queue"], serde_json::json!([]));
    assert_eq!(body["dailyPostCount"], 0);
    assert_eq!(body["remainingPostsToday"], 5);
}

// --- post-listing ---

#[tokio::test]
async fn post_listing_echoes_summary() {
    let resp = app()
        .oneshot(json_request("/api/post-listing", LISTING))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["listing"]["address"], "12 Elm St");
    assert_eq!(body["listing"]["type"], "Condo");
    assert_eq!(body["facebook"]["success"], true);
    assert!(body["generatedContent"].as_str().unwrap().contains("Austin"));
}

#[tokio::test]
async fn post_listing_requires_city() {
    let resp = app()
        .oneshot(json_request(
            "/api/post-listing",
            r#"{"address":"1 A St","price":"$1","bedrooms":1,"bathrooms":1,"type":"House","city":""}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "address, price and city are required");
}

#[tokio::test]
async fn post_listing_malformed_json_is_rejected() {
    let resp = app()
        .oneshot(json_request("/api/post-listing", r#"{"address":1}"#))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
    assert_ne!(resp.status(), StatusCode::NOT_FOUND);
}

// --- layouts ---

#[tokio::test]
async fn layout_controls_which_prefix_exists() {
    let config = ServerConfig {
        layout: RouteLayout::Facebook,
        ..ServerConfig::default()
    };

    let resp = app_with(config)
        .oneshot(json_request("/api/post-now", r#"{"content":"hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app_with(config)
        .oneshot(json_request("/api/facebook/post-now", r#"{"content":"hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app_with(config)
        .oneshot(json_request("/facebook/post-now", r#"{"content":"hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn fixed_routes_ignore_layout() {
    let config = ServerConfig {
        layout: RouteLayout::ApiFacebook,
        ..ServerConfig::default()
    };
    let resp = app_with(config)
        .oneshot(json_request("/api/tip-post", r#"{"topic":"staging"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- tip-post ---

#[tokio::test]
async fn tip_post_requires_topic() {
    let resp = app()
        .oneshot(json_request("/api/tip-post", r#"{"topic":"   "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "topic is required");
}

// --- full posting day ---

#[tokio::test]
async fn posting_day_lifecycle() {
    use tower::Service;

    let config = ServerConfig {
        layout: RouteLayout::Api,
        daily_post_limit: 2,
    };
    let mut app = app_with(config).into_service();

    // tip is queued, not posted
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("/api/tip-post", r#"{"topic":"curb appeal"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let tip = body_json(resp).await;
    assert!(tip["generatedContent"].as_str().unwrap().contains("curb appeal"));

    // two posts use up the limit
    for _ in 0..2 {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("/api/post-now", r#"{"content":"Open house"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // third post is refused
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("/api/post-now", r#"{"content":"One more"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(resp).await["error"], "daily post limit reached");

    // listing is accepted but left pending
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("/api/post-listing", LISTING))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listing = body_json(resp).await;
    assert_eq!(listing["facebook"]["success"], false);

    // queue reflects everything
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/queue"))
        .await
        .unwrap();
    let queue = body_json(resp).await;
    assert_eq!(queue["dailyPostCount"], 2);
    assert_eq!(queue["remainingPostsToday"], 0);
    let entries = queue["queue"].as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["type"], "tip");
    assert_eq!(entries[0]["status"], "pending");
    assert_eq!(entries[1]["status"], "posted");
    assert_eq!(entries[3]["type"], "listing");
    assert_eq!(entries[3]["status"], "pending");
}
