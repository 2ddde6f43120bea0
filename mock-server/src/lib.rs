use std::{str::FromStr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Which prefix the write routes are mounted under. The other two prefixes
/// answer 404, like an older or newer deployment would.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteLayout {
    #[default]
    Api,
    ApiFacebook,
    Facebook,
}

impl RouteLayout {
    pub fn prefix(self) -> &'static str {
        match self {
            RouteLayout::Api => "/api",
            RouteLayout::ApiFacebook => "/api/facebook",
            RouteLayout::Facebook => "/facebook",
        }
    }
}

impl FromStr for RouteLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(RouteLayout::Api),
            "api-facebook" | "api_facebook" => Ok(RouteLayout::ApiFacebook),
            "facebook" => Ok(RouteLayout::Facebook),
            other => Err(format!("unknown route layout: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ServerConfig {
    pub layout: RouteLayout,
    pub daily_post_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            layout: RouteLayout::Api,
            daily_post_limit: 5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub priority: i64,
    pub status: String,
    pub created_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingInput {
    pub address: String,
    pub price: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub sqft: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(rename = "type")]
    pub property_type: String,
    pub neighborhood: Option<String>,
    pub city: String,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostNowInput {
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct TipInput {
    pub topic: String,
}

#[derive(Default)]
pub struct Store {
    pub queue: Vec<QueueItem>,
    pub posted_today: u32,
}

pub struct AppState {
    config: ServerConfig,
    store: RwLock<Store>,
}

pub type Db = Arc<AppState>;

type ApiResponse = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with(ServerConfig::default())
}

pub fn app_with(config: ServerConfig) -> Router {
    let db: Db = Arc::new(AppState {
        config,
        store: RwLock::new(Store::default()),
    });
    let prefix = config.layout.prefix();
    Router::new()
        .route("/", get(health))
        .route(&format!("{prefix}/post-listing"), post(post_listing))
        .route(&format!("{prefix}/post-now"), post(post_now))
        .route("/api/tip-post", post(tip_post))
        .route("/api/queue", get(queue))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, ServerConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn failure(status: StatusCode, error: &str) -> ApiResponse {
    (status, Json(json!({ "success": false, "error": error })))
}

/// Count one post against today's limit. Returns the downstream result.
fn publish(store: &mut Store, limit: u32) -> Value {
    if store.posted_today >= limit {
        return json!({ "success": false, "error": "daily post limit reached" });
    }
    store.posted_today += 1;
    json!({
        "success": true,
        "postId": format!("fb_{}", Uuid::new_v4().simple()),
        "message": "Posted to page",
    })
}

fn listing_copy(input: &ListingInput) -> String {
    let mut copy = format!(
        "Just listed in {}: {} · {} bd / {} ba",
        input.city, input.address, input.bedrooms, input.bathrooms
    );
    if let Some(sqft) = input.sqft {
        copy.push_str(&format!(" · {sqft} sqft"));
    }
    copy.push_str(&format!(" · {} {}", input.property_type, input.price));
    if let Some(hood) = &input.neighborhood {
        copy.push_str(&format!(" in {hood}"));
    }
    if !input.features.is_empty() {
        copy.push_str(&format!(". Features: {}", input.features.join(", ")));
    }
    copy
}

async fn health() -> &'static str {
    "ok"
}

async fn post_listing(State(db): State<Db>, Json(input): Json<ListingInput>) -> ApiResponse {
    if [&input.address, &input.price, &input.city]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return failure(StatusCode::BAD_REQUEST, "address, price and city are required");
    }

    let content = listing_copy(&input);
    let listing_id = Uuid::new_v4().to_string();
    let queue_id = Uuid::new_v4().to_string();

    let mut store = db.store.write().await;
    let facebook = publish(&mut store, db.config.daily_post_limit);
    let posted = facebook["success"] == true;
    store.queue.push(QueueItem {
        id: queue_id.clone(),
        kind: "listing".to_string(),
        content: content.clone(),
        priority: 1,
        status: if posted { "posted" } else { "pending" }.to_string(),
        created_at: now(),
    });
    info!(%queue_id, posted, "listing accepted");

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Listing queued",
            "queueId": queue_id,
            "generatedContent": content,
            "listing": {
                "id": listing_id,
                "address": input.address,
                "price": input.price,
                "city": input.city,
                "type": input.property_type,
                "bedrooms": input.bedrooms,
                "bathrooms": input.bathrooms,
            },
            "facebook": facebook,
        })),
    )
}

async fn post_now(State(db): State<Db>, Json(input): Json<PostNowInput>) -> ApiResponse {
    if input.content.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "content is required");
    }

    let mut store = db.store.write().await;
    let facebook = publish(&mut store, db.config.daily_post_limit);
    if facebook["success"] != true {
        return failure(StatusCode::TOO_MANY_REQUESTS, "daily post limit reached");
    }

    let queue_id = Uuid::new_v4().to_string();
    store.queue.push(QueueItem {
        id: queue_id.clone(),
        kind: if input.image_url.is_some() { "photo" } else { "text" }.to_string(),
        content: input.content,
        priority: 0,
        status: "posted".to_string(),
        created_at: now(),
    });

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Posted",
            "queueId": queue_id,
            "facebook": facebook,
        })),
    )
}

async fn tip_post(State(db): State<Db>, Json(input): Json<TipInput>) -> ApiResponse {
    let topic = input.topic.trim();
    if topic.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "topic is required");
    }

    let content = format!("Tip of the day: {topic}. Ask us how it affects your next move.");
    let queue_id = Uuid::new_v4().to_string();
    db.store.write().await.queue.push(QueueItem {
        id: queue_id.clone(),
        kind: "tip".to_string(),
        content: content.clone(),
        priority: 2,
        status: "pending".to_string(),
        created_at: now(),
    });

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Tip queued",
            "queueId": queue_id,
            "generatedContent": content,
        })),
    )
}

async fn queue(State(db): State<Db>) -> Json<Value> {
    let store = db.store.read().await;
    let remaining = db.config.daily_post_limit.saturating_sub(store.posted_today);
    Json(json!({
        "queue": store.queue,
        "dailyPostCount": store.posted_today,
        "remainingPostsToday": remaining,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(features: Vec<&str>) -> ListingInput {
        ListingInput {
            address: "12 Elm St".to_string(),
            price: "$450,000".to_string(),
            bedrooms: 3,
            bathrooms: 2,
            sqft: Some(1800),
            features: features.into_iter().map(String::from).collect(),
            property_type: "House".to_string(),
            neighborhood: None,
            city: "Austin".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn layout_parses_from_env_strings() {
        assert_eq!("api".parse::<RouteLayout>().unwrap(), RouteLayout::Api);
        assert_eq!("API-Facebook".parse::<RouteLayout>().unwrap(), RouteLayout::ApiFacebook);
        assert_eq!(" facebook ".parse::<RouteLayout>().unwrap(), RouteLayout::Facebook);
        assert!("v2".parse::<RouteLayout>().is_err());
    }

    #[test]
    fn listing_copy_mentions_features_when_present() {
        let copy = listing_copy(&listing(vec!["Pool", "Garage"]));
        assert!(copy.contains("Austin"));
        assert!(copy.contains("1800 sqft"));
        assert!(copy.ends_with("Features: Pool, Garage"));

        let copy = listing_copy(&listing(vec![]));
        assert!(!copy.contains("Features"));
    }

    #[test]
    fn publish_stops_at_limit() {
        let mut store = Store::default();
        assert_eq!(publish(&mut store, 1)["success"], true);
        let second = publish(&mut store, 1);
        assert_eq!(second["success"], false);
        assert_eq!(store.posted_today, 1);
    }

    #[test]
    fn queue_item_serializes_wire_names() {
        let item = QueueItem {
            id: "1".to_string(),
            kind: "tip".to_string(),
            content: "x".to_string(),
            priority: 1,
            status: "pending".to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "tip");
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn timestamps_use_millisecond_utc() {
        let ts = now();
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
    }
}
