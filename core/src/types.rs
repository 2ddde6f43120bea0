//! Domain DTOs for the poster API.
//!
//! # Design
//! These types mirror the remote service's JSON but are defined
//! independently from the mock-server crate; integration tests catch schema
//! drift. Optional request fields are omitted from the JSON when absent, and
//! every response field except `success` tolerates being missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of property being listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    House,
    Condo,
    Townhouse,
    Apartment,
    #[serde(rename = "Multi-Family")]
    MultiFamily,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::House,
        PropertyType::Condo,
        PropertyType::Townhouse,
        PropertyType::Apartment,
        PropertyType::MultiFamily,
    ];

    /// Wire name of the property type.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Condo => "Condo",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::Apartment => "Apartment",
            PropertyType::MultiFamily => "Multi-Family",
        }
    }
}

/// Listing data submitted for content generation and posting.
///
/// Callers must make sure `address`, `price` and `city` are non-empty before
/// submitting; see [`ListingRequest::is_submittable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub address: String,
    pub price: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqft: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ListingRequest {
    pub fn is_submittable(&self) -> bool {
        [&self.address, &self.price, &self.city]
            .iter()
            .all(|field| !field.trim().is_empty())
            && self.bedrooms >= 1
            && self.bathrooms >= 1
    }
}

/// Payload for posting ad-hoc content immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Payload for generating a tip post about a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipRequest {
    pub topic: String,
}

/// Posting state of a queue entry. Values the client does not know decode
/// to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Posted,
    #[serde(other)]
    Other,
}

/// One item in the server-side posting queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub priority: i64,
    pub status: QueueStatus,
    /// ISO-8601 creation time, kept exactly as the server sent it.
    pub created_at: String,
}

impl QueueEntry {
    /// Parse `created_at` as an RFC 3339 timestamp.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// The queue plus today's posting counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    #[serde(rename = "queue")]
    pub entries: Vec<QueueEntry>,
    pub daily_post_count: i64,
    pub remaining_posts_today: i64,
}

impl QueueSnapshot {
    pub fn pending(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == QueueStatus::Pending)
    }
}

/// Echo of the listing the server accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, rename = "type")]
    pub property_type: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
}

/// Outcome of the server's downstream post to the social network
/// (`facebook` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingResult {
    pub success: bool,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Uniform envelope returned by every write operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub queue_id: Option<String>,
    #[serde(default)]
    pub generated_content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub listing: Option<ListingSummary>,
    #[serde(default, rename = "facebook")]
    pub posting: Option<PostingResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> ListingRequest {
        ListingRequest {
            address: "12 Elm St".to_string(),
            price: "$450,000".to_string(),
            bedrooms: 3,
            bathrooms: 2,
            sqft: None,
            features: vec!["Garage".to_string(), "Pool".to_string()],
            property_type: PropertyType::MultiFamily,
            neighborhood: None,
            city: "Austin".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn listing_omits_absent_optionals() {
        let json = serde_json::to_value(listing()).unwrap();
        assert_eq!(json["type"], "Multi-Family");
        assert_eq!(json["features"], serde_json::json!(["Garage", "Pool"]));
        assert!(json.get("sqft").is_none());
        assert!(json.get("neighborhood").is_none());
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn listing_uses_camel_case_image_url() {
        let mut input = listing();
        input.image_url = Some("https://img/1.jpg".to_string());
        input.sqft = Some(1800);
        let json = serde_json::to_value(input).unwrap();
        assert_eq!(json["imageUrl"], "https://img/1.jpg");
        assert_eq!(json["sqft"], 1800);
    }

    #[test]
    fn submittable_requires_address_price_city() {
        assert!(listing().is_submittable());
        let mut input = listing();
        input.city = "  ".to_string();
        assert!(!input.is_submittable());
        let mut input = listing();
        input.bedrooms = 0;
        assert!(!input.is_submittable());
    }

    #[test]
    fn property_type_wire_names_match_as_str() {
        for ty in PropertyType::ALL {
            let json = serde_json::to_value(ty).unwrap();
            assert_eq!(json, ty.as_str());
        }
    }

    #[test]
    fn unknown_queue_status_decodes_to_other() {
        let status: QueueStatus = serde_json::from_str(r#""failed""#).unwrap();
        assert_eq!(status, QueueStatus::Other);
        let status: QueueStatus = serde_json::from_str(r#""posted""#).unwrap();
        assert_eq!(status, QueueStatus::Posted);
    }

    #[test]
    fn queue_entry_timestamp_parses() {
        let entry: QueueEntry = serde_json::from_str(
            r#"{"id":"1","type":"tip","content":"x","priority":1,"status":"pending","createdAt":"2024-01-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        let ts = entry.created_at_utc().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn snapshot_pending_skips_posted_entries() {
        let snapshot: QueueSnapshot = serde_json::from_str(
            r#"{
                "queue": [
                    {"id":"a","type":"tip","content":"x","priority":2,"status":"pending","createdAt":"2024-01-01T00:00:00Z"},
                    {"id":"b","type":"text","content":"y","priority":1,"status":"posted","createdAt":"2024-01-01T00:00:01Z"}
                ],
                "dailyPostCount": 1,
                "remainingPostsToday": 4
            }"#,
        )
        .unwrap();
        let pending: Vec<_> = snapshot.pending().map(|e| e.id.as_str()).collect();
        assert_eq!(pending, ["a"]);
        assert_eq!(snapshot.remaining_posts_today, 4);
    }

    #[test]
    fn operation_result_requires_success() {
        let result: Result<OperationResult, _> = serde_json::from_str(r#"{"message":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn operation_result_decodes_nested_records() {
        let result: OperationResult = serde_json::from_str(
            r#"{
                "success": true,
                "queueId": "q1",
                "listing": {"address": "12 Elm St", "bedrooms": 3},
                "facebook": {"success": false, "error": "token expired"}
            }"#,
        )
        .unwrap();
        assert_eq!(result.queue_id.as_deref(), Some("q1"));
        let listing = result.listing.unwrap();
        assert_eq!(listing.bedrooms, Some(3));
        assert!(listing.city.is_none());
        let posting = result.posting.unwrap();
        assert!(!posting.success);
        assert_eq!(posting.error.as_deref(), Some("token expired"));
    }
}
