//! Stateless request planner for the poster API.
//!
//! # Design
//! `PosterClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation yields a [`Resolver`] that hands out one request per
//! candidate path and decodes the final response. The caller executes the
//! HTTP round-trips, so this layer stays deterministic and free of I/O.

use serde::Serialize;
use url::Url;

use crate::endpoint::Operation;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::resolve::Resolver;
use crate::types::{ListingRequest, OperationResult, PostRequest, QueueSnapshot, TipRequest};

/// Synchronous, stateless client for the poster API.
#[derive(Debug, Clone)]
pub struct PosterClient {
    base_url: String,
}

impl PosterClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn submit_listing(
        &self,
        input: &ListingRequest,
    ) -> Result<Resolver<OperationResult>, ApiError> {
        self.resolver(Operation::SubmitListing, Some(input))
    }

    pub fn post_now(&self, input: &PostRequest) -> Result<Resolver<OperationResult>, ApiError> {
        self.resolver(Operation::PostNow, Some(input))
    }

    pub fn generate_tip(&self, input: &TipRequest) -> Result<Resolver<OperationResult>, ApiError> {
        self.resolver(Operation::GenerateTip, Some(input))
    }

    pub fn fetch_queue(&self) -> Result<Resolver<QueueSnapshot>, ApiError> {
        self.resolver::<QueueSnapshot, ()>(Operation::FetchQueue, None)
    }

    /// A plain GET against the base URL.
    pub fn build_connectivity_check(&self) -> Result<HttpRequest, ApiError> {
        let url = validate_url(&self.base_url)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        })
    }

    /// Any response below 500 means the server is reachable.
    pub fn parse_connectivity(&self, response: &HttpResponse) -> bool {
        response.status < 500
    }

    fn resolver<T, B>(&self, operation: Operation, body: Option<&B>) -> Result<Resolver<T>, ApiError>
    where
        T: serde::de::DeserializeOwned,
        B: Serialize,
    {
        let urls = operation
            .candidate_paths()
            .iter()
            .map(|path| self.url_for(path))
            .collect::<Result<Vec<_>, _>>()?;
        let body = body.map(serde_json::to_string).transpose()?;
        Ok(Resolver::new(operation, urls, body))
    }

    fn url_for(&self, path: &str) -> Result<String, ApiError> {
        validate_url(&format!("{}{path}", self.base_url))
    }
}

/// Accept only absolute http(s) URLs with a host.
///
/// Paths are appended to the base as text, so a base carrying a query or
/// fragment would swallow them.
fn validate_url(raw: &str) -> Result<String, ApiError> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return Err(ApiError::InvalidUrl(format!("{raw}: not an http(s) URL")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ApiError::InvalidUrl(format!("{raw}: query or fragment not allowed")));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolutionState;
    use crate::types::PropertyType;

    fn client() -> PosterClient {
        PosterClient::new("http://localhost:3000")
    }

    fn listing() -> ListingRequest {
        ListingRequest {
            address: "12 Elm St".to_string(),
            price: "$450,000".to_string(),
            bedrooms: 3,
            bathrooms: 2,
            sqft: Some(1800),
            features: vec!["Garage".to_string()],
            property_type: PropertyType::Condo,
            neighborhood: Some("Downtown".to_string()),
            city: "Austin".to_string(),
            image_url: None,
        }
    }

    #[test]
    fn submit_listing_produces_post_with_json_body() {
        let resolver = client().submit_listing(&listing()).unwrap();
        let req = resolver.next_request().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/api/post-listing");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept-encoding"), Some("gzip"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["address"], "12 Elm St");
        assert_eq!(body["type"], "Condo");
        assert_eq!(body["sqft"], 1800);
        assert_eq!(body["neighborhood"], "Downtown");
    }

    #[test]
    fn submit_listing_candidates_are_absolute() {
        let resolver = client().submit_listing(&listing()).unwrap();
        assert_eq!(
            resolver.candidates(),
            &[
                "http://localhost:3000/api/post-listing".to_string(),
                "http://localhost:3000/api/facebook/post-listing".to_string(),
                "http://localhost:3000/facebook/post-listing".to_string(),
            ]
        );
    }

    #[test]
    fn post_now_forwards_image_url() {
        let input = PostRequest {
            content: "Open house Sunday".to_string(),
            image_url: Some("https://img/2.jpg".to_string()),
        };
        let req = client().post_now(&input).unwrap().next_request().unwrap();
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["content"], "Open house Sunday");
        assert_eq!(body["imageUrl"], "https://img/2.jpg");
    }

    #[test]
    fn generate_tip_uses_single_route() {
        let input = TipRequest {
            topic: "staging".to_string(),
        };
        let resolver = client().generate_tip(&input).unwrap();
        assert_eq!(resolver.candidates().len(), 1);
        let req = resolver.next_request().unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/tip-post");
        assert_eq!(req.body.as_deref(), Some(r#"{"topic":"staging"}"#));
    }

    #[test]
    fn fetch_queue_is_get_without_body() {
        let resolver = client().fetch_queue().unwrap();
        let req = resolver.next_request().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/queue");
        assert!(req.body.is_none());
    }

    #[test]
    fn fetch_queue_decodes_snapshot() {
        let mut resolver = client().fetch_queue().unwrap();
        let body = r#"{"queue":[{"id":"1","type":"tip","content":"x","priority":1,"status":"pending","createdAt":"2024-01-01T00:00:00.000Z"}],"dailyPostCount":2,"remainingPostsToday":3}"#;
        let snapshot = resolver
            .on_response(HttpResponse::new(200, body))
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.daily_post_count, 2);
        assert_eq!(snapshot.remaining_posts_today, 3);
        assert_eq!(resolver.state(), ResolutionState::Succeeded);
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = PosterClient::new("http://localhost:3000/");
        let req = client.fetch_queue().unwrap().next_request().unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/queue");
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let client = PosterClient::new("https://example.com/v1");
        let req = client.fetch_queue().unwrap().next_request().unwrap();
        assert_eq!(req.url, "https://example.com/v1/api/queue");
    }

    #[test]
    fn malformed_base_is_invalid_url() {
        for base in ["not a url", "localhost:3000", "ftp://files.example.com", ""] {
            let err = PosterClient::new(base).fetch_queue().unwrap_err();
            assert!(matches!(err, ApiError::InvalidUrl(_)), "{base}: {err:?}");
        }
    }

    #[test]
    fn base_with_query_or_fragment_is_invalid_url() {
        for base in ["http://h/?k=v", "http://h?k=v", "http://h/#top", "http://h/?"] {
            let client = PosterClient::new(base);
            let err = client.post_now(&PostRequest {
                content: "hi".to_string(),
                image_url: None,
            });
            assert!(matches!(err, Err(ApiError::InvalidUrl(_))), "{base}");
            assert!(client.build_connectivity_check().is_err(), "{base}");
        }
    }

    #[test]
    fn connectivity_check_targets_base() {
        let req = client().build_connectivity_check().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/");
        assert!(client().parse_connectivity(&HttpResponse::new(404, "")));
        assert!(!client().parse_connectivity(&HttpResponse::new(503, "")));
    }
}
