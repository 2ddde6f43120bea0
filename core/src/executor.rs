//! Async execution of poster operations over reqwest.
//!
//! [`NetworkClient`] drives the sans-IO [`Resolver`] with a pooled
//! `reqwest::Client`. Dropping a returned future abandons the in-flight
//! request and clears `Activity::in_flight`; `last_error` keeps its value.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::client::PosterClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ACCEPT_GZIP};
use crate::resolve::Resolver;
use crate::types::{ListingRequest, OperationResult, PostRequest, QueueSnapshot, TipRequest};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RESOURCE_TIMEOUT_SECS: u64 = 60;

/// Connection settings for a [`NetworkClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Limit for connecting and for each read; an idle request fails after it.
    pub request_timeout: Duration,
    /// Limit for the whole exchange, body included.
    pub resource_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            resource_timeout: Duration::from_secs(DEFAULT_RESOURCE_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read `POSTER_API_URL`, `POSTER_REQUEST_TIMEOUT_SECS` and
    /// `POSTER_RESOURCE_TIMEOUT_SECS`, keeping defaults for anything unset
    /// or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |key: &str| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
        };
        Self {
            base_url: std::env::var("POSTER_API_URL").unwrap_or(defaults.base_url),
            request_timeout: secs("POSTER_REQUEST_TIMEOUT_SECS").unwrap_or(defaults.request_timeout),
            resource_timeout: secs("POSTER_RESOURCE_TIMEOUT_SECS")
                .unwrap_or(defaults.resource_timeout),
        }
    }
}

/// Advisory status for UI binding.
///
/// Concurrent calls share one value and the last one to finish wins, so this
/// is a hint, not control state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    pub in_flight: bool,
    pub last_error: Option<String>,
}

/// Async client for the poster API.
#[derive(Debug)]
pub struct NetworkClient {
    http: reqwest::Client,
    planner: PosterClient,
    activity: watch::Sender<Activity>,
}

impl NetworkClient {
    /// ## Errors
    ///
    /// Returns `NetworkUnavailable` if the TLS backend cannot be initialised.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .read_timeout(config.request_timeout)
            .timeout(config.resource_timeout)
            .build()
            .map_err(|e| ApiError::NetworkUnavailable(e.to_string()))?;
        let (activity, _) = watch::channel(Activity::default());
        Ok(Self {
            http,
            planner: PosterClient::new(&config.base_url),
            activity,
        })
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        self.planner.base_url()
    }

    /// Observe the advisory in-flight / last-error state.
    pub fn subscribe(&self) -> watch::Receiver<Activity> {
        self.activity.subscribe()
    }

    pub fn activity(&self) -> Activity {
        self.activity.borrow().clone()
    }

    pub async fn submit_listing(&self, input: &ListingRequest) -> Result<OperationResult, ApiError> {
        self.tracked(self.planner.submit_listing(input)).await
    }

    pub async fn post_now(
        &self,
        content: &str,
        image_url: Option<&str>,
    ) -> Result<OperationResult, ApiError> {
        let input = PostRequest {
            content: content.to_string(),
            image_url: image_url.map(str::to_string),
        };
        self.tracked(self.planner.post_now(&input)).await
    }

    pub async fn generate_tip(&self, topic: &str) -> Result<OperationResult, ApiError> {
        let input = TipRequest {
            topic: topic.to_string(),
        };
        self.tracked(self.planner.generate_tip(&input)).await
    }

    pub async fn fetch_queue(&self) -> Result<QueueSnapshot, ApiError> {
        self.tracked(self.planner.fetch_queue()).await
    }

    /// Best-effort reachability probe; never fails.
    pub async fn test_connectivity(&self) -> bool {
        let Ok(request) = self.planner.build_connectivity_check() else {
            return false;
        };
        match self.send(request).await {
            Ok(response) => self.planner.parse_connectivity(&response),
            Err(e) => {
                debug!(error = %describe(&e), "connectivity check failed");
                false
            }
        }
    }

    async fn tracked<T>(&self, resolver: Result<Resolver<T>, ApiError>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let _in_flight = InFlight::begin(&self.activity);
        let outcome = match resolver {
            Ok(resolver) => self.drive(resolver).await,
            Err(e) => Err(e),
        };
        self.activity
            .send_modify(|a| a.last_error = outcome.as_ref().err().map(ToString::to_string));
        outcome
    }

    #[instrument(
        name = "poster_operation",
        skip(self, resolver),
        fields(operation = %resolver.operation(), candidates = resolver.candidates().len())
    )]
    async fn drive<T>(&self, mut resolver: Resolver<T>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        while let Some(request) = resolver.next_request() {
            let response = match self.send(request).await {
                Ok(response) => response,
                Err(e) => return Err(resolver.on_transport_error(describe(&e))),
            };
            if let Some(outcome) = resolver.on_response(response) {
                return outcome;
            }
        }
        Err(resolver.exhausted_error())
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };
        debug!(%method, url = %request.url, "sending request");

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            // reqwest negotiates gzip itself and only decompresses when it
            // set the header.
            if name.eq_ignore_ascii_case(ACCEPT_GZIP.0) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().await?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Marks a call in flight until dropped, so an abandoned future still
/// clears the flag.
struct InFlight<'a>(&'a watch::Sender<Activity>);

impl<'a> InFlight<'a> {
    fn begin(activity: &'a watch::Sender<Activity>) -> Self {
        activity.send_modify(|a| a.in_flight = true);
        Self(activity)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|a| a.in_flight = false);
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        err.to_string()
    }
}
