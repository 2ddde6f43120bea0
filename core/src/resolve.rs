//! Candidate-path resolution as a sans-IO state machine.
//!
//! # Design
//! A `Resolver` owns the absolute URLs of every candidate for one operation
//! plus the request body. The driver loop is:
//!
//! ```text
//! while let Some(req) = resolver.next_request() {
//!     match transport(req) {
//!         Ok(resp) => if let Some(outcome) = resolver.on_response(resp) { return outcome },
//!         Err(e)   => return Err(resolver.on_transport_error(e)),
//!     }
//! }
//! ```
//!
//! A 404 moves `Trying(i)` to `Trying(i + 1)`, or to `FailedExhausted` after
//! the last candidate. Any other failure moves to `FailedDefinitive`. Once a
//! terminal state is reached `next_request` returns `None` and later
//! responses are ignored.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::endpoint::Operation;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Where a resolver is in its walk over the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// Waiting for the response to candidate `i`.
    Trying(usize),
    Succeeded,
    FailedDefinitive,
    FailedExhausted,
}

impl ResolutionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ResolutionState::Trying(_))
    }
}

/// Walks an operation's candidate URLs and decodes the first success as `T`.
#[derive(Debug)]
pub struct Resolver<T> {
    operation: Operation,
    urls: Vec<String>,
    body: Option<String>,
    state: ResolutionState,
    /// Error the resolver finished with, kept for late callers.
    failure: Option<ApiError>,
    _output: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Resolver<T> {
    /// `urls` must be non-empty and already validated.
    pub(crate) fn new(operation: Operation, urls: Vec<String>, body: Option<String>) -> Self {
        debug_assert!(!urls.is_empty());
        Self {
            operation,
            urls,
            body,
            state: ResolutionState::Trying(0),
            failure: None,
            _output: PhantomData,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// All candidate URLs in the order they are tried.
    pub fn candidates(&self) -> &[String] {
        &self.urls
    }

    /// The request for the current candidate, or `None` once finished.
    pub fn next_request(&self) -> Option<HttpRequest> {
        match self.state {
            ResolutionState::Trying(i) => Some(HttpRequest::json(
                self.operation.method(),
                self.urls[i].clone(),
                self.body.clone(),
            )),
            _ => None,
        }
    }

    /// Feed the response to the request last returned by `next_request`.
    ///
    /// Returns `None` when the caller should fetch and send the next request,
    /// or the final outcome of the operation. Once finished the response is
    /// dropped: a failed resolver repeats its error and a succeeded one
    /// returns `None`, since its value was already handed out.
    pub fn on_response(&mut self, response: HttpResponse) -> Option<Result<T, ApiError>> {
        let ResolutionState::Trying(i) = self.state else {
            debug!(operation = %self.operation, state = ?self.state, "response after resolver finished");
            return self.failure.clone().map(Err);
        };
        let url = &self.urls[i];

        let classified = match classify(url, &response) {
            Err(ApiError::EndpointNotFound { .. }) if !self.operation.reports_missing_endpoint() => {
                Err(server_error(&response))
            }
            other => other,
        };

        match classified {
            Ok(()) => match serde_json::from_str::<T>(&response.body) {
                Ok(value) => {
                    self.state = ResolutionState::Succeeded;
                    Some(Ok(value))
                }
                Err(e) => {
                    warn!(operation = %self.operation, %url, error = %e, "response did not decode");
                    let err = ApiError::DecodingError(e.to_string());
                    Some(Err(self.fail(ResolutionState::FailedDefinitive, err)))
                }
            },
            Err(err) if !err.is_definitive() => {
                if i + 1 < self.urls.len() {
                    debug!(operation = %self.operation, %url, "endpoint not found, trying next candidate");
                    self.state = ResolutionState::Trying(i + 1);
                    None
                } else {
                    warn!(operation = %self.operation, attempts = self.urls.len(), "no candidate endpoint found");
                    Some(Err(self.fail(ResolutionState::FailedExhausted, err)))
                }
            }
            Err(err) => {
                warn!(operation = %self.operation, %url, error = %err, "request failed");
                Some(Err(self.fail(ResolutionState::FailedDefinitive, err)))
            }
        }
    }

    /// Record that the transport produced no response at all.
    ///
    /// A finished resolver keeps its state and returns its recorded error if
    /// it has one.
    pub fn on_transport_error(&mut self, detail: impl Into<String>) -> ApiError {
        let detail = detail.into();
        if self.state.is_terminal() {
            return self
                .failure
                .clone()
                .unwrap_or(ApiError::NetworkUnavailable(detail));
        }
        warn!(operation = %self.operation, error = %detail, "transport failure");
        self.fail(ResolutionState::FailedDefinitive, ApiError::NetworkUnavailable(detail))
    }

    fn fail(&mut self, state: ResolutionState, err: ApiError) -> ApiError {
        self.state = state;
        self.failure = Some(err.clone());
        err
    }

    /// Error describing the last candidate as not found.
    pub fn exhausted_error(&self) -> ApiError {
        let url = self.urls.last().cloned().unwrap_or_default();
        ApiError::EndpointNotFound { url }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Map a status code to `Ok` (2xx) or the matching `ApiError`.
pub fn classify(url: &str, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::EndpointNotFound {
            url: url.to_string(),
        });
    }
    Err(server_error(response))
}

fn server_error(response: &HttpResponse) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| format!("HTTP {}", response.status));
    ApiError::ServerError {
        status: response.status,
        message,
    }
}
