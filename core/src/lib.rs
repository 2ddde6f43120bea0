//! API client core for the listing poster service.
//!
//! # Overview
//! Submits real-estate listings and ad-hoc posts to a remote
//! content-generation service and reads back its posting queue. Deployed
//! servers expose the write routes under different prefixes, so each write
//! walks an ordered list of candidate paths until one answers.
//!
//! # Design
//! - `PosterClient` is stateless and holds only `base_url`. It never touches
//!   the network; it hands out `Resolver` state machines (host-does-IO).
//! - `Resolver` yields one `HttpRequest` per candidate and consumes the
//!   matching `HttpResponse`. A 404 moves to the next candidate; anything
//!   else ends the call.
//! - With the `executor` feature (default), `NetworkClient` drives resolvers
//!   over reqwest and publishes advisory `Activity` on a watch channel.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod endpoint;
pub mod error;
#[cfg(feature = "executor")]
pub mod executor;
pub mod http;
pub mod resolve;
pub mod types;

pub use client::PosterClient;
pub use endpoint::Operation;
pub use error::ApiError;
#[cfg(feature = "executor")]
pub use executor::{Activity, ClientConfig, NetworkClient};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use resolve::{ResolutionState, Resolver};
pub use types::{
    ListingRequest, ListingSummary, OperationResult, PostRequest, PostingResult, PropertyType,
    QueueEntry, QueueSnapshot, QueueStatus, TipRequest,
};
