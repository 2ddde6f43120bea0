//! Route table for the remote service.
//!
//! Deployed servers do not agree on where the write routes live, so the
//! listing and post-now operations carry several candidate paths in priority
//! order. The tip and queue routes are fixed.

use std::fmt;

use crate::http::HttpMethod;

const SUBMIT_LISTING_PATHS: &[&str] = &[
    "/api/post-listing",
    "/api/facebook/post-listing",
    "/facebook/post-listing",
];

const POST_NOW_PATHS: &[&str] = &[
    "/api/post-now",
    "/api/facebook/post-now",
    "/facebook/post-now",
];

const GENERATE_TIP_PATHS: &[&str] = &["/api/tip-post"];

const FETCH_QUEUE_PATHS: &[&str] = &["/api/queue"];

/// A logical operation against the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SubmitListing,
    PostNow,
    GenerateTip,
    FetchQueue,
}

impl Operation {
    pub fn method(self) -> HttpMethod {
        match self {
            Operation::FetchQueue => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    /// Relative paths to try, highest priority first. Never empty.
    pub fn candidate_paths(self) -> &'static [&'static str] {
        match self {
            Operation::SubmitListing => SUBMIT_LISTING_PATHS,
            Operation::PostNow => POST_NOW_PATHS,
            Operation::GenerateTip => GENERATE_TIP_PATHS,
            Operation::FetchQueue => FETCH_QUEUE_PATHS,
        }
    }

    /// Whether a 404 is reported as `EndpointNotFound`. The queue route is
    /// fixed on every deployment, so a 404 there is a server fault.
    pub fn reports_missing_endpoint(self) -> bool {
        !matches!(self, Operation::FetchQueue)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::SubmitListing => "submit_listing",
            Operation::PostNow => "post_now",
            Operation::GenerateTip => "generate_tip",
            Operation::FetchQueue => "fetch_queue",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_operations_fall_back_through_three_layouts() {
        assert_eq!(
            Operation::SubmitListing.candidate_paths(),
            &["/api/post-listing", "/api/facebook/post-listing", "/facebook/post-listing"]
        );
        assert_eq!(Operation::PostNow.candidate_paths().len(), 3);
    }

    #[test]
    fn fixed_routes_have_one_candidate() {
        assert_eq!(Operation::GenerateTip.candidate_paths(), &["/api/tip-post"]);
        assert_eq!(Operation::FetchQueue.candidate_paths(), &["/api/queue"]);
    }

    #[test]
    fn queue_fetch_never_reports_missing_endpoint() {
        assert!(!Operation::FetchQueue.reports_missing_endpoint());
        assert!(Operation::GenerateTip.reports_missing_endpoint());
    }

    #[test]
    fn only_queue_fetch_is_a_get() {
        assert_eq!(Operation::FetchQueue.method(), HttpMethod::Get);
        for op in [Operation::SubmitListing, Operation::PostNow, Operation::GenerateTip] {
            assert_eq!(op.method(), HttpMethod::Post, "{op}");
        }
    }
}
