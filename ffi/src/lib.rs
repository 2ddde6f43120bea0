//! C-ABI wrapper around `poster-core`.
//!
//! # Overview
//! Lets a mobile host with its own HTTP stack run every poster operation
//! through `extern "C"` functions, without linking an async runtime. The
//! host loop is:
//!
//! ```c
//! FfiResolver *r = poster_begin_fetch_queue(client, &err);
//! FfiApiResult *result = NULL;
//! while (result == NULL) {
//!     FfiHttpRequest *req = poster_resolver_next_request(r);
//!     /* perform req; on transport failure call poster_resolver_on_transport_error */
//!     result = poster_resolver_on_response(r, &resp);
//!     poster_free_request(req);
//! }
//! ```
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `poster_begin_*` mirrors the core `PosterClient` operations 1:1 and
//!   returns an opaque `FfiResolver`; construction errors go to `error_out`.
//! - A single `FfiApiResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `poster_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::catch_unwind;

use poster_core::{ApiError, HttpResponse, PostRequest, TipRequest};

use types::*;

/// Store `result` through `error_out` when the caller asked for it,
/// otherwise free it.
fn report(error_out: *mut *mut FfiApiResult, result: *mut FfiApiResult) {
    if error_out.is_null() {
        poster_free_result(result);
    } else {
        unsafe { *error_out = result };
    }
}

fn begin(
    error_out: *mut *mut FfiApiResult,
    resolver: Result<ResolverKind, ApiError>,
) -> *mut FfiResolver {
    match resolver {
        Ok(inner) => Box::into_raw(Box::new(FfiResolver { inner })),
        Err(e) => {
            report(error_out, FfiApiResult::from_error(e));
            std::ptr::null_mut()
        }
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `PosterClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs. The
/// URL itself is validated when an operation begins.
/// The caller must free the returned pointer with `poster_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn poster_client_new(base_url: *const c_char) -> *mut FfiPosterClient {
    catch_unwind(|| {
        let Some(url) = read_c_str(base_url) else {
            return std::ptr::null_mut();
        };
        let client = poster_core::PosterClient::new(&url);
        Box::into_raw(Box::new(FfiPosterClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `PosterClient` created by `poster_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn poster_client_free(client: *mut FfiPosterClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Begin operations
// ---------------------------------------------------------------------------

/// Begin submitting a listing.
///
/// Returns null on failure; if `error_out` is non-null it then receives an
/// `FfiApiResult` describing why (`NullArg`, `InvalidArg`, `InvalidUrl`).
#[unsafe(no_mangle)]
pub extern "C" fn poster_begin_submit_listing(
    client: *const FfiPosterClient,
    listing: *const FfiListingRequest,
    error_out: *mut *mut FfiApiResult,
) -> *mut FfiResolver {
    catch_unwind(|| {
        if client.is_null() {
            report(error_out, FfiApiResult::null_arg("client"));
            return std::ptr::null_mut();
        }
        if listing.is_null() {
            report(error_out, FfiApiResult::null_arg("listing"));
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let input = match unsafe { &*listing }.to_core() {
            Ok(input) => input,
            Err(field) => {
                report(error_out, FfiApiResult::invalid_arg(field));
                return std::ptr::null_mut();
            }
        };
        begin(
            error_out,
            client.inner.submit_listing(&input).map(ResolverKind::Operation),
        )
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Begin posting `content` immediately. `image_url` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn poster_begin_post_now(
    client: *const FfiPosterClient,
    content: *const c_char,
    image_url: *const c_char,
    error_out: *mut *mut FfiApiResult,
) -> *mut FfiResolver {
    catch_unwind(|| {
        if client.is_null() {
            report(error_out, FfiApiResult::null_arg("client"));
            return std::ptr::null_mut();
        }
        let Some(content) = read_c_str(content) else {
            report(error_out, FfiApiResult::null_arg("content"));
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let input = PostRequest {
            content,
            image_url: read_c_str(image_url),
        };
        begin(
            error_out,
            client.inner.post_now(&input).map(ResolverKind::Operation),
        )
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Begin generating a tip post about `topic`.
#[unsafe(no_mangle)]
pub extern "C" fn poster_begin_generate_tip(
    client: *const FfiPosterClient,
    topic: *const c_char,
    error_out: *mut *mut FfiApiResult,
) -> *mut FfiResolver {
    catch_unwind(|| {
        if client.is_null() {
            report(error_out, FfiApiResult::null_arg("client"));
            return std::ptr::null_mut();
        }
        let Some(topic) = read_c_str(topic) else {
            report(error_out, FfiApiResult::null_arg("topic"));
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        begin(
            error_out,
            client
                .inner
                .generate_tip(&TipRequest { topic })
                .map(ResolverKind::Operation),
        )
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Begin fetching the posting queue.
#[unsafe(no_mangle)]
pub extern "C" fn poster_begin_fetch_queue(
    client: *const FfiPosterClient,
    error_out: *mut *mut FfiApiResult,
) -> *mut FfiResolver {
    catch_unwind(|| {
        if client.is_null() {
            report(error_out, FfiApiResult::null_arg("client"));
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        begin(error_out, client.inner.fetch_queue().map(ResolverKind::Queue))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Resolver stepping
// ---------------------------------------------------------------------------

/// The request for the current candidate, or null once the resolver has
/// finished (or `resolver` is null).
/// The caller must free the returned pointer with `poster_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn poster_resolver_next_request(resolver: *const FfiResolver) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if resolver.is_null() {
            return std::ptr::null_mut();
        }
        let next = match &unsafe { &*resolver }.inner {
            ResolverKind::Operation(r) => r.next_request(),
            ResolverKind::Queue(r) => r.next_request(),
        };
        next.map(FfiHttpRequest::from_core)
            .unwrap_or(std::ptr::null_mut())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Feed the response to the last request.
///
/// Returns null when the host should call `poster_resolver_next_request`
/// again, otherwise the final result (`data_tag = Operation` or `Queue` on
/// success). Null arguments yield a `NullArg` result, never null. A resolver
/// that already finished yields `InvalidArg`.
#[unsafe(no_mangle)]
pub extern "C" fn poster_resolver_on_response(
    resolver: *mut FfiResolver,
    response: *const FfiHttpResponse,
) -> *mut FfiApiResult {
    catch_unwind(|| {
        if resolver.is_null() {
            return FfiApiResult::null_arg("resolver");
        }
        if response.is_null() {
            return FfiApiResult::null_arg("response");
        }
        let resolver = unsafe { &mut *resolver };
        if resolver.state().is_terminal() {
            return FfiApiResult::invalid_arg("resolver already finished");
        }
        let resp = unsafe { &*response };
        let core_resp = HttpResponse::new(resp.status, read_c_str(resp.body).unwrap_or_default());

        match &mut resolver.inner {
            ResolverKind::Operation(r) => match r.on_response(core_resp) {
                None => std::ptr::null_mut(),
                Some(Ok(result)) => FfiApiResult::ok_operation(result),
                Some(Err(e)) => FfiApiResult::from_error(e),
            },
            ResolverKind::Queue(r) => match r.on_response(core_resp) {
                None => std::ptr::null_mut(),
                Some(Ok(snapshot)) => FfiApiResult::ok_queue(snapshot),
                Some(Err(e)) => FfiApiResult::from_error(e),
            },
        }
    })
    .unwrap_or_else(|_| FfiApiResult::panic("panic in poster_resolver_on_response"))
}

/// Report that the last request produced no HTTP response. Returns a
/// `NetworkUnavailable` result, or `NullArg`/`InvalidArg` when the resolver is
/// null or already finished. `message` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn poster_resolver_on_transport_error(
    resolver: *mut FfiResolver,
    message: *const c_char,
) -> *mut FfiApiResult {
    catch_unwind(|| {
        if resolver.is_null() {
            return FfiApiResult::null_arg("resolver");
        }
        let resolver = unsafe { &mut *resolver };
        if resolver.state().is_terminal() {
            return FfiApiResult::invalid_arg("resolver already finished");
        }
        let detail = read_c_str(message).unwrap_or_else(|| "transport failure".to_string());
        let err = match &mut resolver.inner {
            ResolverKind::Operation(r) => r.on_transport_error(detail),
            ResolverKind::Queue(r) => r.on_transport_error(detail),
        };
        FfiApiResult::from_error(err)
    })
    .unwrap_or_else(|_| FfiApiResult::panic("panic in poster_resolver_on_transport_error"))
}

#[unsafe(no_mangle)]
pub extern "C" fn poster_resolver_state(resolver: *const FfiResolver) -> FfiResolutionState {
    catch_unwind(|| {
        if resolver.is_null() {
            return FfiResolutionState::Invalid;
        }
        unsafe { &*resolver }.state().into()
    })
    .unwrap_or(FfiResolutionState::Invalid)
}

/// Free a resolver from any `poster_begin_*` function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn poster_resolver_free(resolver: *mut FfiResolver) {
    if !resolver.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(resolver) });
        });
    }
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

/// Build a GET against the base URL. Returns null if `client` is null or the
/// base URL is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn poster_build_connectivity_check(
    client: *const FfiPosterClient,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.build_connectivity_check() {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Whether the connectivity response shows a reachable server. Null
/// arguments return false.
#[unsafe(no_mangle)]
pub extern "C" fn poster_parse_connectivity(
    client: *const FfiPosterClient,
    response: *const FfiHttpResponse,
) -> bool {
    catch_unwind(|| {
        if client.is_null() || response.is_null() {
            return false;
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        client
            .inner
            .parse_connectivity(&HttpResponse::new(resp.status, String::new()))
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `poster_resolver_next_request` or
/// `poster_build_connectivity_check`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn poster_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        for h in reclaim_slice(req.headers, req.headers_len) {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    });
}

/// Free an `FfiApiResult` returned by any resolver function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn poster_free_result(result: *mut FfiApiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Operation => {
                let op = unsafe { Box::from_raw(result.data as *mut FfiOperationResult) };
                op.free_fields();
            }
            FfiDataTag::Queue => {
                let snapshot = unsafe { Box::from_raw(result.data as *mut FfiQueueSnapshot) };
                for entry in reclaim_slice(snapshot.entries, snapshot.len) {
                    entry.free_fields();
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn poster_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
