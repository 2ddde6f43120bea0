//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! tagged enums with explicit discriminants. Enum-valued *inputs* arrive as
//! plain integers so an out-of-range value from C is an error, not UB.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use poster_core::{
    ApiError, HttpMethod, HttpRequest, ListingRequest, ListingSummary, OperationResult,
    PosterClient, PostingResult, PropertyType, QueueEntry, QueueSnapshot, QueueStatus,
    ResolutionState, Resolver,
};

/// Opaque handle to a `PosterClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiPosterClient {
    pub(crate) inner: PosterClient,
}

/// Opaque handle to an in-progress endpoint resolution.
pub struct FfiResolver {
    pub(crate) inner: ResolverKind,
}

pub(crate) enum ResolverKind {
    Operation(Resolver<OperationResult>),
    Queue(Resolver<QueueSnapshot>),
}

impl FfiResolver {
    pub(crate) fn state(&self) -> ResolutionState {
        match &self.inner {
            ResolverKind::Operation(r) => r.state(),
            ResolverKind::Queue(r) => r.state(),
        }
    }
}

// ---------------------------------------------------------------------------
// String and array helpers
// ---------------------------------------------------------------------------

/// Move a Rust string onto the C heap. Interior NULs are dropped.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

pub(crate) fn opt_c_string(s: Option<String>) -> *mut c_char {
    s.map(into_c_string).unwrap_or(ptr::null_mut())
}

/// Free a string produced by `into_c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Copy a borrowed C string. Returns `None` for null; invalid UTF-8 is
/// replaced lossily.
pub(crate) fn read_c_str(s: *const c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned())
}

/// Hand a vector to C as pointer + length. Empty vectors become null.
pub(crate) fn leak_slice<T>(items: Vec<T>) -> (*mut T, usize) {
    if items.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let len = items.len();
    (Box::into_raw(items.into_boxed_slice()) as *mut T, len)
}

/// Take back a slice produced by `leak_slice`.
pub(crate) fn reclaim_slice<T>(items: *mut T, len: usize) -> Vec<T> {
    if items.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(items, len)) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Handed out by `poster_resolver_next_request`. The C caller executes the
/// request and passes the response back through `poster_resolver_on_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: usize,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: into_c_string(k),
                value: into_c_string(v),
            })
            .collect();
        let (headers, headers_len) = leak_slice(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: into_c_string(req.url),
            headers,
            headers_len,
            body: opt_c_string(req.body),
        }))
    }
}

/// Listing input provided by the C caller. Strings are borrowed for the
/// duration of the call; nullable fields use null for "absent".
#[repr(C)]
pub struct FfiListingRequest {
    pub address: *const c_char,
    pub price: *const c_char,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub has_sqft: bool,
    pub sqft: u32,
    pub features: *const *const c_char,
    pub features_len: usize,
    /// 0 House, 1 Condo, 2 Townhouse, 3 Apartment, 4 Multi-Family.
    pub property_type: u32,
    pub neighborhood: *const c_char,
    pub city: *const c_char,
    pub image_url: *const c_char,
}

impl FfiListingRequest {
    /// Copy into a core `ListingRequest`. Errors name the offending field.
    pub(crate) fn to_core(&self) -> Result<ListingRequest, &'static str> {
        let property_type = PropertyType::ALL
            .get(self.property_type as usize)
            .copied()
            .ok_or("property_type")?;

        let features = if self.features.is_null() || self.features_len == 0 {
            Vec::new()
        } else {
            let raw = unsafe { std::slice::from_raw_parts(self.features, self.features_len) };
            raw.iter()
                .map(|f| read_c_str(*f).ok_or("features"))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(ListingRequest {
            address: read_c_str(self.address).ok_or("address")?,
            price: read_c_str(self.price).ok_or("price")?,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            sqft: self.has_sqft.then_some(self.sqft),
            features,
            property_type,
            neighborhood: read_c_str(self.neighborhood),
            city: read_c_str(self.city).ok_or("city")?,
            image_url: read_c_str(self.image_url),
        })
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to `poster_resolver_on_response`. The FFI layer
/// reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiApiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    InvalidUrl = 1,
    EndpointNotFound = 2,
    Server = 3,
    Decoding = 4,
    NetworkUnavailable = 5,
    Panic = 6,
    NullArg = 7,
    InvalidArg = 8,
}

/// Tag that tells `poster_free_result` what `FfiApiResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Operation = 1,
    Queue = 2,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResolutionState {
    Trying = 0,
    Succeeded = 1,
    FailedDefinitive = 2,
    FailedExhausted = 3,
    /// The resolver pointer was null.
    Invalid = 4,
}

impl From<ResolutionState> for FfiResolutionState {
    fn from(state: ResolutionState) -> Self {
        match state {
            ResolutionState::Trying(_) => FfiResolutionState::Trying,
            ResolutionState::Succeeded => FfiResolutionState::Succeeded,
            ResolutionState::FailedDefinitive => FfiResolutionState::FailedDefinitive,
            ResolutionState::FailedExhausted => FfiResolutionState::FailedExhausted,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiQueueStatus {
    Pending = 0,
    Posted = 1,
    Other = 2,
}

impl From<QueueStatus> for FfiQueueStatus {
    fn from(status: QueueStatus) -> Self {
        match status {
            QueueStatus::Pending => FfiQueueStatus::Pending,
            QueueStatus::Posted => FfiQueueStatus::Posted,
            QueueStatus::Other => FfiQueueStatus::Other,
        }
    }
}

/// Listing echo. Absent strings are null; absent counts are -1.
#[repr(C)]
pub struct FfiListingSummary {
    pub id: *mut c_char,
    pub address: *mut c_char,
    pub price: *mut c_char,
    pub city: *mut c_char,
    pub property_type: *mut c_char,
    pub bedrooms: i64,
    pub bathrooms: i64,
}

impl FfiListingSummary {
    fn from_core(s: ListingSummary) -> Self {
        Self {
            id: opt_c_string(s.id),
            address: opt_c_string(s.address),
            price: opt_c_string(s.price),
            city: opt_c_string(s.city),
            property_type: opt_c_string(s.property_type),
            bedrooms: s.bedrooms.map_or(-1, i64::from),
            bathrooms: s.bathrooms.map_or(-1, i64::from),
        }
    }

    fn free_fields(&self) {
        for s in [self.id, self.address, self.price, self.city, self.property_type] {
            free_c_string(s);
        }
    }
}

#[repr(C)]
pub struct FfiPostingResult {
    pub success: bool,
    pub post_id: *mut c_char,
    pub message: *mut c_char,
    pub error: *mut c_char,
}

impl FfiPostingResult {
    fn from_core(p: PostingResult) -> Self {
        Self {
            success: p.success,
            post_id: opt_c_string(p.post_id),
            message: opt_c_string(p.message),
            error: opt_c_string(p.error),
        }
    }

    fn free_fields(&self) {
        for s in [self.post_id, self.message, self.error] {
            free_c_string(s);
        }
    }
}

/// The operation envelope exposed to C. Nested records are null when the
/// server omitted them.
#[repr(C)]
pub struct FfiOperationResult {
    pub success: bool,
    pub message: *mut c_char,
    pub queue_id: *mut c_char,
    pub generated_content: *mut c_char,
    pub error: *mut c_char,
    pub listing: *mut FfiListingSummary,
    pub posting: *mut FfiPostingResult,
}

impl FfiOperationResult {
    fn from_core(r: OperationResult) -> Self {
        Self {
            success: r.success,
            message: opt_c_string(r.message),
            queue_id: opt_c_string(r.queue_id),
            generated_content: opt_c_string(r.generated_content),
            error: opt_c_string(r.error),
            listing: r
                .listing
                .map(|l| Box::into_raw(Box::new(FfiListingSummary::from_core(l))))
                .unwrap_or(ptr::null_mut()),
            posting: r
                .posting
                .map(|p| Box::into_raw(Box::new(FfiPostingResult::from_core(p))))
                .unwrap_or(ptr::null_mut()),
        }
    }

    /// Free every owned field, nested records included.
    pub(crate) fn free_fields(&self) {
        for s in [self.message, self.queue_id, self.generated_content, self.error] {
            free_c_string(s);
        }
        if !self.listing.is_null() {
            let listing = unsafe { Box::from_raw(self.listing) };
            listing.free_fields();
        }
        if !self.posting.is_null() {
            let posting = unsafe { Box::from_raw(self.posting) };
            posting.free_fields();
        }
    }
}

#[repr(C)]
pub struct FfiQueueEntry {
    pub id: *mut c_char,
    pub kind: *mut c_char,
    pub content: *mut c_char,
    pub priority: i64,
    pub status: FfiQueueStatus,
    pub created_at: *mut c_char,
}

impl FfiQueueEntry {
    fn from_core(e: QueueEntry) -> Self {
        Self {
            id: into_c_string(e.id),
            kind: into_c_string(e.kind),
            content: into_c_string(e.content),
            priority: e.priority,
            status: e.status.into(),
            created_at: into_c_string(e.created_at),
        }
    }

    pub(crate) fn free_fields(&self) {
        for s in [self.id, self.kind, self.content, self.created_at] {
            free_c_string(s);
        }
    }
}

#[repr(C)]
pub struct FfiQueueSnapshot {
    pub entries: *mut FfiQueueEntry,
    pub len: usize,
    pub daily_post_count: i64,
    pub remaining_posts_today: i64,
}

/// Result envelope for every resolver outcome.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the decoded payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiApiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiApiResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut std::ffi::c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiApiResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying an `FfiOperationResult`.
    pub(crate) fn ok_operation(result: OperationResult) -> *mut Self {
        let data = Box::into_raw(Box::new(FfiOperationResult::from_core(result)));
        Self::boxed(
            FfiErrorCode::Ok,
            ptr::null_mut(),
            0,
            FfiDataTag::Operation,
            data as *mut std::ffi::c_void,
        )
    }

    /// Build a success result carrying an `FfiQueueSnapshot`.
    pub(crate) fn ok_queue(snapshot: QueueSnapshot) -> *mut Self {
        let entries = snapshot
            .entries
            .into_iter()
            .map(FfiQueueEntry::from_core)
            .collect();
        let (entries, len) = leak_slice(entries);
        let data = Box::into_raw(Box::new(FfiQueueSnapshot {
            entries,
            len,
            daily_post_count: snapshot.daily_post_count,
            remaining_posts_today: snapshot.remaining_posts_today,
        }));
        Self::boxed(
            FfiErrorCode::Ok,
            ptr::null_mut(),
            0,
            FfiDataTag::Queue,
            data as *mut std::ffi::c_void,
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let error_code = match &err {
            ApiError::InvalidUrl(_) => FfiErrorCode::InvalidUrl,
            ApiError::EndpointNotFound { .. } => FfiErrorCode::EndpointNotFound,
            ApiError::ServerError { .. } => FfiErrorCode::Server,
            ApiError::DecodingError(_) => FfiErrorCode::Decoding,
            ApiError::NetworkUnavailable(_) => FfiErrorCode::NetworkUnavailable,
        };
        let http_status = err.status().unwrap_or(0);
        Self::boxed(
            error_code,
            into_c_string(err.to_string()),
            http_status,
            FfiDataTag::None,
            ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            into_c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            ptr::null_mut(),
        )
    }

    /// Build an error result for an out-of-range or unreadable argument.
    pub(crate) fn invalid_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::InvalidArg,
            into_c_string(format!("invalid argument: {name}")),
            0,
            FfiDataTag::None,
            ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            into_c_string(msg.to_string()),
            0,
            FfiDataTag::None,
            ptr::null_mut(),
        )
    }
}
