//! Request identity.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the caller did not send one
//! - Capture the method, path and forwarding headers the instrumentation
//!   and reporting layers need, independent of the transport types
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost layer)
//! - The path excludes the query string so outcomes group by route

use axum::http::{HeaderMap, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID, in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header identifying the original client behind proxies.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// What the instrumentation layer knows about a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    pub request_id: Option<String>,
    pub forwarded_for: Option<String>,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            request_id: None,
            forwarded_for: None,
        }
    }

    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let path = match uri.path() {
            "" => "/".to_string(),
            p => p.to_string(),
        };

        Self {
            method: method.as_str().to_string(),
            path,
            request_id: header(X_REQUEST_ID),
            forwarded_for: header(X_FORWARDED_FOR),
        }
    }
}
