//! Error types for the tracking API client.
//!
//! # Design
//! The four auth/routing statuses (401, 403, 404, 405) get dedicated variants
//! because callers routinely branch on them; every variant carries the route
//! that failed. All other non-2xx responses land in `RequestFailed` with the
//! raw status code. Transport errors pass through unmodified so DNS failures
//! and refused connections stay distinguishable from server-side rejections.

use thiserror::Error;

/// Errors returned by [`TrackerClient`](crate::TrackerClient) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 401 — no valid credentials for this route.
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// The server returned 403 — authenticated but not permitted.
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// The server returned 404 — the route does not exist.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// The server returned 405 — the verb is not supported on this route.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Login was rejected (`login: false` in the response body).
    #[error("login failed, please verify your credentials")]
    AuthFailed,

    /// Any other non-2xx status.
    #[error("request to {route} failed with status {status}")]
    RequestFailed { route: String, status: u16 },

    /// The HTTP transport failed before a response was produced.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// A request body could not be serialized or a response body could not
    /// be parsed as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
