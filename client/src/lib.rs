//! Synchronous client library for a production-tracking REST API.
//!
//! # Overview
//! Thin wrapper over the remote API: it builds request URLs, performs
//! blocking HTTP calls, manages a bearer-token session, decodes JSON bodies,
//! and maps non-2xx statuses to typed errors.
//!
//! # Design
//! - [`Session`] holds the only mutable state (host + tokens), by value
//!   inside each [`TrackerClient`] — no process globals, so clients are
//!   independent sessions.
//! - Data access goes to `<host>/data/<path>`, auth to `<host>/auth/<path>`.
//! - Date and datetime values are rendered to ISO-8601 in one place, the
//!   `encoding` module.
//! - No retries, no caching: every failure surfaces to the caller, and only
//!   [`TrackerClient::host_is_up`] swallows transport errors (into `false`).

pub mod client;
pub mod encoding;
pub mod error;
pub mod session;

pub use client::{check_status, url_path_join, TrackerClient};
pub use encoding::ParamValue;
pub use error::ApiError;
pub use session::{Session, DEFAULT_HOST};
