//! Session state: host URL and authentication tokens.
//!
//! # Design
//! The remote host and the token payload are the only mutable state the
//! client carries. They live in an explicit `Session` value owned by each
//! client instead of process globals, so two clients can talk to two servers
//! (or as two users) without stepping on each other.

use serde_json::Value;

/// Base URL used when no host is configured.
pub const DEFAULT_HOST: &str = "http://tracker-server/";

/// Host URL plus the token payload obtained from login.
#[derive(Debug, Clone)]
pub struct Session {
    host: String,
    tokens: Option<Value>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

impl Session {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            tokens: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Replace the host URL. The string is stored as-is; no validation.
    pub fn set_host(&mut self, host: &str) {
        self.host = host.to_string();
    }

    pub fn tokens(&self) -> Option<&Value> {
        self.tokens.as_ref()
    }

    /// Replace the token payload. Login stores the entire decoded login
    /// response here; callers may also set a bare
    /// `{"access_token": ...}` mapping directly.
    pub fn set_tokens(&mut self, tokens: Value) {
        self.tokens = Some(tokens);
    }

    pub fn clear_tokens(&mut self) {
        self.tokens = None;
    }

    /// The `Authorization` header pair for the current tokens, or empty when
    /// no usable access token is held.
    ///
    /// The access token is looked up at the top level of the payload first,
    /// then under the `tokens` key, which covers both a directly-set token
    /// mapping and a stored login response.
    pub fn auth_header(&self) -> Vec<(String, String)> {
        let access_token = self.tokens.as_ref().and_then(|payload| {
            payload
                .get("access_token")
                .or_else(|| payload.get("tokens").and_then(|t| t.get("access_token")))
                .and_then(Value::as_str)
        });
        match access_token {
            Some(token) => vec![("Authorization".to_string(), format!("Bearer {token}"))],
            None => Vec::new(),
        }
    }
}
