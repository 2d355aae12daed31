//! Synchronous HTTP client for the tracking API.
//!
//! # Design
//! `TrackerClient` owns a [`Session`] (host + tokens) and a ureq `Agent`
//! built with `http_status_as_error(false)`, so 4xx/5xx responses come back
//! as data and status interpretation stays in [`check_status`]. Data-access
//! verbs target `<host>/data/<path>`, auth operations `<host>/auth/<path>`;
//! every request carries the bearer header whenever tokens are set.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoding::{encode_body, ParamValue};
use crate::error::ApiError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Join `root` and `segments` with exactly one `/` per boundary, regardless
/// of stray leading or trailing slashes on the inputs.
pub fn url_path_join(root: &str, segments: &[&str]) -> String {
    let mut url = root.trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment);
    }
    url
}

type ErrorCtor = fn(String) -> ApiError;

/// Status-code dispatch table, consulted top to bottom, first match wins.
const STATUS_ERRORS: [(u16, ErrorCtor); 4] = [
    (401, ApiError::NotAuthenticated),
    (403, ApiError::NotAllowed),
    (404, ApiError::RouteNotFound),
    (405, ApiError::MethodNotAllowed),
];

/// Map a response status to `Ok(())` for 2xx or the matching [`ApiError`].
pub fn check_status(status: u16, route: &str) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    match STATUS_ERRORS.iter().find(|(code, _)| *code == status) {
        Some((_, ctor)) => Err(ctor(route.to_string())),
        None => Err(ApiError::RequestFailed {
            route: route.to_string(),
            status,
        }),
    }
}

#[derive(Deserialize)]
struct VersionInfo {
    version: String,
}

/// Synchronous client for the tracking API.
///
/// Holds the session state (host, tokens) by value; each client is an
/// independent session.
#[derive(Clone)]
pub struct TrackerClient {
    session: Session,
    agent: ureq::Agent,
}

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

impl Default for TrackerClient {
    fn default() -> Self {
        Self::with_session(Session::default())
    }
}

impl TrackerClient {
    pub fn new(host: &str) -> Self {
        Self::with_session(Session::new(host))
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            agent: agent(),
        }
    }

    pub fn host(&self) -> &str {
        self.session.host()
    }

    pub fn set_host(&mut self, host: &str) {
        debug!("host changed to {host}");
        self.session.set_host(host);
    }

    pub fn tokens(&self) -> Option<&Value> {
        self.session.tokens()
    }

    pub fn set_tokens(&mut self, tokens: Value) {
        self.session.set_tokens(tokens);
    }

    pub fn clear_tokens(&mut self) {
        self.session.clear_tokens();
    }

    /// The `Authorization: Bearer ...` header pair when tokens are set, else
    /// empty.
    pub fn make_auth_header(&self) -> Vec<(String, String)> {
        self.session.auth_header()
    }

    /// Absolute URL for `route` on the current host.
    pub fn get_full_url(&self, route: &str) -> String {
        url_path_join(self.session.host(), &[route])
    }

    /// HEAD the host root; `true` iff the transport call succeeds.
    ///
    /// Status codes are ignored on purpose: a server answering 500 is still
    /// "up". Only transport failures (DNS, refused connection) yield `false`.
    pub fn host_is_up(&self) -> bool {
        self.agent.head(self.session.host()).call().is_ok()
    }

    /// GET `<host>/data/<path>`, with optional query parameters.
    pub fn get(&self, path: &str, params: &[(&str, ParamValue)]) -> Result<Value, ApiError> {
        self.request(HttpMethod::Get, &["data", path], params, None)
    }

    /// POST `body` as JSON to `<host>/data/<path>`.
    pub fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        self.request(HttpMethod::Post, &["data", path], &[], Some(encode_body(body)?))
    }

    /// PUT `body` as JSON to `<host>/data/<path>`.
    pub fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        self.request(HttpMethod::Put, &["data", path], &[], Some(encode_body(body)?))
    }

    /// DELETE `<host>/data/<path>`. An empty response body decodes to
    /// `Value::Null`.
    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(HttpMethod::Delete, &["data", path], &[], None)
    }

    /// GET a collection; the response must be a JSON array.
    pub fn fetch_all(
        &self,
        resource: &str,
        params: &[(&str, ParamValue)],
    ) -> Result<Vec<Value>, ApiError> {
        let decoded = self.get(resource, params)?;
        Ok(serde_json::from_value(decoded)?)
    }

    /// First element of the collection, or `None` when it is empty.
    pub fn fetch_first(
        &self,
        resource: &str,
        params: &[(&str, ParamValue)],
    ) -> Result<Option<Value>, ApiError> {
        let mut entries = self.fetch_all(resource, params)?;
        if entries.is_empty() {
            Ok(None)
        } else {
            Ok(Some(entries.remove(0)))
        }
    }

    /// GET a single entity by id.
    pub fn fetch_one(&self, resource: &str, id: &str) -> Result<Value, ApiError> {
        self.get(&format!("{resource}/{id}"), &[])
    }

    /// POST a new entity; returns it with the server-assigned id.
    pub fn create<T: Serialize>(&self, resource: &str, data: &T) -> Result<Value, ApiError> {
        self.post(resource, data)
    }

    /// GET the host root and return its `version` field.
    pub fn get_api_version(&self) -> Result<String, ApiError> {
        let decoded = self.request(HttpMethod::Get, &[], &[], None)?;
        let info: VersionInfo = serde_json::from_value(decoded)?;
        Ok(info.version)
    }

    /// POST credentials to `auth/login`. On success the entire decoded
    /// response (whose `tokens` field carries the credentials) is stored in
    /// the session, and the `user` field is returned if present. A response
    /// without `login: true` fails with [`ApiError::AuthFailed`].
    pub fn log_in(&mut self, email: &str, password: &str) -> Result<Option<Value>, ApiError> {
        let credentials = serde_json::json!({"email": email, "password": password});
        let decoded = self.request(
            HttpMethod::Post,
            &["auth", "login"],
            &[],
            Some(encode_body(&credentials)?),
        )?;
        if decoded.get("login").and_then(Value::as_bool) == Some(true) {
            debug!("logged in as {email}");
            let user = decoded.get("user").cloned();
            self.session.set_tokens(decoded);
            Ok(user)
        } else {
            Err(ApiError::AuthFailed)
        }
    }

    /// GET `auth/authenticated` and return its `user` field.
    pub fn get_current_user(&self) -> Result<Value, ApiError> {
        let decoded = self.request(HttpMethod::Get, &["auth", "authenticated"], &[], None)?;
        Ok(decoded.get("user").cloned().unwrap_or(Value::Null))
    }

    /// Execute one HTTP round-trip and decode the body.
    ///
    /// The URL is host + `segments`; `params` only apply to GET. Non-2xx
    /// statuses are turned into errors by [`check_status`] before the body
    /// is parsed; an empty body decodes to `Value::Null`.
    fn request(
        &self,
        method: HttpMethod,
        segments: &[&str],
        params: &[(&str, ParamValue)],
        body: Option<String>,
    ) -> Result<Value, ApiError> {
        let url = url_path_join(self.session.host(), segments);
        debug!("{method:?} {url}");

        let mut response = match (method, body) {
            (HttpMethod::Get, _) => {
                let mut req = self.agent.get(&url);
                for (key, value) in params {
                    req = req.query(*key, value.to_query_value());
                }
                for (key, value) in self.make_auth_header() {
                    req = req.header(key.as_str(), value.as_str());
                }
                req.call()?
            }
            (HttpMethod::Delete, _) => {
                let mut req = self.agent.delete(&url);
                for (key, value) in self.make_auth_header() {
                    req = req.header(key.as_str(), value.as_str());
                }
                req.call()?
            }
            (HttpMethod::Post, payload) => {
                let mut req = self.agent.post(&url).content_type("application/json");
                for (key, value) in self.make_auth_header() {
                    req = req.header(key.as_str(), value.as_str());
                }
                match payload {
                    Some(payload) => req.send(payload.as_bytes())?,
                    None => req.send_empty()?,
                }
            }
            (HttpMethod::Put, payload) => {
                let mut req = self.agent.put(&url).content_type("application/json");
                for (key, value) in self.make_auth_header() {
                    req = req.header(key.as_str(), value.as_str());
                }
                match payload {
                    Some(payload) => req.send(payload.as_bytes())?,
                    None => req.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        check_status(status, &url)?;

        if body.trim().is_empty() {
            Ok(Value::Null)
        } else {
            Ok(serde_json::from_str(&body)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> TrackerClient {
        TrackerClient::new("http://tracker-server/")
    }

    #[test]
    fn url_path_join_ignores_trailing_slash_on_root() {
        let expected = "http://tracker-server/data/persons";
        assert_eq!(
            url_path_join("http://tracker-server/", &["data", "persons"]),
            expected
        );
        assert_eq!(
            url_path_join("http://tracker-server", &["data", "persons"]),
            expected
        );
    }

    #[test]
    fn url_path_join_trims_slashes_on_segments() {
        assert_eq!(
            url_path_join("http://tracker-server", &["/data/", "persons/"]),
            "http://tracker-server/data/persons"
        );
    }

    #[test]
    fn url_path_join_skips_empty_segments() {
        assert_eq!(
            url_path_join("http://tracker-server/", &[""]),
            "http://tracker-server"
        );
    }

    #[test]
    fn get_full_url_joins_host_and_route() {
        let c = client();
        assert_eq!(
            c.get_full_url("test_route"),
            "http://tracker-server/test_route"
        );
    }

    #[test]
    fn set_host_round_trips() {
        let mut c = client();
        c.set_host("newhost");
        assert_eq!(c.host(), "newhost");
        c.set_host("http://tracker-server/");
        assert_eq!(c.host(), "http://tracker-server/");
    }

    #[test]
    fn default_client_uses_default_host() {
        assert_eq!(TrackerClient::default().host(), crate::DEFAULT_HOST);
    }

    #[test]
    fn make_auth_header_after_set_tokens() {
        let mut c = client();
        c.set_tokens(json!({"access_token": "token_test"}));
        assert_eq!(
            c.make_auth_header(),
            vec![(
                "Authorization".to_string(),
                "Bearer token_test".to_string()
            )]
        );
    }

    #[test]
    fn make_auth_header_empty_without_tokens() {
        assert!(client().make_auth_header().is_empty());
    }

    #[test]
    fn check_status_passes_2xx_through() {
        assert!(check_status(200, "/").is_ok());
        assert!(check_status(201, "/").is_ok());
        assert!(check_status(204, "/").is_ok());
    }

    #[test]
    fn check_status_maps_auth_and_routing_codes() {
        assert!(matches!(
            check_status(401, "/").unwrap_err(),
            ApiError::NotAuthenticated(_)
        ));
        assert!(matches!(
            check_status(403, "/").unwrap_err(),
            ApiError::NotAllowed(_)
        ));
        assert!(matches!(
            check_status(404, "/").unwrap_err(),
            ApiError::RouteNotFound(_)
        ));
        assert!(matches!(
            check_status(405, "/").unwrap_err(),
            ApiError::MethodNotAllowed(_)
        ));
    }

    #[test]
    fn check_status_other_non_2xx_includes_route_and_code() {
        let err = check_status(500, "http://tracker-server/data/persons").unwrap_err();
        match err {
            ApiError::RequestFailed { route, status } => {
                assert_eq!(route, "http://tracker-server/data/persons");
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let message = check_status(500, "http://tracker-server/data/persons")
            .unwrap_err()
            .to_string();
        assert!(message.contains("http://tracker-server/data/persons"));
        assert!(message.contains("500"));
    }
}
