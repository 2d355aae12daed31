//! In-memory emulation of the tracking API, used by client integration tests
//! and runnable standalone via `src/main.rs`.
//!
//! Entities are schemaless JSON objects grouped by resource name, so tests
//! can exercise any collection (`persons`, `projects`, ...) without the
//! server knowing about it up front. Login issues a fresh access token per
//! session and `auth/authenticated` only answers for tokens it issued.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Version reported on the root route.
pub const API_VERSION: &str = "0.2.0";

/// Credentials accepted by the login route.
pub const USER_EMAIL: &str = "frank";
pub const USER_PASSWORD: &str = "test";

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Default)]
pub struct Store {
    /// resource name -> entity id -> entity
    resources: HashMap<String, HashMap<String, Value>>,
    /// access tokens issued by login
    sessions: Vec<String>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/", get(version))
        .route("/auth/login", post(login))
        .route("/auth/authenticated", get(authenticated))
        .route("/data/{resource}", get(list_entries).post(create_entry))
        .route(
            "/data/{resource}/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn version() -> Json<Value> {
    Json(json!({"version": API_VERSION}))
}

fn current_user() -> Value {
    json!({"id": "user-01", "email": USER_EMAIL, "first_name": "Frank"})
}

async fn login(State(db): State<Db>, Json(credentials): Json<Credentials>) -> Json<Value> {
    if credentials.email == USER_EMAIL && credentials.password == USER_PASSWORD {
        let access_token = Uuid::new_v4().to_string();
        db.write().await.sessions.push(access_token.clone());
        Json(json!({
            "login": true,
            "tokens": {
                "access_token": access_token,
                "refresh_token": Uuid::new_v4().to_string(),
            },
            "user": current_user(),
        }))
    } else {
        Json(json!({"login": false}))
    }
}

async fn authenticated(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let bearer = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match bearer {
        Some(token) if db.read().await.sessions.iter().any(|issued| issued == token) => {
            Ok(Json(json!({"user": current_user()})))
        }
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Every query pair must match the entity field by string equality.
fn matches_filters(entry: &Value, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(key, expected)| match entry.get(key) {
        Some(Value::String(actual)) => actual == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}

async fn list_entries(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let store = db.read().await;
    let entries = store
        .resources
        .get(&resource)
        .map(|entries| {
            entries
                .values()
                .filter(|entry| matches_filters(entry, &filters))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Json(entries)
}

async fn create_entry(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Json(mut entry): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let id = entry
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    if let Some(fields) = entry.as_object_mut() {
        fields.insert("id".to_string(), Value::String(id.clone()));
    }
    db.write()
        .await
        .resources
        .entry(resource)
        .or_default()
        .insert(id, entry.clone());
    (StatusCode::CREATED, Json(entry))
}

async fn get_entry(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store
        .resources
        .get(&resource)
        .and_then(|entries| entries.get(&id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_entry(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    let entry = store
        .resources
        .get_mut(&resource)
        .and_then(|entries| entries.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    if let (Some(target), Some(fields)) = (entry.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Ok(Json(entry.clone()))
}

async fn delete_entry(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .resources
        .get_mut(&resource)
        .and_then(|entries| entries.remove(&id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_deserialize_from_login_payload() {
        let credentials: Credentials =
            serde_json::from_str(r#"{"email":"frank","password":"test"}"#).unwrap();
        assert_eq!(credentials.email, "frank");
        assert_eq!(credentials.password, "test");
    }

    #[test]
    fn credentials_reject_missing_password() {
        let result: Result<Credentials, _> = serde_json::from_str(r#"{"email":"frank"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn filters_match_string_fields() {
        let entry = json!({"name": "Test", "episodes": 12});
        let mut filters = HashMap::new();
        filters.insert("name".to_string(), "Test".to_string());
        assert!(matches_filters(&entry, &filters));

        filters.insert("name".to_string(), "Other".to_string());
        assert!(!matches_filters(&entry, &filters));
    }

    #[test]
    fn filters_match_non_string_fields_by_rendering() {
        let entry = json!({"episodes": 12});
        let mut filters = HashMap::new();
        filters.insert("episodes".to_string(), "12".to_string());
        assert!(matches_filters(&entry, &filters));
    }

    #[test]
    fn filters_miss_absent_fields() {
        let entry = json!({"name": "Test"});
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), "open".to_string());
        assert!(!matches_filters(&entry, &filters));
    }
}
