//! Query-parameter and request-body encoding.
//!
//! # Design
//! Everything that turns caller-supplied values into wire text lives here, so
//! date handling stays in one place: `NaiveDate` renders as `YYYY-MM-DD` and
//! `DateTime<Utc>` as RFC 3339, both ISO-8601, whether the value appears in a
//! query string or inside a JSON body (the latter via chrono's serde impls).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::ApiError;

/// A value usable in a query string.
///
/// Constructed via `From` impls, e.g. `("name", "Test".into())`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl ParamValue {
    /// Render the value as query-string text. Dates and datetimes come out
    /// as ISO-8601.
    pub fn to_query_value(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            ParamValue::DateTime(dt) => dt.to_rfc3339(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(value: NaiveDate) -> Self {
        ParamValue::Date(value)
    }
}

impl From<DateTime<Utc>> for ParamValue {
    fn from(value: DateTime<Utc>) -> Self {
        ParamValue::DateTime(value)
    }
}

/// Serialize a request body to JSON text.
///
/// The single encoding step every outgoing body goes through. chrono fields
/// serialize to ISO-8601 strings here; new date-like types only need a serde
/// impl to be supported.
pub fn encode_body<T: Serialize>(body: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string(body)?)
}
