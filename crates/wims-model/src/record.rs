//! Record-to-type mapping helpers.
//!
//! The server is loose about scalars: the same field may come back as `30`
//! or `"30"`. [`decode`] turns every scalar into text before handing the
//! record to serde, so local types declare text fields and parse the few
//! numeric ones with [`number_from_text`].

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;
use wims_api::Record;
use wims_api::protocol::value_to_text;

use crate::error::ModelError;

/// Build a `T` from a remote record. Null fields are treated as absent.
///
/// # Errors
///
/// Returns `ModelError::Decode` if the record does not fit `T`.
pub fn decode<T: DeserializeOwned>(what: &str, record: Record) -> Result<T, ModelError> {
    let normalized: Record = record
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::Bool(_) | Value::Number(_) => Some((key, Value::String(value_to_text(&value)))),
            other => Some((key, other)),
        })
        .collect();
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| ModelError::Decode(format!("{what}: {e}")))
}

/// Render `value` as a flat record.
///
/// # Errors
///
/// Returns `ModelError::Decode` if `value` does not serialize to an object.
pub fn encode<T: Serialize>(what: &str, value: &T) -> Result<Record, ModelError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(ModelError::Decode(format!(
            "{what}: expected an object, got {other}"
        ))),
        Err(e) => Err(ModelError::Decode(format!("{what}: {e}"))),
    }
}

/// Text value of `key`, if present and not null.
#[must_use]
pub fn text(record: &Record, key: &str) -> Option<String> {
    record
        .get(key)
        .filter(|value| !value.is_null())
        .map(value_to_text)
}

/// Serde helper for numeric fields that arrive as text.
pub(crate) fn number_from_text<'de, D, N>(deserializer: D) -> Result<N, D::Error>
where
    D: Deserializer<'de>,
    N: FromStr,
    N::Err: Display,
{
    let text = String::deserialize(deserializer)?;
    text.trim().parse().map_err(de::Error::custom)
}
