use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::app::{GraytailError, Result};
use crate::domain::{fields, LogRecord, StreamDescriptor};

/// Format of `timestamp` in Graylog search results.
pub const RESPONSE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Result of parsing a search response.
#[derive(Debug, Default)]
pub struct MessageBatch {
    pub records: Vec<LogRecord>,
    /// One entry per message that could not be turned into a record.
    pub rejected: Vec<GraytailError>,
}

/// Turns Graylog JSON responses into domain values.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse the `messages` array of a search response.
    ///
    /// A body that is not JSON at all is an error; individual malformed
    /// messages end up in [`MessageBatch::rejected`].
    pub fn messages(&self, body: &[u8]) -> Result<MessageBatch> {
        let root: Value = serde_json::from_slice(body)?;

        let Some(entries) = root.get("messages").and_then(Value::as_array) else {
            tracing::warn!("Search response has no messages array");
            return Ok(MessageBatch::default());
        };

        let mut batch = MessageBatch::default();
        for entry in entries {
            match self.message(entry) {
                Ok(record) => batch.records.push(record),
                Err(e) => batch.rejected.push(e),
            }
        }
        Ok(batch)
    }

    /// Parse the `streams` listing, keeping enabled streams only.
    ///
    /// Entries that don't match the expected shape are skipped with a
    /// warning; the rest of the listing is still usable.
    pub fn streams(&self, body: &[u8]) -> Result<Vec<StreamDescriptor>> {
        let root: Value = serde_json::from_slice(body)?;

        let Some(entries) = root.get("streams").and_then(Value::as_array) else {
            tracing::warn!("Streams response has no streams array");
            return Ok(Vec::new());
        };

        let mut streams = Vec::with_capacity(entries.len());
        for entry in entries {
            match StreamDescriptor::deserialize(entry) {
                Ok(stream) if !stream.disabled => streams.push(stream),
                Ok(_) => {}
                Err(e) => tracing::warn!("Skipping stream entry: {}", e),
            }
        }
        Ok(streams)
    }

    fn message(&self, entry: &Value) -> Result<LogRecord> {
        let message = entry
            .get("message")
            .and_then(Value::as_object)
            .ok_or_else(|| GraytailError::Parse("entry has no message object".into()))?;

        let fields = flatten(message);

        let id = fields
            .get(fields::ID)
            .filter(|id| !id.is_empty())
            .cloned()
            .ok_or_else(|| GraytailError::Parse("message has no _id".into()))?;

        let raw_timestamp = fields.get(fields::TIMESTAMP).map(String::as_str).unwrap_or("");
        let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| {
            GraytailError::Parse(format!("invalid timestamp {:?} on {}", raw_timestamp, id))
        })?;

        let streams = message
            .get(fields::STREAMS)
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(scalar).collect())
            .unwrap_or_default();

        Ok(LogRecord {
            id,
            timestamp,
            streams,
            fields,
        })
    }
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, RESPONSE_TIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Graylog sends some string values with their escape sequences still
/// literal, so a stack trace arrives as one long line.
pub fn expand_escapes(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
}

/// Scalar members as strings; arrays, objects and nulls are left out.
fn flatten(object: &Map<String, Value>) -> BTreeMap<String, String> {
    object
        .iter()
        .filter_map(|(key, value)| scalar(value).map(|v| (key.clone(), v)))
        .collect()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(expand_escapes(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
