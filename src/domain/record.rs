use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A single message returned by a search.
///
/// `id` is stable across polls and is the only thing deduplication looks at;
/// the field values may differ between polls if the server reprocessed the
/// message.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub streams: Vec<String>,
    pub fields: BTreeMap<String, String>,
}

impl LogRecord {
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp,
            streams: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Like [`field`](Self::field), but treats an empty value as absent.
    pub fn non_empty_field(&self, name: &str) -> Option<&str> {
        self.field(name).filter(|v| !v.is_empty())
    }

    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_streams<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.streams = streams.into_iter().map(Into::into).collect();
        self
    }
}
