//! Maps [`SearchOptions`] to the Graylog request that answers them.
//!
//! Everything here is pure: no I/O, no clock reads. An absolute window's end
//! has already been fixed by the time options reach the planner.

use url::form_urlencoded::byte_serialize;

use crate::domain::{SearchOptions, TimeWindow};

pub const RELATIVE_SEARCH: &str = "search/universal/relative";
pub const ABSOLUTE_SEARCH: &str = "search/universal/absolute";
pub const STREAMS: &str = "streams";

/// Format Graylog expects for `from`/`to`.
pub const REQUEST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MATCH_ALL: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub path: &'static str,
    /// Query parameters in request order, unescaped.
    pub params: Vec<(&'static str, String)>,
    pub limit: Option<u32>,
    /// Raw CSV export rather than a JSON message list.
    pub export: bool,
}

impl RequestDescriptor {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Deduplication only applies to limited, non-export searches.
    pub fn deduplicates(&self) -> bool {
        !self.export && self.limit.is_some()
    }

    /// Path and escaped query string, relative to the server base URI.
    pub fn uri(&self) -> String {
        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key, escape(value)))
            .collect::<Vec<_>>()
            .join("&");

        if query.is_empty() {
            self.path.to_string()
        } else {
            format!("{}?{}", self.path, query)
        }
    }
}

/// Build the request for `options`, filtered to the already resolved
/// `stream_ids`.
pub fn plan(options: &SearchOptions, stream_ids: &[String]) -> RequestDescriptor {
    let mut params = Vec::new();
    let export = options.is_export();

    match options.window {
        TimeWindow::Relative { seconds } => {
            params.push(("range", seconds.to_string()));
        }
        TimeWindow::Absolute { from, to } => {
            params.push(("from", from.format(REQUEST_TIME_FORMAT).to_string()));
            params.push(("to", to.format(REQUEST_TIME_FORMAT).to_string()));
        }
    }

    if let (true, Some(fields)) = (export, options.export_fields()) {
        params.push(("fields", fields.to_string()));
    }

    let limit = Some(options.limit).filter(|l| *l > 0 && !export);
    if let Some(limit) = limit {
        params.push(("limit", limit.to_string()));
    }

    params.push(("query", query_text(options)));

    if let Some(filter) = stream_filter(stream_ids) {
        params.push(("filter", filter));
    }

    let path = if options.window.is_relative() {
        RELATIVE_SEARCH
    } else {
        ABSOLUTE_SEARCH
    };

    RequestDescriptor {
        path,
        params,
        limit,
        export,
    }
}

/// The query term: application shortcut first, ANDed with the free text,
/// or match-all when both are empty.
pub fn query_text(options: &SearchOptions) -> String {
    let query = options.query.trim();
    let application = options
        .application
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    match (application, query.is_empty()) {
        (Some(app), true) => format!("application:{}", app),
        (Some(app), false) => format!("application:{} AND {}", app, query),
        (None, false) => query.to_string(),
        (None, true) => MATCH_ALL.to_string(),
    }
}

/// `streams:<a> OR streams:<b>`, or nothing when no ids were resolved.
pub fn stream_filter(stream_ids: &[String]) -> Option<String> {
    if stream_ids.is_empty() {
        return None;
    }
    Some(
        stream_ids
            .iter()
            .map(|id| format!("streams:{}", id))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

pub fn streams_request() -> RequestDescriptor {
    RequestDescriptor {
        path: STREAMS,
        params: Vec::new(),
        limit: None,
        export: false,
    }
}

fn escape(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
