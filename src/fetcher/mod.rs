pub mod export;
#[cfg(test)]
pub mod fake;
pub mod http_fetcher;
pub mod messages;

use async_trait::async_trait;

use crate::app::Result;

pub use messages::{fetch_records, sort_by_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptType {
    Json,
    Csv,
}

impl AcceptType {
    pub fn mime(&self) -> &'static str {
        match self {
            AcceptType::Json => "application/json",
            AcceptType::Csv => "text/csv",
        }
    }
}

/// Raw access to the Graylog REST API.
///
/// `api` is relative to the configured server URI, e.g.
/// `search/universal/relative?range=60&query=*`. Any failure to reach the
/// server or read its response is fatal for the caller.
#[async_trait]
pub trait Transport {
    async fn get(&self, api: &str, accept: AcceptType) -> Result<Vec<u8>>;
}
