//! # graytail
//!
//! Search and tail Graylog logs from the terminal.
//!
//! ## Architecture
//!
//! Every search runs through the same pipeline:
//!
//! ```text
//! Query → Fetcher → Normalizer → Dedup → Render
//! ```
//!
//! - [`query`]: Builds the Graylog request for a search
//! - [`fetcher`]: HTTP transport, sorted and deduplicated message batches
//! - [`normalizer`]: Converts Graylog JSON into domain records
//! - [`store`]: Bounded cache of already printed message ids
//! - [`render`]: Derived fields and user templates
//!
//! [`tail`] wraps the pipeline in a poll/sleep loop.
//!
//! ## Quick Start
//!
//! ```bash
//! # Errors from one application over the last 30 minutes
//! graytail -a send-email -q 'level:ERROR' -r 30m
//!
//! # Follow a stream
//! graytail -s production -t
//!
//! # Export two fields of a fixed window to export.csv
//! graytail --start '2024-03-01 09:00' --end '2024-03-01 10:00' -e timestamp,message
//!
//! # List streams
//! graytail --list-streams
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together transport,
/// normalizer, stream directory, dedup cache and renderer.
pub mod app;

/// Command-line interface using clap, and its conversion into
/// [`SearchOptions`](domain::SearchOptions).
pub mod cli;

/// Configuration file: server connection and display formats.
///
/// Loads from `~/.config/graytail/config.toml` unless `--config` is given.
pub mod config;

/// Core domain models.
///
/// - [`SearchOptions`](domain::SearchOptions): what to search and how to show it
/// - [`LogRecord`](domain::LogRecord): one message with its flat field map
/// - [`StreamDescriptor`](domain::StreamDescriptor): a Graylog stream
pub mod domain;

/// Graylog API access.
///
/// - [`Transport`](fetcher::Transport): Async trait for raw API requests
/// - [`HttpTransport`](fetcher::http_fetcher::HttpTransport): reqwest-based implementation
/// - [`fetch_records`](fetcher::fetch_records): one sorted, deduplicated poll
pub mod fetcher;

/// Graylog response parsing.
pub mod normalizer;

/// Request planning.
pub mod query;

/// Field projection and template rendering.
pub mod render;

/// Terminal spinner shown while tailing.
pub mod spinner;

/// Recently seen message ids.
pub mod store;

/// Stream name and id lookups.
pub mod streams;

/// Continuous polling with backoff and signal-driven shutdown.
pub mod tail;
