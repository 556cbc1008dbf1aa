//! In-process memory of which messages were already shown.
//!
//! Nothing here outlives the process; a new invocation starts empty.

pub mod dedup;

pub use dedup::{DedupCache, DEFAULT_CAPACITY};
