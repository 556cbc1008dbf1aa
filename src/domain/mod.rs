pub mod fields;
pub mod record;
pub mod search;
pub mod stream;

pub use record::LogRecord;
pub use search::{OutputMode, SearchOptions, TimeWindow, DEFAULT_LIMIT, DEFAULT_RANGE_SECS};
pub use stream::StreamDescriptor;
