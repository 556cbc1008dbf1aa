//! Field names read from Graylog messages and the helper fields synthesized
//! for templates. Synthesized names start with an underscore so they never
//! collide with fields sent by the server.

pub const ID: &str = "_id";
pub const TIMESTAMP: &str = "timestamp";
pub const STREAMS: &str = "streams";

pub const MESSAGE: &str = "message";
pub const FULL_MESSAGE: &str = "full_message";
pub const ORIGINAL_MESSAGE: &str = "original_message";
pub const REQUEST_PAGE: &str = "request_page";
pub const CLASSNAME: &str = "classname";
pub const LOG_LEVEL: &str = "loglevel";
pub const LEVEL: &str = "level";

pub const LONG_TIMESTAMP: &str = "_long_timestamp";
pub const SHORT_CLASSNAME: &str = "_short_classname";
pub const MESSAGE_TEXT: &str = "_message_text";
pub const LEVEL_COLOR: &str = "_level_color";
pub const RESET: &str = "_reset";
pub const MATCHING_STREAMS: &str = "_matching_streams";
