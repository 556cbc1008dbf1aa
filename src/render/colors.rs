//! ANSI colours for log levels.

pub const DEBUG_ESC: &str = "\x1b[94m";
pub const INFO_ESC: &str = "\x1b[92m";
pub const WARN_ESC: &str = "\x1b[93m";
pub const ERROR_ESC: &str = "\x1b[91m";
pub const RESET_ESC: &str = "\x1b[0;0m";

/// Colour escape for a normalized (uppercase) level, if it has one.
pub fn level_color(level: &str) -> Option<&'static str> {
    match level {
        "DEBUG" | "TRACE" => Some(DEBUG_ESC),
        "INFO" => Some(INFO_ESC),
        "WARN" => Some(WARN_ESC),
        "ERROR" | "FATAL" => Some(ERROR_ESC),
        _ => None,
    }
}

/// Values for the level-colour and reset fields. Both are empty when not
/// writing to a terminal or when the level has no colour.
pub fn color_fields(level: &str, interactive: bool) -> (&'static str, &'static str) {
    match level_color(level) {
        Some(color) if interactive => (color, RESET_ESC),
        _ => ("", ""),
    }
}
