use chrono::NaiveDateTime;

/// Limit used when none (or a non-positive one) is given.
pub const DEFAULT_LIMIT: u32 = 300;

/// Two hours, the range used when none is given.
pub const DEFAULT_RANGE_SECS: u64 = 7200;

/// The time bounds of a search. Exactly one kind is ever active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// The last `seconds` seconds, re-evaluated by the server on every request.
    Relative { seconds: u64 },
    /// A fixed window in local wall-clock time.
    Absolute {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },
}

impl TimeWindow {
    pub fn is_relative(&self) -> bool {
        matches!(self, TimeWindow::Relative { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Formatted,
    Json,
}

/// Everything a single invocation searches for and how results are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub query: String,
    pub application: Option<String>,
    pub window: TimeWindow,
    /// `0` means no limit.
    pub limit: u32,
    /// Comma-separated stream names.
    pub streams: Option<String>,
    /// Comma-separated field names to export.
    pub fields: Option<String>,
    pub output: OutputMode,
    pub color: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            application: None,
            window: TimeWindow::Relative {
                seconds: DEFAULT_RANGE_SECS,
            },
            limit: DEFAULT_LIMIT,
            streams: None,
            fields: None,
            output: OutputMode::Formatted,
            color: false,
        }
    }
}

impl SearchOptions {
    pub fn relative(seconds: u64) -> Self {
        Self {
            window: TimeWindow::Relative { seconds },
            ..Self::default()
        }
    }

    pub fn absolute(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self {
            window: TimeWindow::Absolute { from, to },
            ..Self::default()
        }
    }

    /// Absolute window plus a field list: raw CSV instead of parsed records.
    pub fn is_export(&self) -> bool {
        !self.window.is_relative() && self.export_fields().is_some()
    }

    pub fn export_fields(&self) -> Option<&str> {
        self.fields.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }

    pub fn stream_names(&self) -> Option<&str> {
        self.streams.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_relative_is_never_export() {
        let mut options = SearchOptions::relative(60);
        options.fields = Some("message,source".into());
        assert!(!options.is_export());
    }

    #[test]
    fn test_absolute_with_fields_is_export() {
        let mut options = SearchOptions::absolute(at(1), at(2));
        assert!(!options.is_export());

        options.fields = Some("  ".into());
        assert!(!options.is_export());

        options.fields = Some("message".into());
        assert!(options.is_export());
    }
}
