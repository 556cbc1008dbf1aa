//! Turns command-line arguments into [`SearchOptions`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::app::{GraytailError, Result};
use crate::cli::Cli;
use crate::domain::{OutputMode, SearchOptions, TimeWindow, DEFAULT_LIMIT};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Build the options for this run. `now` fixes the end of an absolute
/// window when `--end` is omitted and anchors time-only dates.
pub fn search_options(cli: &Cli, now: NaiveDateTime, interactive: bool) -> Result<SearchOptions> {
    if cli.export.is_some() && cli.start.is_none() {
        return Err(GraytailError::InvalidArgument(
            "The --export option requires the --start option".into(),
        ));
    }

    let window = match cli.start.as_deref() {
        Some(start) => {
            let from = parse_date(start, now.date())?;
            let to = match cli.end.as_deref() {
                Some(end) => parse_date(end, now.date())?,
                None => now,
            };
            if from > to {
                return Err(GraytailError::InvalidArgument(
                    "The --start date must be before the --end date".into(),
                ));
            }
            TimeWindow::Absolute { from, to }
        }
        None => TimeWindow::Relative {
            seconds: parse_range(&cli.range)?,
        },
    };

    let limit = if cli.limit <= 0 {
        DEFAULT_LIMIT
    } else {
        u32::try_from(cli.limit).unwrap_or(u32::MAX)
    };

    Ok(SearchOptions {
        query: cli.query.clone().unwrap_or_default(),
        application: cli.application.clone(),
        window,
        limit,
        streams: cli.stream.clone(),
        fields: cli.export.clone(),
        output: if cli.json {
            OutputMode::Json
        } else {
            OutputMode::Formatted
        },
        color: interactive && !cli.no_colors,
    })
}

/// Tailing only makes sense for relative searches, so `--start` turns it off.
pub fn tail_enabled(cli: &Cli) -> bool {
    cli.tail && cli.start.is_none()
}

/// Parse a range like `2h`, `30m` or `3d2h30m` into seconds. A bare number
/// is taken as seconds.
pub fn parse_range(range: &str) -> Result<u64> {
    let range = range.trim().to_lowercase();
    let invalid = || GraytailError::InvalidArgument(format!("Time range can't be parsed: {}", range));

    let seconds = match range.parse::<u64>() {
        Ok(secs) => secs,
        Err(_) => {
            let mut total: u64 = 0;
            let mut digits = String::new();
            for c in range.chars() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    continue;
                }
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(invalid()),
                };
                let n: u64 = digits.parse().map_err(|_| invalid())?;
                total = n
                    .checked_mul(unit)
                    .and_then(|s| total.checked_add(s))
                    .ok_or_else(invalid)?;
                digits.clear();
            }
            if !digits.is_empty() {
                return Err(invalid());
            }
            total
        }
    };

    if seconds == 0 {
        return Err(GraytailError::InvalidArgument(
            "Time range must be greater than 0".into(),
        ));
    }
    Ok(seconds)
}

/// Parse a human-friendly local date. Times without a date are on `today`;
/// dates without a time are at midnight.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDateTime> {
    let s = input.trim();
    let spaced = space_meridiem(s);

    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&spaced, format) {
            return Ok(today.and_time(time));
        }
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&spaced, format) {
            return Ok(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    Err(GraytailError::InvalidArgument(format!(
        "The date can't be parsed: {}",
        input
    )))
}

/// `1:32pm` -> `1:32 pm`, so `%p` can match.
fn space_meridiem(s: &str) -> String {
    let lower = s.to_lowercase();
    if (lower.ends_with("am") || lower.ends_with("pm")) && s.len() > 2 {
        let (head, meridiem) = s.split_at(s.len() - 2);
        format!("{} {}", head.trim_end(), meridiem)
    } else {
        s.to_string()
    }
}
