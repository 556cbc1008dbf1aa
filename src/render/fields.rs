//! Builds the field map templates are rendered against.
//!
//! [`project`] copies a record's fields and adds the derived ones. Each
//! derivation is a small pure function so it can be checked on its own.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::domain::{fields, LogRecord};
use crate::render::colors::color_fields;
use crate::streams::StreamDirectory;

pub type Fields = BTreeMap<String, String>;

pub const LONG_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

const NESTED_EXCEPTION: &str = "; nested exception ";
const NESTED_EXCEPTION_ON_NEW_LINE: &str = ";\nnested exception ";

/// Field projection for `record`, with timestamps shown in local time.
pub fn project(record: &LogRecord, streams: &StreamDirectory, interactive: bool) -> Fields {
    project_in(record, streams, interactive, &Local)
}

/// Field projection for `record`, with timestamps shown in `tz`.
pub fn project_in<Tz>(
    record: &LogRecord,
    streams: &StreamDirectory,
    interactive: bool,
    tz: &Tz,
) -> Fields
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut projected = record.fields.clone();

    if let Some(page) = record.non_empty_field(fields::REQUEST_PAGE) {
        projected.insert(fields::REQUEST_PAGE.into(), leading_slash(page));
    }

    let original = match record.non_empty_field(fields::ORIGINAL_MESSAGE) {
        Some(original) => original.to_string(),
        None => {
            let full = record
                .non_empty_field(fields::FULL_MESSAGE)
                .unwrap_or_default()
                .to_string();
            projected.insert(fields::ORIGINAL_MESSAGE.into(), full.clone());
            full
        }
    };

    projected.insert(
        fields::LONG_TIMESTAMP.into(),
        long_timestamp(&record.timestamp, tz),
    );

    if let Some(classname) = record.non_empty_field(fields::CLASSNAME) {
        projected.insert(
            fields::SHORT_CLASSNAME.into(),
            short_classname(classname).to_string(),
        );
    }

    projected.insert(
        fields::MESSAGE_TEXT.into(),
        message_text(record.non_empty_field(fields::MESSAGE), &original),
    );

    let raw_level = record
        .non_empty_field(fields::LOG_LEVEL)
        .or_else(|| record.non_empty_field(fields::LEVEL))
        .unwrap_or_default();
    let level = normalize_level(raw_level);

    let (color, reset) = color_fields(&level, interactive);
    projected.insert(fields::LEVEL_COLOR.into(), color.to_string());
    projected.insert(fields::RESET.into(), reset.to_string());
    projected.insert(fields::LOG_LEVEL.into(), level);

    if !record.streams.is_empty() {
        projected.insert(
            fields::MATCHING_STREAMS.into(),
            stream_titles(&record.streams, streams),
        );
    }

    projected
}

/// `page` with a leading `/`.
pub fn leading_slash(page: &str) -> String {
    if page.is_empty() || page.starts_with('/') {
        page.to_string()
    } else {
        format!("/{}", page)
    }
}

pub fn long_timestamp<Tz>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp
        .with_timezone(tz)
        .format(LONG_TIME_FORMAT)
        .to_string()
}

/// Last segment of a dotted class name.
pub fn short_classname(classname: &str) -> &str {
    classname.rsplit('.').next().unwrap_or(classname)
}

/// The best single text for a message.
///
/// Starts from the short message (or the original when there is none) and
/// moves a `nested exception` clause onto its own line. When a multi-line
/// original exists and the short message was used instead, the original's
/// continuation lines are appended; with three or more lines the last one is
/// left off.
pub fn message_text(short: Option<&str>, original: &str) -> String {
    let base = short.filter(|s| !s.is_empty()).unwrap_or(original);
    let mut text = base.replace(NESTED_EXCEPTION, NESTED_EXCEPTION_ON_NEW_LINE);

    if !original.is_empty() && base != original {
        let lines: Vec<&str> = original.split('\n').collect();
        match lines.len() {
            2 => {
                text.push('\n');
                text.push_str(lines[1]);
            }
            n if n > 2 => {
                text.push('\n');
                text.push_str(&lines[1..n - 1].join("\n"));
            }
            _ => {}
        }
    }
    text
}

/// Uppercase, with `WARNING` spelled `WARN`.
pub fn normalize_level(level: &str) -> String {
    let level = level.to_uppercase();
    if level == "WARNING" {
        "WARN".to_string()
    } else {
        level
    }
}

/// Titles of the matched streams, space separated. Ids that are not in the
/// directory are shown as-is.
pub fn stream_titles(ids: &[String], streams: &StreamDirectory) -> String {
    ids.iter()
        .map(|id| streams.title(id).unwrap_or(id.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}
