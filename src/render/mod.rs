pub mod colors;
pub mod fields;
pub mod template;

use crate::app::GraytailError;
use crate::config::FormatDefinition;
use crate::domain::{LogRecord, OutputMode};
use crate::streams::StreamDirectory;

use self::fields::Fields;
use self::template::{Template, TemplateError};

/// Turns records into display text.
pub struct Renderer {
    templates: Vec<Template>,
    mode: OutputMode,
    interactive: bool,
}

impl Renderer {
    /// Compile `formats` in order. The fallback format is used when the list
    /// is empty.
    pub fn new(
        formats: &[FormatDefinition],
        mode: OutputMode,
        interactive: bool,
    ) -> Result<Self, TemplateError> {
        let templates = if formats.is_empty() {
            vec![FormatDefinition::fallback().compile()?]
        } else {
            formats
                .iter()
                .map(FormatDefinition::compile)
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            templates,
            mode,
            interactive,
        })
    }

    pub fn render(&self, record: &LogRecord, streams: &StreamDirectory) -> String {
        let projected = fields::project(record, streams, self.interactive);
        self.render_fields(&projected)
    }

    /// Render an already projected record. Never fails: when no template
    /// applies, the fields are shown as JSON.
    pub fn render_fields(&self, projected: &Fields) -> String {
        if self.mode == OutputMode::Json {
            return to_json(projected);
        }

        match self.select(projected) {
            Ok(text) => text,
            Err(e) => {
                let error = GraytailError::Render(e.to_string());
                tracing::warn!("{}, showing raw fields", error);
                to_json(projected)
            }
        }
    }

    /// Output of the first template that renders, or the last template's
    /// error if none does.
    pub fn select(&self, projected: &Fields) -> Result<String, TemplateError> {
        let mut last_error = None;
        for template in &self.templates {
            match template.render(projected) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::trace!("Format {} skipped: {}", template.name(), e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| TemplateError::Syntax {
            template: String::new(),
            message: "no formats".into(),
        }))
    }
}

fn to_json(projected: &Fields) -> String {
    match serde_json::to_string(projected) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Unable to encode message as JSON: {}", e);
            format!("{:?}", projected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StreamDescriptor;
    use chrono::{TimeZone, Utc};

    fn record() -> LogRecord {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 22, 33).unwrap();
        LogRecord::new("id-1", ts)
            .with_field("message", "Order placed")
            .with_field("loglevel", "info")
            .with_streams(["s1"])
    }

    fn streams() -> StreamDirectory {
        StreamDirectory::from_streams(vec![StreamDescriptor::new("s1", "Production")])
    }

    fn formats(defs: &[(&str, &str)]) -> Vec<FormatDefinition> {
        let mut formats: Vec<FormatDefinition> = defs
            .iter()
            .map(|(name, template)| FormatDefinition::new(*name, *template))
            .collect();
        formats.push(FormatDefinition::fallback());
        formats
    }

    #[test]
    fn test_first_matching_template_wins() {
        let renderer = Renderer::new(
            &formats(&[
                ("web", "{{.request_page}} {{._message_text}}"),
                ("basic", "{{.loglevel}} {{._message_text}} ({{._matching_streams}})"),
                ("never", "{{._message_text}}"),
            ]),
            OutputMode::Formatted,
            false,
        )
        .unwrap();

        assert_eq!(
            renderer.render(&record(), &streams()),
            "INFO Order placed (Production)"
        );
    }

    #[test]
    fn test_fallback_format_always_applies() {
        let renderer = Renderer::new(
            &formats(&[("web", "{{.request_page}}")]),
            OutputMode::Formatted,
            false,
        )
        .unwrap();

        let bare = LogRecord::new("x", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .with_field("message", "hello");
        assert_eq!(
            renderer.render(&bare, &streams()),
            "No Formats Defined>> hello"
        );
    }

    #[test]
    fn test_empty_format_list_uses_fallback() {
        let renderer = Renderer::new(&[], OutputMode::Formatted, false).unwrap();
        assert_eq!(
            renderer.render(&record(), &streams()),
            "No Formats Defined>> Order placed"
        );
    }

    #[test]
    fn test_json_fallback_when_nothing_renders() {
        let renderer = Renderer::new(
            &[FormatDefinition::new("only", "{{.request_page}}")],
            OutputMode::Formatted,
            false,
        )
        .unwrap();

        let text = renderer.render(&record(), &streams());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["_message_text"], "Order placed");
    }

    #[test]
    fn test_json_mode_bypasses_templates() {
        let renderer = Renderer::new(&formats(&[]), OutputMode::Json, false).unwrap();

        let text = renderer.render(&record(), &streams());
        assert!(!text.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["loglevel"], "INFO");
        assert_eq!(value["_matching_streams"], "Production");
        assert_eq!(value["_level_color"], "");
        assert_eq!(value["message"], "Order placed");
    }

    #[test]
    fn test_select_reports_last_error() {
        let renderer = Renderer::new(
            &[FormatDefinition::new("a", "{{.nope}}")],
            OutputMode::Formatted,
            false,
        )
        .unwrap();
        let err = renderer.select(&Fields::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingField { .. }));
    }

    #[test]
    fn test_invalid_template_rejected() {
        let result = Renderer::new(
            &[FormatDefinition::new("bad", "{{.message")],
            OutputMode::Formatted,
            false,
        );
        assert!(result.is_err());
    }
}
