//! Display templates.
//!
//! The syntax is the small subset of Go's `text/template` that format
//! definitions use: `{{.field}}`, the `ToUpper` / `ToLower` functions either
//! called (`{{ToUpper .field}}`) or piped (`{{.field | ToLower}}`),
//! `{{/* comments */}}`, and `{{-` / `-}}` whitespace trimming. A field
//! missing from the record is an error, which is what lets a chain of
//! templates fall through to the next one.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template {template}: {message}")]
    Syntax { template: String, message: String },

    #[error("template {template}: no field {field:?}")]
    MissingField { template: String, field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    ToUpper,
    ToLower,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "ToUpper" => Some(Function::ToUpper),
            "ToLower" => Some(Function::ToLower),
            _ => None,
        }
    }

    fn apply(self, value: &str) -> String {
        match self {
            Function::ToUpper => value.to_uppercase(),
            Function::ToLower => value.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Field { name: String, functions: Vec<Function> },
}

#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let syntax = |message: String| TemplateError::Syntax {
            template: name.to_string(),
            message,
        };

        let mut nodes = Vec::new();
        let mut rest = source;
        let mut trim_next = false;

        while let Some(open) = rest.find("{{") {
            let mut text = &rest[..open];
            if trim_next {
                text = text.trim_start();
            }
            let after = &rest[open + 2..];
            let close = after
                .find("}}")
                .ok_or_else(|| syntax("unclosed action".to_string()))?;
            let mut inner = &after[..close];
            rest = &after[close + 2..];

            if let Some(stripped) = inner.strip_prefix("- ") {
                text = text.trim_end();
                inner = stripped;
            }
            trim_next = false;
            if let Some(stripped) = inner.strip_suffix(" -") {
                trim_next = true;
                inner = stripped;
            }

            if !text.is_empty() {
                nodes.push(Node::Text(text.to_string()));
            }

            let inner = inner.trim();
            if inner.starts_with("/*") && inner.ends_with("*/") {
                continue;
            }
            nodes.push(parse_action(inner).map_err(syntax)?);
        }

        let tail = if trim_next { rest.trim_start() } else { rest };
        if !tail.is_empty() {
            nodes.push(Node::Text(tail.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, fields: &BTreeMap<String, String>) -> Result<String, TemplateError> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Field { name, functions } => {
                    let value = fields.get(name).ok_or_else(|| TemplateError::MissingField {
                        template: self.name.clone(),
                        field: name.clone(),
                    })?;
                    let value = functions
                        .iter()
                        .fold(value.clone(), |acc, f| f.apply(&acc));
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }
}

fn parse_action(action: &str) -> Result<Node, String> {
    let mut commands = action.split('|').map(str::trim);

    let first: Vec<&str> = commands
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .collect();

    let (name, mut functions) = match first.as_slice() {
        [field] => (field_name(field)?, Vec::new()),
        [function, field] => (field_name(field)?, vec![function_named(function)?]),
        [] => return Err("missing value for command".to_string()),
        _ => return Err(format!("unsupported action {:?}", action)),
    };

    for command in commands {
        match command.split_whitespace().collect::<Vec<_>>().as_slice() {
            [function] => functions.push(function_named(function)?),
            _ => return Err(format!("unsupported pipeline stage {:?}", command)),
        }
    }

    Ok(Node::Field { name, functions })
}

fn field_name(token: &str) -> Result<String, String> {
    match token.strip_prefix('.') {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(format!("expected a field like .message, found {:?}", token)),
    }
}

fn function_named(name: &str) -> Result<Function, String> {
    Function::lookup(name).ok_or_else(|| format!("function {:?} not defined", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_fields() {
        let template = Template::parse("t", "[{{.loglevel}}] {{ .message }}!").unwrap();
        let out = template
            .render(&fields(&[("loglevel", "INFO"), ("message", "hi")]))
            .unwrap();
        assert_eq!(out, "[INFO] hi!");
    }

    #[test]
    fn test_missing_field_is_error() {
        let template = Template::parse("t", "{{.source}}: {{.message}}").unwrap();
        let err = template.render(&fields(&[("message", "hi")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingField {
                template: "t".into(),
                field: "source".into()
            }
        );
    }

    #[test]
    fn test_empty_value_is_not_missing() {
        let template = Template::parse("t", "<{{.source}}>").unwrap();
        assert_eq!(template.render(&fields(&[("source", "")])).unwrap(), "<>");
    }

    #[test]
    fn test_functions() {
        let values = fields(&[("app", "Mailer")]);
        let call = Template::parse("t", "{{ToUpper .app}}").unwrap();
        let pipe = Template::parse("t", "{{.app | ToLower}}").unwrap();
        let chain = Template::parse("t", "{{ToLower .app | ToUpper}}").unwrap();

        assert_eq!(call.render(&values).unwrap(), "MAILER");
        assert_eq!(pipe.render(&values).unwrap(), "mailer");
        assert_eq!(chain.render(&values).unwrap(), "MAILER");
    }

    #[test]
    fn test_trim_markers_and_comments() {
        let template = Template::parse("t", "a  {{- .x -}}  b{{/* note */}}c").unwrap();
        assert_eq!(template.render(&fields(&[("x", "X")])).unwrap(), "aXbc");
    }

    #[test]
    fn test_plain_text() {
        let template = Template::parse("t", "no actions").unwrap();
        assert_eq!(template.render(&BTreeMap::new()).unwrap(), "no actions");
    }

    #[test]
    fn test_syntax_errors() {
        for source in [
            "{{.message",
            "{{}}",
            "{{.}}",
            "{{message}}",
            "{{Reverse .message}}",
            "{{.message | Reverse}}",
            "{{.a .b .c}}",
        ] {
            let result = Template::parse("t", source);
            assert!(
                matches!(result, Err(TemplateError::Syntax { .. })),
                "{} should not parse",
                source
            );
        }
    }
}
