//! Configuration management for graytail.
//!
//! Configuration is read from `~/.config/graytail/config.toml` unless a path
//! is given on the command line. If the default file doesn't exist, a
//! commented template is written there so the server URI can be filled in.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::render::template::{Template, TemplateError};

pub const DEFAULT_FORMAT_NAME: &str = "_default";
pub const DEFAULT_FORMAT_TEMPLATE: &str = "No Formats Defined>> {{._message_text}}";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub formats: Vec<FormatDefinition>,
}

/// Where the Graylog API lives and how to talk to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URI of the REST API, e.g. `https://graylog.example.com/api`
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Skip TLS certificate verification (default: false)
    pub ignore_cert: bool,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            username: None,
            password: None,
            ignore_cert: false,
            timeout_secs: 30,
        }
    }
}

/// A named display template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatDefinition {
    pub name: String,
    pub template: String,
}

impl FormatDefinition {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
        }
    }

    /// The catch-all format. It only uses `_message_text`, which every
    /// rendered message has.
    pub fn fallback() -> Self {
        Self::new(DEFAULT_FORMAT_NAME, DEFAULT_FORMAT_TEMPLATE)
    }

    pub fn compile(&self) -> Result<Template, TemplateError> {
        Template::parse(&self.name, &self.template)
    }
}

impl Config {
    /// Load configuration from `path`, or from the default path.
    ///
    /// A missing default file is created from the template and reported as
    /// [`ConfigError::Created`]; a missing explicit path is an I/O error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Err(ConfigError::Created { path: default_path });
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::parse(&content, &config_path)
    }

    /// Parse and validate configuration text read from `path`.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        if config.server.uri.trim().is_empty() {
            return Err(ConfigError::MissingUri {
                path: path.to_path_buf(),
            });
        }

        for format in &config.formats {
            format.compile()?;
        }

        Ok(config)
    }

    /// Configured formats in file order, followed by the fallback format.
    pub fn formats(&self) -> Vec<FormatDefinition> {
        let mut formats = self.formats.clone();
        formats.push(FormatDefinition::fallback());
        formats
    }

    /// Get the default config file path: `~/.config/graytail/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("graytail").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# graytail configuration
#
# [server] tells graytail where the Graylog REST API lives.
# [[formats]] are tried in order for every message; the first one whose
# fields are all present is used. Besides the message's own fields these
# are always available:
#
#   _message_text     message plus stack trace detail
#   _long_timestamp   local time with milliseconds
#   _level_color      ANSI colour for the level (empty without a terminal)
#   _reset            ANSI reset (empty without a terminal)
#   loglevel          level, uppercased
#
# and, when the message has them:
#
#   _short_classname   last segment of classname
#   _matching_streams  titles of the streams the message matched
#
# Templates use Go template syntax: {{.field}}, {{ToUpper .field}},
# {{.field | ToLower}}.

[server]
uri = ""
# username = ""
# password = ""
ignore_cert = false
timeout_secs = 30

[[formats]]
name = "java"
template = "{{._long_timestamp}} {{._level_color}}{{.loglevel}}{{._reset}} [{{._short_classname}}] {{._message_text}}"

[[formats]]
name = "plain"
template = "{{._long_timestamp}} {{.source}} {{._message_text}}"
"##
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("No server uri set in {path}")]
    MissingUri { path: PathBuf },

    #[error("Created a default config file at {path}; set the server uri and run again")]
    Created { path: PathBuf },

    #[error("Invalid format: {0}")]
    InvalidFormat(#[from] TemplateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r##"
[server]
uri = "https://graylog.example.com/api"
username = "reader"
password = "secret"
ignore_cert = true

[[formats]]
name = "web"
template = "{{.request_page}} {{._message_text}}"

[[formats]]
name = "java"
template = "{{._short_classname}}: {{._message_text}}"
"##;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(content).expect("Default config should be valid TOML");

        assert_eq!(config.formats.len(), 2);
        assert_eq!(config.formats[0].name, "java");
        assert!(config.formats.iter().all(|f| f.compile().is_ok()));
    }

    #[test]
    fn test_default_config_needs_uri() {
        let err = Config::parse(Config::default_config_content(), Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingUri { .. }));
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(FULL, Path::new("c.toml")).unwrap();

        assert_eq!(config.server.uri, "https://graylog.example.com/api");
        assert_eq!(config.server.username.as_deref(), Some("reader"));
        assert!(config.server.ignore_cert);
        assert_eq!(config.server.timeout_secs, 30);

        let names: Vec<String> = config.formats().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["web", "java", DEFAULT_FORMAT_NAME]);
    }

    #[test]
    fn test_fallback_appended_without_formats() {
        let config = Config::parse("[server]\nuri = \"http://localhost:9000/api\"\n", Path::new("c.toml"))
            .unwrap();
        assert_eq!(config.formats(), vec![FormatDefinition::fallback()]);
    }

    #[test]
    fn test_bad_template_is_config_error() {
        let content = r##"
[server]
uri = "http://localhost:9000/api"

[[formats]]
name = "broken"
template = "{{.message"
"##;
        let err = Config::parse(content, Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::parse("[server\nuri=", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graytail.toml");
        fs::write(&path, FULL).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.formats.len(), 2);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_create_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        Config::create_default_config(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, Config::default_config_content());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/etc/graytail.toml"), PathBuf::from("/etc/graytail.toml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/.graylog"), home.join(".graylog"));
        }
    }
}
