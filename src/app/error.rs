use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum GraytailError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error("Unable to connect to Graylog: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unable to read content from Graylog: {0}")]
    Transport(String),

    #[error("Unexpected response from Graylog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid message: {0}")]
    Parse(String),

    #[error("Unable to render message: {0}")]
    Render(String),

    #[error("Invalid stream name(s): {0}")]
    Resolution(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraytailError {
    /// Whether the failure must end the process rather than a single record.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GraytailError::Parse(_) | GraytailError::Render(_))
    }
}

pub type Result<T> = std::result::Result<T, GraytailError>;
