use serde::{Deserialize, Serialize};

/// A Graylog stream as returned by the `streams` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl StreamDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            disabled: false,
        }
    }

    /// Title, followed by the description when it adds anything.
    pub fn display_line(&self) -> String {
        match self.description.as_deref() {
            Some(description) if !description.is_empty() && description != self.title => {
                format!("{} - {}", self.title, description)
            }
            _ => self.title.clone(),
        }
    }
}
