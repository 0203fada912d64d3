use serde::{Deserialize, Serialize};

pub const WEBSITE_ACTION: &str = "CREATE_WEBSITE";

/// Message handed to the caller's progress callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub text: String,
    pub action: String,
    pub source: Option<String>,
    pub attachments: Vec<String>,
}

impl ProgressUpdate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: WEBSITE_ACTION.to_string(),
            source: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    pub title: String,
    pub description: String,
}
