use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Game,
    #[default]
    Website,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Game => f.write_str("game"),
            ContentType::Website => f.write_str("website"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrList {
    Text(String),
    List(Vec<String>),
}

fn text_or_list<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrList::deserialize(deserializer)? {
        TextOrList::Text(text) => text,
        TextOrList::List(items) => items.join("\n"),
    })
}

/// Structured website plan returned by the model. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteBrief {
    #[serde(deserialize_with = "text_or_list")]
    pub description: String,
    #[serde(deserialize_with = "text_or_list")]
    pub pages: String,
    #[serde(deserialize_with = "text_or_list")]
    pub features: String,
    #[serde(deserialize_with = "text_or_list")]
    pub url: String,
    #[serde(deserialize_with = "text_or_list")]
    pub dependencies: String,
    #[serde(rename = "pageDescriptions", deserialize_with = "text_or_list")]
    pub page_descriptions: String,
}

impl WebsiteBrief {
    /// Flattened text form used as input to content generation.
    pub fn to_prompt(&self) -> String {
        format!(
            "Description: {}\nPages: {}\nFeatures: {}\nURL: {}\nFrontend dependencies: {}\nPage descriptions: {}",
            self.description,
            self.pages,
            self.features,
            self.url,
            self.dependencies,
            self.page_descriptions
        )
    }
}

/// Persona the brief is written in the voice of.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    #[serde(default)]
    pub bio: Vec<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub style: Vec<String>,
}

impl CharacterProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Idle,
    Enhancing,
    Classifying,
    GeneratingContent,
    Sanitizing,
    Deploying,
    Done,
    TimedOut,
    Failed,
}

/// State of one pipeline invocation. Lives only for the duration of the call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineRun {
    pub id: String,
    pub raw_prompt: String,
    pub enhanced_prompt: Option<String>,
    pub classification: Option<ContentType>,
    pub generated_html: Option<String>,
    pub sanitized_html: Option<String>,
    pub deployment_url: Option<String>,
}

impl PipelineRun {
    pub fn new(raw_prompt: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            raw_prompt: raw_prompt.into(),
            ..Self::default()
        }
    }
}

pub const HOME_PAGE: &str = "home";

/// Pages to deploy keyed by slug.
pub type PageSet = BTreeMap<String, String>;

#[derive(Clone)]
pub struct DeployCredentials {
    pub token: String,
    pub account: String,
}

impl fmt::Debug for DeployCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployCredentials")
            .field("token", &"***")
            .field("account", &self.account)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brief_accepts_lists() {
        let raw = r#"{
            "description": "A fan site",
            "pages": ["home", "about"],
            "features": "gallery",
            "url": "foxes.example",
            "dependencies": ["tailwind"],
            "pageDescriptions": "home: hero"
        }"#;
        let brief: WebsiteBrief = serde_json::from_str(raw).unwrap();
        assert_eq!(brief.pages, "home\nabout");
        assert_eq!(brief.page_descriptions, "home: hero");
        assert!(brief.to_prompt().contains("Frontend dependencies: tailwind"));
    }

    #[test]
    fn test_brief_rejects_missing_field() {
        let raw = r#"{"description": "A fan site", "pages": "home"}"#;
        assert!(serde_json::from_str::<WebsiteBrief>(raw).is_err());
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = DeployCredentials {
            token: "ghp_secret".into(),
            account: "octo".into(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("ghp_secret"));
        assert!(shown.contains("octo"));
    }
}
