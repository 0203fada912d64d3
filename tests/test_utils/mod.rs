//! Shared mocks for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use genpipe::{
    models::{DeployCredentials, PageSet},
    Deployer, GenError, GenerationRequest, ImageBackend, ModelAccess, ModelClass,
    ProgressCallback, ProgressUpdate, ProviderResult, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

type ResultFactory = Box<dyn Fn() -> Result<ProviderResult> + Send + Sync>;

/// Backend that records every request and answers from a factory.
pub struct ScriptedBackend {
    factory: ResultFactory,
    pub seen: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new(factory: impl Fn() -> Result<ProviderResult> + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageBackend for ScriptedBackend {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<ProviderResult> {
        self.seen.lock().unwrap().push(request.clone());
        (self.factory)()
    }
}

/// Text model answering by which template it was handed.
pub struct ScriptedModel {
    pub brief: String,
    pub classification: String,
    pub html: String,
    pub fail_all: bool,
    pub contexts: Mutex<Vec<String>>,
}

pub const VALID_BRIEF: &str = r#"```json
{
  "description": "A fan page about red foxes",
  "pages": "home",
  "features": ["photo gallery", "fact cards"],
  "url": "red-foxes.example",
  "dependencies": "none",
  "pageDescriptions": "home: hero image and facts"
}
```"#;

impl ScriptedModel {
    pub fn website() -> Self {
        Self {
            brief: VALID_BRIEF.to_string(),
            classification: "WEBSITE".to_string(),
            html: "```html\n<!DOCTYPE html><html><body>Fox\u{0}es\u{2028}<a href=\"about.html\">About</a></body></html>\n```"
                .to_string(),
            fail_all: false,
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_classification(mut self, reply: &str) -> Self {
        self.classification = reply.to_string();
        self
    }

    pub fn with_brief(mut self, reply: &str) -> Self {
        self.brief = reply.to_string();
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::website()
        }
    }

    pub fn contexts(&self) -> Vec<String> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelAccess for ScriptedModel {
    async fn generate(&self, context: &str, _model_class: ModelClass) -> Result<String> {
        self.contexts.lock().unwrap().push(context.to_string());
        if self.fail_all {
            return Err(GenError::ModelError("model offline".into()));
        }
        if context.contains("determine if it's requesting a game or a website") {
            Ok(self.classification.clone())
        } else if context.contains("<format>") {
            Ok(self.brief.clone())
        } else if context.contains("Generate the complete home page") {
            Ok(self.html.clone())
        } else {
            Ok("an enhanced prompt".to_string())
        }
    }
}

/// Deployer that takes `delay` and counts finished deployments.
pub struct SlowDeployer {
    pub delay: Duration,
    pub started: AtomicUsize,
    pub completed: AtomicUsize,
    pub pages: Mutex<Vec<PageSet>>,
    pub fail: bool,
}

impl SlowDeployer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            pages: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Duration::from_secs(1))
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Deployer for SlowDeployer {
    async fn deploy(
        &self,
        pages: &PageSet,
        credentials: &DeployCredentials,
        _cancel: &CancellationToken,
    ) -> Result<String> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.pages.lock().unwrap().push(pages.clone());
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(GenError::DeployError("repository quota exceeded".into()));
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://{}.github.io/generated-website-1/",
            credentials.account
        ))
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub updates: Mutex<Vec<ProgressUpdate>>,
}

impl RecordingProgress {
    pub fn texts(&self) -> Vec<String> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.text.clone())
            .collect()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_progress(&self, update: ProgressUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

pub fn decode_data_uri(uri: &str) -> (String, Vec<u8>) {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    let rest = uri.strip_prefix("data:").expect("data uri");
    let (media_type, payload) = rest.split_once(";base64,").expect("base64 data uri");
    (media_type.to_string(), STANDARD.decode(payload).expect("valid base64"))
}
