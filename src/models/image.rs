use crate::error::{GenError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;

/// A validated image-generation request. Fields are private so a request
/// can only be built through [`GenerationRequest::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    prompt: String,
    width: u32,
    height: u32,
    count: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(GenError::InvalidRequest("prompt must not be empty".into()));
        }
        if width == 0 || height == 0 {
            return Err(GenError::InvalidRequest(format!(
                "image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            prompt,
            width,
            height,
            count: 1,
        })
    }

    pub fn with_count(mut self, count: u32) -> Result<Self> {
        if count == 0 {
            return Err(GenError::InvalidRequest("count must be positive".into()));
        }
        self.count = count;
        Ok(self)
    }

    /// Same dimensions and count, different prompt.
    pub fn with_prompt(&self, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..self.clone()
        }
    }

    pub(crate) fn with_size(&self, size: ImageSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            ..self.clone()
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Sizes accepted by DALL-E 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const SQUARE: ImageSize = ImageSize {
        width: 1024,
        height: 1024,
    };
    pub const LANDSCAPE: ImageSize = ImageSize {
        width: 1792,
        height: 1024,
    };
    pub const PORTRAIT: ImageSize = ImageSize {
        width: 1024,
        height: 1792,
    };

    /// Exact matches pass through; anything else becomes 1024x1024.
    pub fn snap(width: u32, height: u32) -> ImageSize {
        let requested = ImageSize { width, height };
        if [Self::SQUARE, Self::LANDSCAPE, Self::PORTRAIT].contains(&requested) {
            requested
        } else {
            Self::SQUARE
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// The three shapes a provider may answer with.
pub enum ProviderResult {
    StreamedBinary(ByteStream),
    UrlList(Vec<String>),
    InlineBase64(Vec<String>),
}

impl ProviderResult {
    pub fn shape(&self) -> &'static str {
        match self {
            ProviderResult::StreamedBinary(_) => "streamed binary",
            ProviderResult::UrlList(_) => "url list",
            ProviderResult::InlineBase64(_) => "inline base64",
        }
    }
}

impl fmt::Debug for ProviderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderResult::StreamedBinary(_) => f.write_str("StreamedBinary(..)"),
            ProviderResult::UrlList(urls) => f.debug_tuple("UrlList").field(urls).finish(),
            ProviderResult::InlineBase64(payloads) => f
                .debug_tuple("InlineBase64")
                .field(&format!("{} payloads", payloads.len()))
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    pub fn data_uri(&self, base64_payload: &str) -> String {
        format!("data:{};base64,{}", self.media_type(), base64_payload)
    }

    pub fn encode(&self, bytes: &[u8]) -> String {
        self.data_uri(&STANDARD.encode(bytes))
    }
}

/// Ordered, never-empty list of data URIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBatch(Vec<String>);

impl ImageBatch {
    pub fn new(data_uris: Vec<String>) -> Result<Self> {
        if data_uris.is_empty() {
            return Err(GenError::ResponseError("No images generated".into()));
        }
        Ok(Self(data_uris))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Result of one adapter call. Success always carries a non-empty batch.
#[derive(Debug)]
pub enum GenerationOutcome {
    Success(ImageBatch),
    Failure(GenError),
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    pub fn images(&self) -> Option<&ImageBatch> {
        match self {
            GenerationOutcome::Success(batch) => Some(batch),
            GenerationOutcome::Failure(_) => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&GenError> {
        match self {
            GenerationOutcome::Success(_) => None,
            GenerationOutcome::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<ImageBatch> {
        match self {
            GenerationOutcome::Success(batch) => Ok(batch),
            GenerationOutcome::Failure(err) => Err(err),
        }
    }
}

impl From<Result<ImageBatch>> for GenerationOutcome {
    fn from(result: Result<ImageBatch>) -> Self {
        match result {
            Ok(batch) => GenerationOutcome::Success(batch),
            Err(err) => GenerationOutcome::Failure(err),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplicatePredictionRequest {
    pub input: ReplicateInput,
}

#[derive(Debug, Serialize)]
pub struct ReplicateInput {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub prompt_upsampling: bool,
    pub safety_checker: bool,
    pub safety_tolerance: u8,
}

#[derive(Debug, Deserialize)]
pub struct ReplicatePrediction {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct TogetherImageResponse {
    pub data: Vec<UrlImageData>,
}

#[derive(Debug, Deserialize)]
pub struct UrlImageData {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiImageResponse {
    pub data: Vec<Base64ImageData>,
}

#[derive(Debug, Deserialize)]
pub struct Base64ImageData {
    pub b64_json: Option<String>,
}
