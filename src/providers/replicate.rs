use crate::{
    error::{GenError, Result},
    models::{
        GenerationRequest, ProviderResult, ReplicateInput, ReplicatePrediction,
        ReplicatePredictionRequest,
    },
    providers::traits::ImageBackend,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;

pub const REPLICATE_BASE_URL: &str = "https://api.replicate.com";
pub const REPLICATE_MODEL: &str = "black-forest-labs/flux-1.1-pro";

#[derive(Clone)]
pub struct ReplicateBackend {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ReplicateBackend {
    pub fn new(token: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            base_url: base_url.unwrap_or_else(|| REPLICATE_BASE_URL.to_string()),
        }
    }

    async fn open_stream(&self, url: &str) -> Result<ProviderResult> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GenError::FetchError {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(GenError::FetchError {
                url: url.to_string(),
                reason: format!("Failed to fetch image: {}", response.status()),
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| GenError::ResponseError(e.to_string()))
            })
            .boxed();
        Ok(ProviderResult::StreamedBinary(stream))
    }
}

/// Entries may be plain URL strings or objects carrying a `url` field.
/// Entries without a URL are skipped.
fn collect_output_urls(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url.clone()),
            Value::Object(map) => map.get("url").and_then(Value::as_str).map(String::from),
            _ => None,
        })
        .filter(|url| !url.is_empty())
        .collect()
}

#[async_trait]
impl ImageBackend for ReplicateBackend {
    fn model_id(&self) -> &str {
        REPLICATE_MODEL
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<ProviderResult> {
        let payload = ReplicatePredictionRequest {
            input: ReplicateInput {
                prompt: request.prompt().to_string(),
                width: request.width(),
                height: request.height(),
                prompt_upsampling: false,
                safety_checker: false,
                safety_tolerance: 2,
            },
        };

        log::info!("Generating image with model: {}", REPLICATE_MODEL);

        let response = self
            .client
            .post(format!(
                "{}/v1/models/{}/predictions",
                self.base_url, REPLICATE_MODEL
            ))
            .bearer_auth(&self.token)
            .header("Prefer", "wait")
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::RequestError(format!(
                "Replicate returned {}: {}",
                status, body
            )));
        }

        let prediction: ReplicatePrediction = response
            .json()
            .await
            .map_err(|e| GenError::ResponseError(e.to_string()))?;

        if let Some(error) = prediction.error.filter(|e| !e.is_null()) {
            return Err(GenError::ResponseError(format!(
                "Replicate prediction failed ({}): {}",
                prediction.status.as_deref().unwrap_or("unknown"),
                error
            )));
        }

        match prediction.output {
            Some(Value::String(url)) => self.open_stream(&url).await,
            Some(Value::Array(items)) => Ok(ProviderResult::UrlList(collect_output_urls(&items))),
            Some(other) => Err(GenError::unexpected_shape(
                "replicate",
                format!("output was {}", other),
            )),
            None => Err(GenError::unexpected_shape("replicate", "prediction had no output")),
        }
    }
}
