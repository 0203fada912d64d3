use crate::{
    error::{GenError, Result},
    models::{GenerationRequest, OpenAiImageResponse, ProviderResult},
    providers::traits::ImageBackend,
};
use async_trait::async_trait;
use serde_json::json;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DALLE_MODEL: &str = "dall-e-3";

/// Expects the adapter to have snapped the request to a supported size.
#[derive(Clone)]
pub struct DalleBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DalleBackend {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl ImageBackend for DalleBackend {
    fn model_id(&self) -> &str {
        DALLE_MODEL
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<ProviderResult> {
        let payload = json!({
            "model": DALLE_MODEL,
            "prompt": request.prompt(),
            "size": format!("{}x{}", request.width(), request.height()),
            "n": request.count(),
            "response_format": "b64_json",
        });

        log::info!("Generating image with model: {}", DALLE_MODEL);

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::RequestError(format!(
                "OpenAI returned {}: {}",
                status, body
            )));
        }

        let parsed: OpenAiImageResponse = response
            .json()
            .await
            .map_err(|e| GenError::ResponseError(e.to_string()))?;

        let payloads = parsed
            .data
            .into_iter()
            .map(|image| {
                image
                    .b64_json
                    .ok_or_else(|| GenError::unexpected_shape("dall-e", "image without b64_json"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProviderResult::InlineBase64(payloads))
    }
}
