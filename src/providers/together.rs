use crate::{
    error::{GenError, Result},
    models::{GenerationRequest, ProviderResult, TogetherImageResponse},
    providers::traits::ImageBackend,
};
use async_trait::async_trait;
use serde_json::json;

pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz";
pub const TOGETHER_MODEL: &str = "black-forest-labs/FLUX.1-dev";
const TOGETHER_STEPS: u32 = 10;

#[derive(Clone)]
pub struct TogetherBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TogetherBackend {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.unwrap_or_else(|| TOGETHER_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl ImageBackend for TogetherBackend {
    fn model_id(&self) -> &str {
        TOGETHER_MODEL
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<ProviderResult> {
        let payload = json!({
            "model": TOGETHER_MODEL,
            "prompt": request.prompt(),
            "width": request.width(),
            "height": request.height(),
            "steps": TOGETHER_STEPS,
            "n": request.count(),
        });

        log::info!("Generating image with model: {}", TOGETHER_MODEL);

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
                "Together returned {}: {}",
                status, body
            )));
        }

        let parsed: TogetherImageResponse = response
            .json()
            .await
            .map_err(|e| GenError::ResponseError(e.to_string()))?;

        let urls = parsed
            .data
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                item.url.ok_or_else(|| {
                    GenError::unexpected_shape("together", format!("result {} has no url", index))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProviderResult::UrlList(urls))
    }
}
