use crate::{
    config::{TextModelConfig, TextProvider},
    error::{GenError, Result},
    models::{AnthropicMessageResponse, ModelClass, OpenAiChatResponse, TextGenerationRequest},
    providers::traits::ModelAccess,
};
use async_trait::async_trait;
use serde_json::json;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct TextClient {
    client: reqwest::Client,
    provider: TextProvider,
    api_key: String,
    base_url: String,
    system_prompt: Option<String>,
}

impl TextClient {
    pub fn new(config: &TextModelConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            GenError::ConfigError("No text model API key configured".into())
        })?;
        let base_url = config.base_url.clone().unwrap_or_else(|| match config.provider {
            TextProvider::OpenAi => OPENAI_BASE_URL.to_string(),
            TextProvider::Anthropic => ANTHROPIC_BASE_URL.to_string(),
        });

        Ok(Self {
            client: reqwest::Client::new(),
            provider: config.provider,
            api_key,
            base_url,
            system_prompt: config.system_prompt.clone(),
        })
    }

    pub fn model_for(&self, model_class: ModelClass) -> &'static str {
        match (self.provider, model_class) {
            (TextProvider::OpenAi, ModelClass::Small) => "gpt-4o-mini",
            (TextProvider::OpenAi, ModelClass::Medium | ModelClass::Large) => "gpt-4o",
            (TextProvider::Anthropic, ModelClass::Small) => "claude-3-haiku-20240307",
            (TextProvider::Anthropic, ModelClass::Medium | ModelClass::Large) => {
                "claude-3-5-sonnet-20241022"
            }
        }
    }

    fn default_max_tokens(model_class: ModelClass) -> i32 {
        match model_class {
            ModelClass::Small => 1024,
            ModelClass::Medium => 4096,
            ModelClass::Large => 8192,
        }
    }

    pub async fn complete(&self, request: TextGenerationRequest) -> Result<String> {
        let model_id = self.model_for(request.model_class);
        let max_tokens = request
            .max_tokens
            .unwrap_or_else(|| Self::default_max_tokens(request.model_class));
        let temperature = request.temperature.unwrap_or(0.7);

        let builder = match self.provider {
            TextProvider::OpenAi => {
                let mut messages = Vec::new();
                if let Some(system) = &self.system_prompt {
                    messages.push(json!({"role": "system", "content": system}));
                }
                messages.push(json!({"role": "user", "content": request.context}));
                let payload = json!({
                    "model": model_id,
                    "messages": messages,
                    "max_tokens": max_tokens,
                    "temperature": temperature,
                });
                log::debug!("Text generation request payload: {}", payload);
                self.client
                    .post(format!("{}/v1/chat/completions", self.base_url))
                    .bearer_auth(&self.api_key)
                    .json(&payload)
            }
            TextProvider::Anthropic => {
                let mut payload = json!({
                    "model": model_id,
                    "messages": [
                        {
                            "role": "user",
                            "content": request.context
                        }
                    ],
                    "max_tokens": max_tokens,
                    "temperature": temperature,
                });
                if let (Some(system), Some(obj)) = (&self.system_prompt, payload.as_object_mut()) {
                    obj.insert("system".to_string(), json!(system));
                }
                log::debug!("Text generation request payload: {}", payload);
                self.client
                    .post(format!("{}/v1/messages", self.base_url))
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&payload)
            }
        };

        log::info!("Invoking model: {}", model_id);

        let response = builder.send().await.map_err(|e| {
            log::error!("Text generation transport error: {:?}", e);
            GenError::ModelError(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::ModelError(format!(
                "{} returned {}: {}",
                model_id, status, body
            )));
        }

        match self.provider {
            TextProvider::OpenAi => {
                let parsed: OpenAiChatResponse = response
                    .json()
                    .await
                    .map_err(|e| GenError::ResponseError(e.to_string()))?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| GenError::ResponseError("No completion returned".into()))
            }
            TextProvider::Anthropic => {
                let parsed: AnthropicMessageResponse = response
                    .json()
                    .await
                    .map_err(|e| GenError::ResponseError(e.to_string()))?;
                let text: String = parsed
                    .content
                    .into_iter()
                    .filter(|block| block.block_type == "text")
                    .filter_map(|block| block.text)
                    .collect();
                Ok(text)
            }
        }
    }
}

#[async_trait]
impl ModelAccess for TextClient {
    async fn generate(&self, context: &str, model_class: ModelClass) -> Result<String> {
        self.complete(TextGenerationRequest {
            context: context.to_string(),
            model_class,
            max_tokens: None,
            temperature: None,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_openai_completion() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "GAME"}, "finish_reason": "stop"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let config = TextModelConfig::new()
            .with_provider(TextProvider::OpenAi, "sk-test")
            .with_base_url(mock_server.uri());
        let client = TextClient::new(&config).unwrap();

        let text = client.generate("classify", ModelClass::Medium).await.unwrap();
        assert_eq!(text, "GAME");
    }

    #[tokio::test]
    async fn test_anthropic_completion_joins_text_blocks() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "ak-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "text", "text": "<html>"},
                    {"type": "text", "text": "</html>"}
                ],
                "stop_reason": "end_turn"
            })))
            .mount(&mock_server)
            .await;

        let config = TextModelConfig::new()
            .with_provider(TextProvider::Anthropic, "ak-test")
            .with_base_url(mock_server.uri());
        let client = TextClient::new(&config).unwrap();

        let text = client.generate("page", ModelClass::Large).await.unwrap();
        assert_eq!(text, "<html></html>");
    }

    #[tokio::test]
    async fn test_error_status_is_model_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&mock_server)
            .await;

        let config = TextModelConfig::new()
            .with_provider(TextProvider::OpenAi, "sk-test")
            .with_base_url(mock_server.uri());
        let client = TextClient::new(&config).unwrap();

        let err = client.generate("x", ModelClass::Small).await.unwrap_err();
        assert!(matches!(err, GenError::ModelError(_)));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        assert!(matches!(
            TextClient::new(&TextModelConfig::new()),
            Err(GenError::ConfigError(_))
        ));
    }
}
