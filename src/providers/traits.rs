use crate::{
    error::Result,
    models::{Caption, GenerationRequest, ModelClass, ProviderResult},
};
use async_trait::async_trait;

/// One image-generation provider. Implementations only produce the raw
/// response shape; normalization happens in [`super::ProviderAdapter`].
#[async_trait]
pub trait ImageBackend: Send + Sync {
    fn model_id(&self) -> &str;

    async fn invoke(&self, request: &GenerationRequest) -> Result<ProviderResult>;
}

/// Text model used for prompt enhancement, classification and content generation.
#[async_trait]
pub trait ModelAccess: Send + Sync {
    async fn generate(&self, context: &str, model_class: ModelClass) -> Result<String>;
}

#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe_image(&self, image_url: &str) -> Result<Caption>;
}
