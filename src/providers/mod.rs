pub mod dalle;
pub mod fetch;
pub mod normalize;
pub mod replicate;
pub mod text_client;
pub mod together;
pub mod traits;

use crate::{
    config::{ImageProviderConfig, ProviderKind},
    error::{GenError, Result},
    models::{GenerationOutcome, GenerationRequest, ImageBatch, ImageSize},
};
use std::sync::Arc;

pub use dalle::DalleBackend;
pub use fetch::ImageFetcher;
pub use replicate::ReplicateBackend;
pub use text_client::TextClient;
pub use together::TogetherBackend;
pub use traits::{ImageBackend, ImageDescriber, ModelAccess};

/// Routes image requests to the provider chosen by configured credentials
/// and collapses its response into an [`ImageBatch`].
#[derive(Clone)]
pub struct ProviderAdapter {
    kind: ProviderKind,
    backend: Arc<dyn ImageBackend>,
    fetcher: ImageFetcher,
}

impl ProviderAdapter {
    pub fn from_config(config: &ImageProviderConfig) -> Result<Self> {
        let kind = config.selected_provider().ok_or_else(|| {
            GenError::ConfigError(
                "No image provider credential configured (REPLICATE_API_TOKEN, TOGETHER_API_KEY or OPENAI_API_KEY)"
                    .into(),
            )
        })?;

        let backend: Arc<dyn ImageBackend> = match kind {
            ProviderKind::Replicate => Arc::new(ReplicateBackend::new(
                config.replicate_api_token.clone().unwrap_or_default(),
                config.replicate_base_url.clone(),
            )),
            ProviderKind::Together => Arc::new(TogetherBackend::new(
                config.together_api_key.clone().unwrap_or_default(),
                config.together_base_url.clone(),
            )),
            ProviderKind::Dalle => Arc::new(DalleBackend::new(
                config.openai_api_key.clone().unwrap_or_default(),
                config.openai_base_url.clone(),
            )),
        };

        log::info!("Image provider selected: {}", kind.as_str());
        Ok(Self::with_backend(kind, backend, ImageFetcher::new()))
    }

    pub fn with_backend(
        kind: ProviderKind,
        backend: Arc<dyn ImageBackend>,
        fetcher: ImageFetcher,
    ) -> Self {
        Self {
            kind,
            backend,
            fetcher,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// The request as the provider will receive it. Only DALL-E rewrites it,
    /// snapping the size to one it supports.
    pub fn effective_request(&self, request: &GenerationRequest) -> GenerationRequest {
        match self.kind {
            ProviderKind::Dalle => {
                let size = ImageSize::snap(request.width(), request.height());
                if size.width != request.width() || size.height != request.height() {
                    log::debug!(
                        "Requested size {}x{} not supported by {}, using {}",
                        request.width(),
                        request.height(),
                        self.backend.model_id(),
                        size
                    );
                }
                request.with_size(size)
            }
            ProviderKind::Replicate | ProviderKind::Together => request.clone(),
        }
    }

    /// Never returns an error: every failure in the selected path becomes
    /// [`GenerationOutcome::Failure`].
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        match self.try_generate(request).await {
            Ok(batch) => {
                log::info!(
                    "Generated {} image(s) with {}",
                    batch.len(),
                    self.backend.model_id()
                );
                GenerationOutcome::Success(batch)
            }
            Err(err) => {
                log::error!("Image generation failed: {}", err);
                GenerationOutcome::Failure(err)
            }
        }
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Result<ImageBatch> {
        let request = self.effective_request(request);
        let result = self.backend.invoke(&request).await?;
        log::debug!("{} answered with {}", self.kind.as_str(), result.shape());

        match self.kind {
            ProviderKind::Replicate => {
                normalize::normalize_streaming_provider(result, &self.fetcher).await
            }
            ProviderKind::Together => normalize::normalize_url_provider(result, &self.fetcher).await,
            ProviderKind::Dalle => normalize::normalize_inline_provider(result),
        }
    }
}
