use crate::{
    config::ImageProviderConfig,
    enhance::enhance,
    error::Result,
    models::{GenerationOutcome, GenerationRequest},
    providers::{ModelAccess, ProviderAdapter},
    rate_limit::RateLimiter,
};
use std::sync::Arc;

/// Image generation entry point: pace, enhance, generate.
#[derive(Clone)]
pub struct ImageService {
    adapter: ProviderAdapter,
    limiter: RateLimiter,
    model: Option<Arc<dyn ModelAccess>>,
}

impl ImageService {
    pub fn new(
        adapter: ProviderAdapter,
        limiter: RateLimiter,
        model: Option<Arc<dyn ModelAccess>>,
    ) -> Self {
        Self {
            adapter,
            limiter,
            model,
        }
    }

    pub fn from_config(
        config: &ImageProviderConfig,
        model: Option<Arc<dyn ModelAccess>>,
    ) -> Result<Self> {
        Ok(Self::new(
            ProviderAdapter::from_config(config)?,
            RateLimiter::new(config.min_delay_between_generations),
            model,
        ))
    }

    pub fn adapter(&self) -> &ProviderAdapter {
        &self.adapter
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        self.limiter.acquire().await;

        let enhanced = enhance(request.prompt(), self.model.as_deref()).await;
        log::info!("Using enhanced prompt for generation: {}", enhanced);

        self.adapter.generate(&request.with_prompt(enhanced)).await
    }
}
