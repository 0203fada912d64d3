mod test_utils;

use genpipe::{
    GenerationRequest, ImageFetcher, ImageService, ModelAccess, ProviderAdapter, ProviderKind,
    ProviderResult, RateLimiter,
};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{ScriptedBackend, ScriptedModel};
use tokio::time::Instant;

fn inline_backend() -> Arc<ScriptedBackend> {
    Arc::new(ScriptedBackend::new(|| {
        Ok(ProviderResult::InlineBase64(vec!["aGVsbG8=".to_string()]))
    }))
}

fn service(backend: Arc<ScriptedBackend>, model: Option<Arc<dyn ModelAccess>>) -> ImageService {
    let adapter = ProviderAdapter::with_backend(ProviderKind::Dalle, backend, ImageFetcher::new());
    ImageService::new(adapter, RateLimiter::new(Duration::from_secs(1)), model)
}

#[tokio::test(start_paused = true)]
async fn test_enhanced_prompt_reaches_provider() {
    let backend = inline_backend();
    let model: Arc<dyn ModelAccess> = Arc::new(ScriptedModel::website());
    let service = service(backend.clone(), Some(model));

    let request = GenerationRequest::new("a red fox", 1024, 1024).unwrap();
    let outcome = service.generate(&request).await;

    assert!(outcome.is_success());
    assert_eq!(backend.requests()[0].prompt(), "an enhanced prompt");
}

#[tokio::test(start_paused = true)]
async fn test_enhancement_failure_keeps_original_prompt() {
    let backend = inline_backend();
    let model: Arc<dyn ModelAccess> = Arc::new(ScriptedModel::failing());
    let service = service(backend.clone(), Some(model));

    let request = GenerationRequest::new("a red fox", 1024, 1024).unwrap();
    assert!(service.generate(&request).await.is_success());
    assert_eq!(backend.requests()[0].prompt(), "a red fox");
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_calls_are_spaced() {
    let backend = inline_backend();
    let service = service(backend.clone(), None);
    let request = GenerationRequest::new("a red fox", 1024, 1024).unwrap();

    let start = Instant::now();
    service.generate(&request).await;
    assert!(start.elapsed() < Duration::from_millis(10));

    service.generate(&request).await;
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_clones_share_the_limiter() {
    let backend = inline_backend();
    let first = service(backend.clone(), None);
    let second = first.clone();
    let request = GenerationRequest::new("a red fox", 1024, 1024).unwrap();

    let start = Instant::now();
    let (a, b) = tokio::join!(first.generate(&request), second.generate(&request));

    assert!(a.is_success() && b.is_success());
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(first.limiter().last_call().await.is_some());
}
