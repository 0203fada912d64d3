//! One normalization function per provider. Each accepts only the response
//! shapes its provider is known to produce.

use crate::{
    error::{GenError, Result},
    models::{ByteStream, ImageBatch, ImageFormat, ProviderResult},
    providers::fetch::ImageFetcher,
};
use futures::StreamExt;

/// Drains the stream, keeping chunk arrival order.
pub async fn drain_stream(mut stream: ByteStream) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
    }
    Ok(buffer)
}

async fn fetch_and_encode(
    urls: &[String],
    fetcher: &ImageFetcher,
    format: ImageFormat,
) -> Result<ImageBatch> {
    if urls.is_empty() {
        return Err(GenError::ResponseError(
            "No valid image URLs in response".into(),
        ));
    }
    let bodies = fetcher.fetch_all(urls).await?;
    ImageBatch::new(bodies.iter().map(|body| format.encode(body)).collect())
}

pub async fn normalize_streaming_provider(
    result: ProviderResult,
    fetcher: &ImageFetcher,
) -> Result<ImageBatch> {
    match result {
        ProviderResult::StreamedBinary(stream) => {
            let bytes = drain_stream(stream).await?;
            if bytes.is_empty() {
                return Err(GenError::ResponseError("Image stream was empty".into()));
            }
            log::debug!("Drained {} bytes from image stream", bytes.len());
            ImageBatch::new(vec![ImageFormat::Jpeg.encode(&bytes)])
        }
        ProviderResult::UrlList(urls) => fetch_and_encode(&urls, fetcher, ImageFormat::Jpeg).await,
        other => Err(GenError::unexpected_shape(
            "replicate",
            format!("got {}", other.shape()),
        )),
    }
}

pub async fn normalize_url_provider(
    result: ProviderResult,
    fetcher: &ImageFetcher,
) -> Result<ImageBatch> {
    match result {
        ProviderResult::UrlList(urls) => fetch_and_encode(&urls, fetcher, ImageFormat::Jpeg).await,
        other => Err(GenError::unexpected_shape(
            "together",
            format!("got {}", other.shape()),
        )),
    }
}

pub fn normalize_inline_provider(result: ProviderResult) -> Result<ImageBatch> {
    match result {
        ProviderResult::InlineBase64(payloads) => ImageBatch::new(
            payloads
                .iter()
                .map(|payload| ImageFormat::Png.data_uri(payload))
                .collect(),
        ),
        other => Err(GenError::unexpected_shape(
            "dall-e",
            format!("got {}", other.shape()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use futures::stream;

    fn chunks(parts: Vec<Vec<u8>>) -> ByteStream {
        stream::iter(parts.into_iter().map(Ok)).boxed()
    }

    #[tokio::test]
    async fn test_stream_chunks_concatenated_in_order() {
        let result = ProviderResult::StreamedBinary(chunks(vec![
            b"abcd".to_vec(),
            b"efgh".to_vec(),
            b"ijkl".to_vec(),
        ]));
        let batch = normalize_streaming_provider(result, &ImageFetcher::new())
            .await
            .unwrap();

        assert_eq!(batch.len(), 1);
        let uri = &batch.as_slice()[0];
        let payload = uri.strip_prefix("data:image/jpeg;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"abcdefghijkl");
    }

    #[tokio::test]
    async fn test_stream_error_fails_batch() {
        let failing: ByteStream = stream::iter(vec![
            Ok(b"abcd".to_vec()),
            Err(GenError::ResponseError("connection reset".into())),
        ])
        .boxed();
        let result =
            normalize_streaming_provider(ProviderResult::StreamedBinary(failing), &ImageFetcher::new())
                .await;
        assert!(matches!(result, Err(GenError::ResponseError(_))));
    }

    #[tokio::test]
    async fn test_empty_stream_is_failure() {
        let result = normalize_streaming_provider(
            ProviderResult::StreamedBinary(chunks(vec![])),
            &ImageFetcher::new(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_wrong_shapes_rejected() {
        let fetcher = ImageFetcher::new();
        let inline = ProviderResult::InlineBase64(vec!["AAAA".into()]);
        assert!(matches!(
            normalize_streaming_provider(inline, &fetcher).await,
            Err(GenError::UnexpectedShape { .. })
        ));

        let inline = ProviderResult::InlineBase64(vec!["AAAA".into()]);
        assert!(matches!(
            normalize_url_provider(inline, &fetcher).await,
            Err(GenError::UnexpectedShape { .. })
        ));

        assert!(matches!(
            normalize_inline_provider(ProviderResult::UrlList(vec!["http://x".into()])),
            Err(GenError::UnexpectedShape { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_lists_are_failures() {
        let fetcher = ImageFetcher::new();
        assert!(normalize_url_provider(ProviderResult::UrlList(vec![]), &fetcher)
            .await
            .is_err());
        assert!(normalize_streaming_provider(ProviderResult::UrlList(vec![]), &fetcher)
            .await
            .is_err());
        assert!(normalize_inline_provider(ProviderResult::InlineBase64(vec![])).is_err());
    }

    #[test]
    fn test_inline_payloads_get_png_prefix() {
        let batch = normalize_inline_provider(ProviderResult::InlineBase64(vec![
            "AAAA".into(),
            "BBBB".into(),
        ]))
        .unwrap();
        assert_eq!(
            batch.into_inner(),
            vec!["data:image/png;base64,AAAA", "data:image/png;base64,BBBB"]
        );
    }
}
