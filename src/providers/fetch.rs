use crate::error::{GenError, Result};
use futures::future::try_join_all;

/// Dereferences provider image URLs.
#[derive(Clone, Default)]
pub struct ImageFetcher {
    client: reqwest::Client,
}

impl ImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("Fetching image: {}", url);
        let fetch_error = |reason: String| GenError::FetchError {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(format!(
                "Failed to fetch image: {}",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(body.to_vec())
    }

    /// Fetches every URL concurrently. Results follow the order of `urls`,
    /// not completion order, and the first failure fails the whole batch.
    pub async fn fetch_all(&self, urls: &[String]) -> Result<Vec<Vec<u8>>> {
        try_join_all(urls.iter().map(|url| self.fetch(url))).await
    }
}
