//! Google Books cover lookup.

use async_trait::async_trait;
use std::sync::Arc;

use crate::models::VolumesResponse;
use crate::sources::{CoverLookup, SourceError};
use crate::utils::HttpClient;

/// Google Books source
///
/// Uses the public `volumes?q=isbn:` search, which needs no API key.
#[derive(Debug, Clone)]
pub struct GoogleBooksSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl GoogleBooksSource {
    pub fn new(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build request URL
    fn build_url(&self, isbn: &str) -> String {
        format!("{}/volumes?q=isbn:{}", self.base_url, urlencoding::encode(isbn))
    }
}

#[async_trait]
impl CoverLookup for GoogleBooksSource {
    fn name(&self) -> &str {
        "Google Books"
    }

    async fn thumbnail(&self, isbn: &str) -> Result<Option<String>, SourceError> {
        let response = self
            .client
            .client()
            .get(self.build_url(isbn))
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to query Google Books: {}", e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "Google Books API returned status: {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            SourceError::Network(format!("Failed to read Google Books response: {}", e))
        })?;

        match serde_json::from_str::<VolumesResponse>(&body) {
            Ok(volumes) => Ok(volumes.thumbnail().map(str::to_string)),
            Err(e) => {
                tracing::debug!("Unexpected Google Books response for ISBN {}: {}", isbn, e);
                Ok(None)
            }
        }
    }
}
