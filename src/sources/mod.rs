//! Remote collaborators of the book list pipeline.
//!
//! Two external APIs are involved, each behind an async trait so the pipeline
//! can run against in-memory mocks:
//!
//! - [`SearchApi`]: the Primo search API, implemented by [`PrimoSource`]
//! - [`CoverLookup`]: cover thumbnails by ISBN, implemented by [`GoogleBooksSource`]
//!
//! [`CoverResolver`] drives a [`CoverLookup`] over all ISBNs of one book,
//! applying the configured delay before every call.

mod covers;
mod google_books;
pub mod mock;
mod primo;

pub use covers::CoverResolver;
pub use google_books::GoogleBooksSource;
pub use mock::{MockCoverLookup, MockSearchApi};
pub use primo::{build_multi_facets, rewrite_query, PrimoSource};

use async_trait::async_trait;

use crate::models::RequestDescriptor;

/// Search API returning the raw JSON body for one request
#[async_trait]
pub trait SearchApi: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this API
    fn name(&self) -> &str;

    /// Run the search described by `request`
    async fn search(&self, request: &RequestDescriptor) -> Result<serde_json::Value, SourceError>;
}

/// Cover image lookup for a single ISBN
#[async_trait]
pub trait CoverLookup: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this API
    fn name(&self) -> &str;

    /// Thumbnail URL for `isbn`, or `None` when the API knows no cover.
    ///
    /// Unexpected response shapes are reported as `None`; only transport
    /// failures and error statuses are errors.
    async fn thumbnail(&self, isbn: &str) -> Result<Option<String>, SourceError>;
}

/// Errors that can occur when calling an external API
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status from the API
    #[error("API error: {0}")]
    Api(String),

    /// Body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SourceError {
    /// Whether the call failed before a usable response was received
    pub fn is_api_call_error(&self) -> bool {
        matches!(self, SourceError::Network(_) | SourceError::Api(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
