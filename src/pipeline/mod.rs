//! The per-request pipeline: search results in, HTML fragment out.
//!
//! - [`normalize`]: turn a raw search response into display records
//! - [`HtmlRenderer`]: serialize records into a standalone HTML page
//! - [`BatchRunner`]: drive every request through search, normalize, render and write

mod batch;
mod normalize;
mod render;

pub use batch::{BatchRunner, BatchSummary, FailedRequest};
pub use normalize::{extract_docs, normalize, select_books, CatalogLinker, PendingBook};
pub use render::HtmlRenderer;

use std::path::PathBuf;

use crate::sources::SourceError;

/// Errors that fail a single request, or the batch
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Search or cover API call failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The search response lacks the expected structure
    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    /// Output could not be written
    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
