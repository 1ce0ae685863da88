//! Cover resolution for one book.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::models::strip_hyphens;
use crate::sources::{CoverLookup, SourceError};

/// Tries a book's ISBNs in order and returns the first cover found
#[derive(Debug)]
pub struct CoverResolver {
    lookup: Arc<dyn CoverLookup>,
    pause: Duration,
    placeholder: String,
    // Held while pausing so concurrent resolutions still space their calls
    gate: Mutex<()>,
}

impl CoverResolver {
    pub fn new(lookup: Arc<dyn CoverLookup>, pause: Duration, placeholder: impl Into<String>) -> Self {
        Self {
            lookup,
            pause,
            placeholder: placeholder.into(),
            gate: Mutex::new(()),
        }
    }

    /// Cover URL for the first ISBN that has one, or the placeholder
    pub async fn resolve(&self, isbns: &[String]) -> Result<String, SourceError> {
        for isbn in isbns {
            let isbn = strip_hyphens(isbn);
            self.wait_turn().await;

            if let Some(url) = self.lookup.thumbnail(&isbn).await? {
                tracing::debug!("Cover found for ISBN {} via {}", isbn, self.lookup.name());
                return Ok(url);
            }
        }

        Ok(self.placeholder.clone())
    }

    async fn wait_turn(&self) {
        if self.pause.is_zero() {
            return;
        }
        let _turn = self.gate.lock().await;
        tokio::time::sleep(self.pause).await;
    }
}
