//! Search response normalization.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;

use crate::config::Config;
use crate::models::{BookRecord, PrimoDoc, RequestDescriptor};
use crate::pipeline::BatchError;
use crate::sources::{CoverResolver, SourceError};
use crate::utils::{normalize_title, TitleSet};

/// Availability link kind pointing straight at the resource
const DIRECT_LINK: &str = "directlink";

/// Availability link kind served from the record's full display
const DETAILS_LINK: &str = "detailsGetit1";

/// Builds catalog links for search result documents
#[derive(Debug, Clone)]
pub struct CatalogLinker {
    hostname: String,
    vid: String,
}

impl CatalogLinker {
    pub fn new(hostname: impl Into<String>, vid: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            vid: vid.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.primo_hostname, &config.vid)
    }

    /// Direct availability link if present, else a full-display deep link
    pub fn link(&self, doc: &PrimoDoc) -> Option<String> {
        if doc.has_availability_link(DIRECT_LINK) {
            return doc.delivery.availability_links_url.first().cloned();
        }

        if doc.has_availability_link(DETAILS_LINK) {
            let record_id = doc.record_id()?;
            return Some(format!(
                "https://{}/primo-explore/fulldisplay?vid={}&docid={}&context={}",
                self.hostname,
                urlencoding::encode(&self.vid),
                urlencoding::encode(record_id),
                urlencoding::encode(doc.context.as_deref().unwrap_or_default())
            ));
        }

        None
    }
}

/// A record that survived filtering, waiting for its cover
#[derive(Debug, Clone)]
pub struct PendingBook {
    pub record: BookRecord,
    pub isbns: Vec<String>,
}

/// Parse the `docs` array of a search response.
///
/// A missing `docs` array is fatal for the request; single documents that
/// cannot be read are skipped.
pub fn extract_docs(body: &Value) -> Result<Vec<PrimoDoc>, BatchError> {
    let docs = body
        .get("docs")
        .and_then(Value::as_array)
        .ok_or_else(|| BatchError::MalformedResponse("missing `docs` array".to_string()))?;

    Ok(docs
        .iter()
        .enumerate()
        .filter_map(|(index, doc)| match serde_json::from_value::<PrimoDoc>(doc.clone()) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Skipping unreadable document #{}: {}", index, e);
                None
            }
        })
        .collect())
}

/// Apply exclusion and title dedup, in document order
pub fn select_books(
    docs: &[PrimoDoc],
    request: &RequestDescriptor,
    linker: &CatalogLinker,
) -> Vec<PendingBook> {
    let mut titles = TitleSet::new();
    let mut books = Vec::new();

    for doc in docs {
        let isbns = doc.isbns();

        if let Some(isbn) = isbns.iter().find(|isbn| request.is_excluded(isbn)) {
            tracing::info!(
                "Excluding {:?} (ISBN {})",
                doc.title().unwrap_or_default(),
                isbn
            );
            continue;
        }

        let Some(raw_title) = doc.title() else {
            tracing::warn!("Skipping document without a title");
            continue;
        };

        let title = normalize_title(raw_title);
        if !titles.insert(&title) {
            tracing::debug!("Dropping duplicate title {:?}", title);
            continue;
        }

        let record = BookRecord::new(title)
            .author(doc.author())
            .year(doc.creation_date())
            .catalog_url(linker.link(doc));

        books.push(PendingBook { record, isbns });
    }

    books
}

/// Map a raw search response to display records with covers.
///
/// Covers are resolved for up to `concurrency` books at a time; output order
/// follows document order.
pub async fn normalize(
    body: &Value,
    request: &RequestDescriptor,
    linker: &CatalogLinker,
    resolver: &CoverResolver,
    concurrency: usize,
) -> Result<Vec<BookRecord>, BatchError> {
    let docs = extract_docs(body)?;
    let pending = select_books(&docs, request, linker);
    tracing::debug!(
        "{} of {} documents kept for {}",
        pending.len(),
        docs.len(),
        request.file_name
    );

    let books = stream::iter(pending)
        .map(|book| async move {
            let cover = resolver.resolve(&book.isbns).await?;
            Ok::<_, SourceError>(book.record.cover_image_url(cover))
        })
        .buffered(concurrency.max(1))
        .try_collect::<Vec<_>>()
        .await?;

    Ok(books)
}
