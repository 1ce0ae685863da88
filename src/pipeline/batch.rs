//! Batch orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::models::RequestDescriptor;
use crate::pipeline::{normalize, BatchError, CatalogLinker, HtmlRenderer};
use crate::sources::{
    CoverLookup, CoverResolver, GoogleBooksSource, PrimoSource, SearchApi, SourceError,
};
use crate::utils::HttpClient;

/// A request that produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRequest {
    pub id: String,
    pub file_name: String,
    pub error: String,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Output files written, in processing order
    pub written: Vec<PathBuf>,

    /// Requests that failed, in processing order
    pub failed: Vec<FailedRequest>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs requests one after another: search, normalize, render, write
#[derive(Debug)]
pub struct BatchRunner {
    search: Arc<dyn SearchApi>,
    resolver: CoverResolver,
    linker: CatalogLinker,
    renderer: HtmlRenderer,
    output_dir: PathBuf,
    debug_dir: Option<PathBuf>,
    cover_concurrency: usize,
    fail_fast: bool,
}

impl BatchRunner {
    /// Create a runner around explicit API implementations
    pub fn new(config: &Config, search: Arc<dyn SearchApi>, covers: Arc<dyn CoverLookup>) -> Self {
        Self {
            search,
            resolver: CoverResolver::new(
                covers,
                config.cover_pause(),
                config.placeholder_cover_url.clone(),
            ),
            linker: CatalogLinker::from_config(config),
            renderer: HtmlRenderer::new(config.escape_html),
            output_dir: config.output_dir.clone(),
            debug_dir: config.debug_dir.clone(),
            cover_concurrency: config.cover_concurrency.max(1),
            fail_fast: config.fail_fast,
        }
    }

    /// Create a runner talking to Primo and Google Books
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = Arc::new(HttpClient::from_config(config)?);
        let search = Arc::new(PrimoSource::new(Arc::clone(&client), config));
        let covers = Arc::new(GoogleBooksSource::new(client, &config.cover_api_url));
        Ok(Self::new(config, search, covers))
    }

    /// Process `requests` in order.
    ///
    /// A failed API call or malformed response only fails its own request,
    /// unless `fail_fast` is set. Write failures abort the batch.
    pub async fn run(&self, requests: &[RequestDescriptor]) -> Result<BatchSummary, BatchError> {
        create_dir(&self.output_dir)?;

        let mut summary = BatchSummary::default();

        for request in requests {
            let start = Instant::now();
            tracing::info!("### updating: {}", request.file_name);

            match self.process(request).await {
                Ok(path) => {
                    tracing::info!(
                        "time elapsed: {:.2} secs.",
                        start.elapsed().as_secs_f64()
                    );
                    summary.written.push(path);
                }
                Err(e @ BatchError::FileWrite { .. }) => return Err(e),
                Err(e) if self.fail_fast => return Err(e),
                Err(e) => {
                    tracing::error!(
                        "Request {} ({}) failed: {}",
                        request.id,
                        request.file_name,
                        e
                    );
                    summary.failed.push(FailedRequest {
                        id: request.id.clone(),
                        file_name: request.file_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "DONE. {} written, {} failed",
            summary.written.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Run one request end to end and return the path written
    pub async fn process(&self, request: &RequestDescriptor) -> Result<PathBuf, BatchError> {
        tracing::info!("calling {} search API...", self.search.name());
        let body = self.search.search(request).await?;

        if let Some(debug_dir) = &self.debug_dir {
            self.write_debug(debug_dir, request, &body);
        }

        tracing::info!("getting book covers...");
        let books = normalize(
            &body,
            request,
            &self.linker,
            &self.resolver,
            self.cover_concurrency,
        )
        .await?;

        tracing::info!("writing HTML output ({} books)...", books.len());
        let html = self.renderer.render(&books);
        let path = self.output_dir.join(&request.file_name);
        write_file(&path, &html)?;

        Ok(path)
    }

    // Debug dumps are best effort: a failure here never fails the request
    fn write_debug(&self, debug_dir: &Path, request: &RequestDescriptor, body: &serde_json::Value) {
        let path = debug_dir.join(format!("{}.json", request.file_name));
        let result = serde_json::to_string_pretty(body)
            .map_err(|e| e.to_string())
            .and_then(|json| write_file(&path, &json).map_err(|e| e.to_string()));

        match result {
            Ok(()) => tracing::debug!("Raw response saved to {}", path.display()),
            Err(e) => tracing::warn!("Could not save raw response: {}", e),
        }
    }
}

fn create_dir(dir: &Path) -> Result<(), BatchError> {
    std::fs::create_dir_all(dir).map_err(|source| BatchError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), BatchError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    std::fs::write(path, content).map_err(|source| BatchError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::sources::{MockCoverLookup, MockSearchApi};
    use serde_json::json;
    use tempfile::tempdir;

    fn body(titles: &[&str]) -> serde_json::Value {
        let docs: Vec<_> = titles
            .iter()
            .map(|t| json!({ "pnx": { "search": { "title": [t] } } }))
            .collect();
        json!({ "docs": docs })
    }

    fn requests() -> Vec<RequestDescriptor> {
        vec![
            RequestDescriptor::new("1", "a.html"),
            RequestDescriptor::new("2", "lists/b.html"),
            RequestDescriptor::new("3", "c.html"),
        ]
    }

    #[tokio::test]
    async fn test_run_writes_one_file_per_request() {
        let dir = tempdir().unwrap();
        let mut config = test_config();
        config.output_dir = dir.path().join("out");

        let search = Arc::new(MockSearchApi::new());
        search.set_response("1", body(&["Dune", "Emma"]));
        search.set_response("2", body(&["Ulysses"]));
        let runner = BatchRunner::new(&config, search.clone(), Arc::new(MockCoverLookup::new()));

        let summary = runner.run(&requests()).await.unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.written.len(), 3);
        assert_eq!(search.calls(), vec!["1", "2", "3"]);

        let a = std::fs::read_to_string(config.output_dir.join("a.html")).unwrap();
        assert_eq!(a.matches("<tr>").count(), 2);
        let b = std::fs::read_to_string(config.output_dir.join("lists/b.html")).unwrap();
        assert_eq!(b.matches("<tr>").count(), 1);
        let c = std::fs::read_to_string(config.output_dir.join("c.html")).unwrap();
        assert_eq!(c.matches("<tr>").count(), 0);
    }

    #[tokio::test]
    async fn test_failed_request_is_isolated() {
        let dir = tempdir().unwrap();
        let mut config = test_config();
        config.output_dir = dir.path().to_path_buf();

        let search = Arc::new(MockSearchApi::new());
        search.fail_on("2");
        search.set_response("3", json!({ "error": "no docs here" }));
        let runner = BatchRunner::new(&config, search, Arc::new(MockCoverLookup::new()));

        let summary = runner.run(&requests()).await.unwrap();
        assert_eq!(summary.written, vec![dir.path().join("a.html")]);
        let failed: Vec<_> = summary.failed.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(failed, vec!["2", "3"]);
        assert!(!dir.path().join("lists/b.html").exists());
        assert!(!dir.path().join("c.html").exists());
    }

    #[tokio::test]
    async fn test_fail_fast_stops_the_batch() {
        let dir = tempdir().unwrap();
        let mut config = test_config();
        config.output_dir = dir.path().to_path_buf();
        config.fail_fast = true;

        let search = Arc::new(MockSearchApi::new());
        search.fail_on("2");
        let runner = BatchRunner::new(&config, search.clone(), Arc::new(MockCoverLookup::new()));

        let result = runner.run(&requests()).await;
        assert!(matches!(result, Err(BatchError::Source(_))));
        assert_eq!(search.calls(), vec!["1", "2"]);
        // earlier output stays on disk
        assert!(dir.path().join("a.html").exists());
    }

    #[tokio::test]
    async fn test_debug_dump() {
        let dir = tempdir().unwrap();
        let mut config = test_config();
        config.output_dir = dir.path().join("out");
        config.debug_dir = Some(dir.path().join("debug"));

        let search = Arc::new(MockSearchApi::new());
        search.set_response("1", body(&["Dune"]));
        let runner = BatchRunner::new(&config, search, Arc::new(MockCoverLookup::new()));

        runner
            .process(&RequestDescriptor::new("1", "a.html"))
            .await
            .unwrap();

        let dump = std::fs::read_to_string(dir.path().join("debug/a.html.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&dump).unwrap();
        assert_eq!(parsed, body(&["Dune"]));
        assert!(dump.contains('\n'));
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_fatal() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = test_config();
        config.output_dir = blocker.join("out");
        let runner = BatchRunner::new(
            &config,
            Arc::new(MockSearchApi::new()),
            Arc::new(MockCoverLookup::new()),
        );

        let result = runner.run(&requests()).await;
        assert!(matches!(result, Err(BatchError::FileWrite { .. })));
    }
}
