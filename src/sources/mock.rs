//! Mock sources for testing purposes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::models::RequestDescriptor;
use crate::sources::{CoverLookup, SearchApi, SourceError};

/// A mock search API that returns predefined bodies per request id.
#[derive(Debug, Default)]
pub struct MockSearchApi {
    responses: Mutex<HashMap<String, serde_json::Value>>,
    failures: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockSearchApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body returned for the request with `id`.
    pub fn set_response(&self, id: &str, body: serde_json::Value) {
        self.responses.lock().unwrap().insert(id.to_string(), body);
    }

    /// Make the request with `id` fail with a network error.
    pub fn fail_on(&self, id: &str) {
        self.failures.lock().unwrap().insert(id.to_string());
    }

    /// Request ids searched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchApi for MockSearchApi {
    fn name(&self) -> &str {
        "Mock Search"
    }

    async fn search(&self, request: &RequestDescriptor) -> Result<serde_json::Value, SourceError> {
        self.calls.lock().unwrap().push(request.id.clone());

        if self.failures.lock().unwrap().contains(&request.id) {
            return Err(SourceError::Network(format!(
                "mock failure for request {}",
                request.id
            )));
        }

        let responses = self.responses.lock().unwrap();
        Ok(responses
            .get(&request.id)
            .cloned()
            .unwrap_or_else(|| serde_json::json!({ "docs": [] })))
    }
}

/// A mock cover API with a fixed ISBN -> thumbnail table.
#[derive(Debug, Default)]
pub struct MockCoverLookup {
    covers: Mutex<HashMap<String, String>>,
    failures: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockCoverLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cover(&self, isbn: &str, url: &str) {
        self.covers
            .lock()
            .unwrap()
            .insert(isbn.to_string(), url.to_string());
    }

    pub fn fail_on(&self, isbn: &str) {
        self.failures.lock().unwrap().insert(isbn.to_string());
    }

    /// ISBNs looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoverLookup for MockCoverLookup {
    fn name(&self) -> &str {
        "Mock Covers"
    }

    async fn thumbnail(&self, isbn: &str) -> Result<Option<String>, SourceError> {
        self.calls.lock().unwrap().push(isbn.to_string());

        if self.failures.lock().unwrap().contains(isbn) {
            return Err(SourceError::Network(format!("mock failure for ISBN {}", isbn)));
        }

        Ok(self.covers.lock().unwrap().get(isbn).cloned())
    }
}
