//! Search definition for one output page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the request table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Request id, matched against the command-line selection
    pub id: String,

    /// Output path relative to the output directory
    pub file_name: String,

    /// Raw query as copied from the Primo UI (`any,contains,x OR&query=...`)
    pub query_string: String,

    /// Raw multi-facet string, not yet encoded
    pub facets: String,

    /// Lower bound for the creation-date facet
    pub from_year: Option<i32>,

    /// Primo sort value (`rank`, `date`, ...)
    pub sort: String,

    /// Number of results wanted on the page
    pub results_limit: Option<u32>,

    /// Records carrying any of these ISBNs are dropped
    pub excluded_isbns: BTreeSet<String>,
}

impl RequestDescriptor {
    pub fn new(id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            query_string: String::new(),
            facets: String::new(),
            from_year: None,
            sort: String::new(),
            results_limit: None,
            excluded_isbns: BTreeSet::new(),
        }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query_string = query.into();
        self
    }

    pub fn facets(mut self, facets: impl Into<String>) -> Self {
        self.facets = facets.into();
        self
    }

    pub fn from_year(mut self, year: i32) -> Self {
        self.from_year = Some(year);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }

    pub fn results_limit(mut self, limit: u32) -> Self {
        self.results_limit = Some(limit);
        self
    }

    pub fn exclude_isbns<I, S>(mut self, isbns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_isbns = isbns
            .into_iter()
            .map(Into::<String>::into)
            .map(|isbn| strip_hyphens(&isbn))
            .collect();
        self
    }

    /// Limit sent to the search API.
    ///
    /// Raised by the number of excluded ISBNs so the page can still be filled
    /// after excluded records are dropped.
    pub fn effective_limit(&self) -> Option<u32> {
        self.results_limit.map(|limit| {
            let excluded = u32::try_from(self.excluded_isbns.len()).unwrap_or(u32::MAX);
            limit.saturating_add(excluded)
        })
    }

    /// ISBNs match with or without hyphens
    pub fn is_excluded(&self, isbn: &str) -> bool {
        self.excluded_isbns.contains(strip_hyphens(isbn).as_str())
    }
}

/// `978-0-441-01359-3` -> `9780441013593`
pub fn strip_hyphens(isbn: &str) -> String {
    isbn.replace('-', "")
}
