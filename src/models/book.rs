//! Display-ready book record.

use serde::{Deserialize, Serialize};

/// One row of a rendered book list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Normalized title
    pub title: String,

    /// `" by <author>"`, or empty when the record has no author
    pub author: String,

    /// Publication year, or empty
    pub year: String,

    /// Cover thumbnail (placeholder when none was found)
    pub cover_image_url: String,

    /// Link into the catalog, if the record exposes one
    pub catalog_url: Option<String>,
}

impl BookRecord {
    /// Create a record with no cover resolved yet
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: String::new(),
            year: String::new(),
            cover_image_url: String::new(),
            catalog_url: None,
        }
    }

    /// Set the author, applying the `" by "` prefix
    pub fn author(mut self, author: Option<&str>) -> Self {
        self.author = match author.map(str::trim) {
            Some(name) if !name.is_empty() => format!(" by {}", name),
            _ => String::new(),
        };
        self
    }

    pub fn year(mut self, year: Option<&str>) -> Self {
        self.year = year.map(|y| y.trim().to_string()).unwrap_or_default();
        self
    }

    pub fn catalog_url(mut self, url: Option<String>) -> Self {
        self.catalog_url = url;
        self
    }

    pub fn cover_image_url(mut self, url: impl Into<String>) -> Self {
        self.cover_image_url = url.into();
        self
    }
}
