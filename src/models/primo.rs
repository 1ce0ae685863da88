//! Primo search API result documents.
//!
//! Only the fields the book list needs are modelled. Every field is optional
//! so that a sparse document still deserializes; callers decide what a
//! missing value means.

use serde::{Deserialize, Serialize};

/// One entry of the `docs` array
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimoDoc {
    #[serde(default)]
    pub pnx: PrimoPnx,

    #[serde(default)]
    pub delivery: PrimoDelivery,

    /// Search context, e.g. `L` (local) or `PC` (central index)
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimoPnx {
    #[serde(default)]
    pub search: PrimoSearch,

    #[serde(default)]
    pub sort: PrimoSort,

    #[serde(default)]
    pub display: PrimoDisplay,

    #[serde(default)]
    pub control: PrimoControl,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimoSearch {
    #[serde(default)]
    pub title: Vec<String>,

    #[serde(default)]
    pub isbn: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimoSort {
    #[serde(default)]
    pub author: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimoDisplay {
    #[serde(default)]
    pub creationdate: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimoControl {
    #[serde(default)]
    pub recordid: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimoDelivery {
    #[serde(rename = "availabilityLinks", default)]
    pub availability_links: Vec<String>,

    #[serde(rename = "availabilityLinksUrl", default)]
    pub availability_links_url: Vec<String>,
}

impl PrimoDoc {
    /// ISBNs in first-seen order, without repeats
    pub fn isbns(&self) -> Vec<String> {
        let mut isbns: Vec<String> = Vec::new();
        for isbn in &self.pnx.search.isbn {
            if !isbns.contains(isbn) {
                isbns.push(isbn.clone());
            }
        }
        isbns
    }

    pub fn title(&self) -> Option<&str> {
        self.pnx.search.title.first().map(String::as_str)
    }

    pub fn author(&self) -> Option<&str> {
        self.pnx.sort.author.first().map(String::as_str)
    }

    pub fn creation_date(&self) -> Option<&str> {
        self.pnx.display.creationdate.first().map(String::as_str)
    }

    pub fn record_id(&self) -> Option<&str> {
        self.pnx.control.recordid.first().map(String::as_str)
    }

    pub fn has_availability_link(&self, kind: &str) -> bool {
        self.delivery.availability_links.iter().any(|l| l == kind)
    }
}
