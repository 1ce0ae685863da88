//! Utility modules supporting the book list pipeline.
//!
//! - [`HttpClient`]: shared HTTP client honouring proxy and timeout settings
//! - [`normalize_title`] / [`TitleSet`]: title clean-up and case-insensitive dedup
//! - [`escape_html`]: escape text before it is inserted into markup
//! - [`validate_relative_path`]: reject output paths that leave the output directory
//!
//! # Title Deduplication
//!
//! ```rust
//! use primo_booklist::utils::{normalize_title, TitleSet};
//!
//! let mut seen = TitleSet::new();
//! assert!(seen.insert(&normalize_title("Dune /")));
//! assert!(!seen.insert("DUNE"));
//! ```

mod dedup;
mod html;
mod http;
mod validate;

pub use dedup::{normalize_title, TitleSet};
pub use html::escape_html;
pub use http::HttpClient;
pub use validate::{validate_relative_path, ValidationError};
