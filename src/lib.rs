//! # Primo Booklist
//!
//! Generates static HTML book lists from Primo searches, for embedding in
//! web pages such as LibGuides widgets. Each search result is paired with a
//! cover thumbnail from Google Books.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`]: Process-wide settings loaded from `config.yml`
//! - [`table`]: Search definitions read from the request table
//! - [`models`]: Core data structures (RequestDescriptor, BookRecord, API payloads)
//! - [`sources`]: Primo search and Google Books cover lookups behind async traits
//! - [`pipeline`]: Normalization, HTML rendering and batch orchestration
//! - [`utils`]: HTTP client, title dedup, HTML escaping and path validation

pub mod config;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod table;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use models::{BookRecord, RequestDescriptor};
pub use pipeline::{BatchError, BatchRunner, BatchSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
