//! Configuration management.
//!
//! Settings are read with the `config` crate, so the file format follows the
//! extension (`config.yml`, `config.toml`, ...). Any key can be overridden from
//! the environment with the `BOOKLIST_` prefix, e.g. `BOOKLIST_APIKEY`.
//!
//! # Configuration File Format
//!
//! ```yaml
//! api_gateway_url: https://api-eu.hosted.exlibrisgroup.com
//! vid: 44LIB_VU1
//! tab: default_tab
//! scope: default_scope
//! pcAvailability: false
//! apikey: l7xx0000
//! primo_hostname: library.example.edu
//! output_dir: ./output
//! requests_file_path: ./requests.csv
//! debug_dir: ./debug
//! max_book_cover_calls_per_min: 60
//! proxies:
//!   http: http://proxy:8080
//!   https: http://proxy:8080
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Path of the Primo search endpoint below the API gateway
pub const PRIMO_SEARCH_PATH: &str = "/primo/v1/search";

/// Default Google Books API base
pub const DEFAULT_COVER_API_URL: &str = "https://www.googleapis.com/books/v1";

/// Generic book cover (icon made by Freepik from www.flaticon.com)
pub const DEFAULT_PLACEHOLDER_COVER: &str = "https://cdn-icons-png.flaticon.com/512/85/85522.png";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Ex Libris API gateway
    pub api_gateway_url: String,

    /// Primo view id
    pub vid: String,

    /// Primo search tab
    pub tab: String,

    /// Primo search scope
    pub scope: String,

    /// Expand results beyond the library's holdings
    #[serde(rename = "pcAvailability", alias = "pcavailability", default)]
    pub pc_availability: bool,

    /// Search API key
    pub apikey: String,

    /// Public Primo host used for catalog deep links
    pub primo_hostname: String,

    /// Directory the HTML fragments are written to
    pub output_dir: PathBuf,

    /// CSV file with one search definition per row
    pub requests_file_path: PathBuf,

    /// Raw search responses are dumped here when set
    #[serde(default)]
    pub debug_dir: Option<PathBuf>,

    /// Google Books calls allowed per minute (0 or absent = unlimited)
    #[serde(default)]
    pub max_book_cover_calls_per_min: Option<u32>,

    /// Proxy servers for outgoing requests
    #[serde(default)]
    pub proxies: Option<ProxyConfig>,

    /// Cover API base URL
    #[serde(default = "default_cover_api_url")]
    pub cover_api_url: String,

    /// Image used when no cover is found
    #[serde(default = "default_placeholder_cover")]
    pub placeholder_cover_url: String,

    /// Escape titles, authors and links before inserting them into HTML
    #[serde(default = "default_true")]
    pub escape_html: bool,

    /// Number of books whose covers are resolved at the same time
    #[serde(default = "default_cover_concurrency")]
    pub cover_concurrency: usize,

    /// Per-request HTTP timeout
    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,

    /// Abort the whole batch on the first failed request
    #[serde(default)]
    pub fail_fast: bool,
}

/// Proxy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub http: Option<String>,

    #[serde(default)]
    pub https: Option<String>,
}

fn default_cover_api_url() -> String {
    DEFAULT_COVER_API_URL.to_string()
}

fn default_placeholder_cover() -> String {
    DEFAULT_PLACEHOLDER_COVER.to_string()
}

fn default_true() -> bool {
    true
}

fn default_cover_concurrency() -> usize {
    1
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("api_gateway_url", &self.api_gateway_url),
            ("apikey", &self.apikey),
            ("vid", &self.vid),
            ("primo_hostname", &self.primo_hostname),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("`{}` must not be empty", key)));
            }
        }

        for (key, value) in [
            ("api_gateway_url", &self.api_gateway_url),
            ("cover_api_url", &self.cover_api_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("`{}` is not a URL: {}", key, e)))?;
        }

        if self.cover_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "`cover_concurrency` must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Search endpoint with the fixed view/tab/scope parameters already applied
    pub fn search_endpoint(&self) -> String {
        format!(
            "{}{}?vid={}&tab={}&scope={}&pcAvailability={}",
            self.api_gateway_url.trim_end_matches('/'),
            PRIMO_SEARCH_PATH,
            urlencoding::encode(&self.vid),
            urlencoding::encode(&self.tab),
            urlencoding::encode(&self.scope),
            self.pc_availability
        )
    }

    /// Wait before each cover lookup: 60 / calls-per-minute, or nothing
    pub fn cover_pause(&self) -> Duration {
        match self.max_book_cover_calls_per_min {
            Some(per_min) if per_min > 0 => Duration::from_secs_f64(60.0 / f64::from(per_min)),
            _ => Duration::ZERO,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Configuration and request table errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read request table {}: {message}", path.display())]
    Table { path: PathBuf, message: String },

    #[error("Request table row {row}: missing column `{column}`")]
    MissingColumn { row: usize, column: String },

    #[error("Request table row {row}: invalid `{column}` value {value:?}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// Load configuration from a file, with `BOOKLIST_*` environment overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("BOOKLIST")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        api_gateway_url: "https://api.example.com".to_string(),
        vid: "VID".to_string(),
        tab: "default_tab".to_string(),
        scope: "default_scope".to_string(),
        pc_availability: false,
        apikey: "secret key".to_string(),
        primo_hostname: "catalog.example.edu".to_string(),
        output_dir: PathBuf::from("./output"),
        requests_file_path: PathBuf::from("./requests.csv"),
        debug_dir: None,
        max_book_cover_calls_per_min: None,
        proxies: None,
        cover_api_url: default_cover_api_url(),
        placeholder_cover_url: default_placeholder_cover(),
        escape_html: true,
        cover_concurrency: 1,
        http_timeout_secs: 30,
        fail_fast: false,
    }
}
