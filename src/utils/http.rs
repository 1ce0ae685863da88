//! HTTP client utilities.

use reqwest::{Client, Proxy};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ProxyConfig};

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder(Duration::from_secs(30)).build().map(Self::wrap)
    }

    /// Create a client from the application configuration (timeout and proxies)
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = Self::builder(config.http_timeout());

        if let Some(proxies) = &config.proxies {
            builder = apply_proxies(builder, proxies)?;
        }

        builder.build().map(Self::wrap)
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn builder(timeout: Duration) -> reqwest::ClientBuilder {
        Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
    }

    fn wrap(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

fn apply_proxies(
    mut builder: reqwest::ClientBuilder,
    proxies: &ProxyConfig,
) -> Result<reqwest::ClientBuilder, reqwest::Error> {
    if let Some(http) = proxies.http.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.proxy(Proxy::http(http)?);
    }
    if let Some(https) = proxies.https.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.proxy(Proxy::https(https)?);
    }
    Ok(builder)
}
