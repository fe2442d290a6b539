use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::debug;

use crate::models::{FilterConfig, FilterResult, ParseRequest, ParseResult};

/// HTTP client backend that delegates parse and filter operations to a
/// running `hnjobs` daemon.
pub struct HttpFilterBackend {
    client: Client,
    base_url: String,
}

impl HttpFilterBackend {
    /// Create a new HTTP backend targeting the given base URL
    /// (e.g. "http://127.0.0.1:7878").
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Execute a filter pass via `POST /v1/filter`, returning a
    /// deserialized `FilterResult`.
    pub fn filter(&self, config: FilterConfig) -> Result<FilterResult> {
        self.post_json("/v1/filter", &config)
    }

    /// Tokenize a query via `POST /v1/parse`.
    pub fn parse(&self, query: String) -> Result<ParseResult> {
        self.post_json("/v1/parse", &ParseRequest { query })
    }

    fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R>
    where
        T: Serialize,
        R: serde::de::DeserializeOwned,
    {
        let url = self.url_for(path);
        debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .with_context(|| format!("failed to send request to {}", url))?
            .error_for_status()
            .with_context(|| format!("server returned error for {}", url))?;

        let value = response
            .json::<R>()
            .context("failed to decode JSON response from server")?;

        Ok(value)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
