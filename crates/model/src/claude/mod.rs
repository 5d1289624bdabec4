//! Claude (Anthropic) completion provider.
//!
//! Implements the Anthropic Messages API: the system prompt travels in a
//! top-level field rather than the messages array, and the response carries
//! a list of typed content blocks.

use reqwest::{Client, header::HeaderMap};
use std::time::Duration;

pub use error::RemoteServiceError;
pub use request::Request;

mod error;
mod provider;
mod request;

/// The Anthropic Messages API endpoint.
pub const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// The Anthropic API version header value.
const API_VERSION: &str = "2023-06-01";

/// How long to wait for a connection before giving up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The Claude LLM provider.
#[derive(Clone)]
pub struct Claude {
    /// The HTTP client.
    client: Client,
    /// Request headers (x-api-key, anthropic-version, content-type).
    headers: HeaderMap,
    /// Messages API endpoint URL.
    endpoint: String,
}

impl Claude {
    /// Create a provider targeting the Anthropic API.
    pub fn anthropic(key: &str) -> anyhow::Result<Self> {
        Self::custom(key, ENDPOINT)
    }

    /// Create a provider targeting a custom Anthropic-compatible endpoint.
    pub fn custom(key: &str, endpoint: &str) -> anyhow::Result<Self> {
        use reqwest::header;
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse()?);
        headers.insert("x-api-key", key.parse()?);
        headers.insert("anthropic-version", API_VERSION.parse()?);
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
        })
    }
}
