//! Completion call against the Anthropic Messages API.

use super::{Claude, RemoteServiceError, Request};
use anyhow::Result;
use compact_str::CompactString;

/// Raw Anthropic non-streaming response.
#[derive(serde::Deserialize)]
struct AnthropicResponse {
    model: CompactString,
    content: Vec<ContentBlock>,
    stop_reason: Option<CompactString>,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

impl Claude {
    /// Send a completion request and return the first generated text block.
    ///
    /// A non-success status fails with [`RemoteServiceError`] carrying the
    /// status code and response body; it is never retried here.
    pub async fn send(&self, req: &Request) -> Result<String> {
        anyhow::ensure!(!req.messages.is_empty(), "conversation is empty");
        tracing::trace!("request: {}", serde_json::to_string(req)?);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(req)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::trace!("response: {text}");
        if !status.is_success() {
            return Err(RemoteServiceError { status, body: text }.into());
        }

        let raw: AnthropicResponse = serde_json::from_str(&text)?;
        tracing::debug!(model = %raw.model, stop_reason = ?raw.stop_reason, "completion received");
        first_text(raw).ok_or_else(|| anyhow::anyhow!("response contained no text block"))
    }
}

/// Extract the first text content block from a response.
fn first_text(raw: AnthropicResponse) -> Option<String> {
    raw.content.into_iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text),
        ContentBlock::Other => None,
    })
}
