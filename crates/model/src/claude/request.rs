//! Request body for the Anthropic Messages API.

use courier_core::Message;
use serde::Serialize;

/// The request body for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: usize,
    /// System prompt (top-level, not in the messages array).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The messages array in chronological order.
    pub messages: Vec<Message>,
}

impl Request {
    /// Create a request with an empty message list.
    pub fn new(model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system: None,
            messages: Vec::new(),
        }
    }

    /// Attach the system instruction.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Replace the messages array with the given transcript, oldest first.
    pub fn messages(mut self, messages: &[Message]) -> Self {
        self.messages = messages.to_vec();
        self
    }
}
