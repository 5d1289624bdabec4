//! The agent session: transcript, memory, provider, and the per-turn flow.

use anyhow::Result;
use courier_core::{MemoryStore, Message, Transcript, interpret};
use courier_model::{Claude, Request};

/// Persona and operating rules sent as the system instruction, including
/// the exact markup grammar of the pseudo tools. The compiled memory
/// context is appended to this before every request.
pub const SYSTEM_PROMPT: &str = "You are an AI assistant specialized in sending emails. \
You ask the user for the email content: the recipient's name and address (required), \
the sender's name (required), the category (appointment, meeting request, ...), \
the style (casual or formal), and the language. Ask more questions whenever something \
is missing. Use short and clear sentences, and tell the user whenever you call a tool. \
Very important: always persist collected info with the memory tool so you can access \
it later if the conversation history is empty. Before sending an email, double-check \
the content with the user using the sentence: Should I send the email now? \
Do not accept unrelated queries; remind the user that you can only send emails.\n\
Tools you have access to:\n\
Memory Tool - Description: key-value store you can use as memory. \
Remember: <remember>key: value</remember>, Recall: <recall>key</recall>, \
Clear Memory: <clear-memory/>\n\
Email Tool - Description: email service. \
Format: <send-email>to@email.com | Subject | Message body</send-email>";

/// A chat session: provider + transcript + memory + model settings.
///
/// All mutable state of the agent lives here and is passed explicitly to
/// every operation; nothing is global.
pub struct Session {
    /// Conversation so far, oldest first.
    pub transcript: Transcript,
    /// Persistent key-value memory.
    pub memory: MemoryStore,
    provider: Claude,
    model: String,
    max_tokens: usize,
}

impl Session {
    /// Create a session over a loaded memory store.
    pub fn new(provider: Claude, memory: MemoryStore, model: String, max_tokens: usize) -> Self {
        Self {
            transcript: Transcript::new(),
            memory,
            provider,
            model,
            max_tokens,
        }
    }

    /// Run one conversational turn.
    ///
    /// The user message is appended before the network call and stays in
    /// the transcript even when the call fails; the caller reports the
    /// error and the session continues.
    pub async fn turn(&mut self, input: &str) -> Result<String> {
        self.transcript.push(Message::user(input));

        let system = format!("{SYSTEM_PROMPT}\n\nMemory: {}", self.memory.compile_context());
        let request = Request::new(&self.model, self.max_tokens)
            .system(system)
            .messages(self.transcript.messages());

        tracing::debug!(history = self.transcript.len(), "sending completion request");
        let raw = self.provider.send(&request).await?;
        let reply = interpret(&raw, &mut self.memory);
        self.transcript.push(Message::assistant(&reply));
        Ok(reply)
    }
}
