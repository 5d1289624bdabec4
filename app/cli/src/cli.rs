//! CLI argument parsing and startup configuration.

use crate::repl::Repl;
use crate::session::Session;
use anyhow::{Context, Result};
use clap::Parser;
use courier_core::MemoryStore;
use courier_model::Claude;
use std::path::PathBuf;

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Courier email-assistant agent.
#[derive(Parser, Debug)]
#[command(name = "courier", about = "Email-assistant agent with persistent memory")]
pub struct Cli {
    /// Model identifier.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Path of the key=value memory file.
    #[arg(long, default_value = "memory.txt")]
    pub memory_file: PathBuf,

    /// Maximum tokens per completion.
    #[arg(long, default_value_t = 1024)]
    pub max_tokens: usize,

    /// Anthropic-compatible endpoint override.
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl Cli {
    /// Build the session and enter the interactive REPL.
    pub async fn run(self) -> Result<()> {
        let key = api_key()?;
        let provider = match &self.endpoint {
            Some(endpoint) => Claude::custom(&key, endpoint)?,
            None => Claude::anthropic(&key)?,
        };
        let memory = MemoryStore::load(&self.memory_file);
        let session = Session::new(provider, memory, self.model, self.max_tokens);
        Repl::new(session)?.run().await
    }
}

/// Read the API credential from the environment.
///
/// A missing credential is startup-fatal.
fn api_key() -> Result<String> {
    std::env::var("ANTHROPIC_API_KEY")
        .context("ANTHROPIC_API_KEY is not set; export it before starting courier")
}
