//! Interactive REPL with reserved command words and persistent input history.

use crate::session::Session;
use anyhow::Result;
use courier_core::{MemoryStore, Role, Transcript};
use rustyline::error::ReadlineError;
use std::path::PathBuf;

/// What to do with one line of user input.
///
/// Reserved command words are matched case-insensitively after trimming;
/// anything else is a message for the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Exit the session.
    Quit,
    /// Clear the conversation transcript only.
    Clear,
    /// Display stored memory entries.
    Memory,
    /// Clear the memory store and persist the empty file.
    Forget,
    /// Display the conversation transcript.
    History,
    /// Forward to the model.
    Message(&'a str),
}

impl<'a> Command<'a> {
    /// Classify one line of input.
    pub fn parse(line: &'a str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "quit" => Self::Quit,
            "clear" => Self::Clear,
            "memory" => Self::Memory,
            "forget" => Self::Forget,
            "history" => Self::History,
            _ => Self::Message(line),
        }
    }
}

/// Interactive chat REPL over a [`Session`].
pub struct Repl {
    session: Session,
    editor: rustyline::DefaultEditor,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a REPL, loading readline history if present.
    pub fn new(session: Session) -> Result<Self> {
        let mut editor = rustyline::DefaultEditor::new()?;
        let history_path = history_file_path();
        if let Some(ref path) = history_path {
            let _ = editor.load_history(path);
        }
        Ok(Self {
            session,
            editor,
            history_path,
        })
    }

    /// Run the interactive loop until `quit` or Ctrl+D.
    pub async fn run(&mut self) -> Result<()> {
        println!("Courier email assistant");
        println!("Commands: quit, clear, memory, forget, history (Ctrl+D to exit)");
        println!("Try: I want to send happy birthday wishes to a friend");
        println!("---");

        loop {
            match self.editor.readline("you> ") {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(&line);
                    if !self.dispatch(&line).await {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        self.save_history();
        println!("Goodbye!");
        Ok(())
    }

    /// Handle one line of input. Returns false when the session should end.
    ///
    /// A failed turn is reported and the loop continues; the user message
    /// that triggered it stays in the transcript.
    async fn dispatch(&mut self, line: &str) -> bool {
        match Command::parse(line) {
            Command::Quit => return false,
            Command::Clear => {
                self.session.transcript.clear();
                println!("Conversation cleared.");
            }
            Command::Memory => show_memory(&self.session.memory),
            Command::Forget => {
                self.session.memory.clear();
                println!("Memory cleared.");
            }
            Command::History => show_history(&self.session.transcript),
            Command::Message(text) => match self.session.turn(text).await {
                Ok(reply) => println!("\ncourier> {reply}\n"),
                Err(e) => eprintln!("Error: {e:#}"),
            },
        }
        true
    }

    /// Save readline history to disk.
    fn save_history(&mut self) {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }
    }
}

/// Resolve the readline history path at `~/.config/courier/history`.
fn history_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("courier").join("history"))
}

fn show_memory(memory: &MemoryStore) {
    if memory.is_empty() {
        println!("No memory entries.");
        return;
    }
    for (key, value) in memory.entries() {
        println!("  {key}: {}", preview(value, 80));
    }
}

fn show_history(transcript: &Transcript) {
    if transcript.is_empty() {
        println!("No history.");
        return;
    }
    for message in transcript.messages() {
        let role = match message.role {
            Role::User => "you",
            Role::Assistant => "courier",
        };
        println!("  {role}: {}", preview(&message.content, 150));
    }
}

/// Truncate long values for display.
fn preview(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let end = value
        .char_indices()
        .nth(max - 3)
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    format!("{}...", &value[..end])
}
