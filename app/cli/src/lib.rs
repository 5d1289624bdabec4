//! Courier CLI application — an interactive email-assistant agent backed by
//! the Anthropic Messages API, with a persistent key-value memory file.

pub use cli::Cli;
pub use repl::{Command, Repl};
pub use session::Session;

pub mod cli;
pub mod repl;
pub mod session;
