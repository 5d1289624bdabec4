//! Core types for the courier agent.
//!
//! Everything here is synchronous and network-free: the conversation
//! transcript, the file-backed memory store, and the interpreter for the
//! inline tool directives the model embeds in its replies.

pub use {
    directive::{Directive, Email, Kind, Token, interpret, tokenize},
    memory::MemoryStore,
    message::{Message, Role, Transcript},
};

mod directive;
mod memory;
mod message;
