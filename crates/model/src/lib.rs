//! LLM provider implementations for courier.

pub use claude::{Claude, ENDPOINT, RemoteServiceError, Request};

mod claude;
