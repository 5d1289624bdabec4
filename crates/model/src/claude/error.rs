//! Typed failure for non-success completion responses.

use reqwest::StatusCode;

/// A non-success status from the completion endpoint.
///
/// Carried inside `anyhow::Error` so callers can downcast and inspect the
/// original status. The call must not be retried automatically.
#[derive(Debug, thiserror::Error)]
#[error("completion endpoint returned {status}: {body}")]
pub struct RemoteServiceError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The raw response body.
    pub body: String,
}
