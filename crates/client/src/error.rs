//! Errors surfaced by the social connection layer.

use socialpulse_shared::Platform;

#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    /// Missing or malformed input; the caller can fix it and retry.
    #[error("{0}")]
    Validation(String),
    /// The platform rejected the credentials.
    #[error("{0}")]
    Authentication(String),
    #[error("Platform {0} is not connected or missing username")]
    NotConnected(Platform),
    /// A later connect/login/disconnect for the same platform started before
    /// this operation finished; its result was discarded.
    #[error("{0} operation was superseded by a newer request")]
    Superseded(Platform),
}
