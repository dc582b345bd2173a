//! Client error types.

use calfeed_core::agenda::Language;
use calfeed_providers::FeedError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Feed could not be acquired.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(String),

    /// A command-line value did not parse.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested event does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ClientError {
    /// Returns the message shown to the user.
    ///
    /// Feed errors use the localized message for their code; the detailed
    /// message is left to the logs.
    pub fn user_message(&self, lang: Language) -> String {
        match self {
            Self::Feed(err) => err.user_message(lang).to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
