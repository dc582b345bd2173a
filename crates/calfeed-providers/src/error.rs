//! Error types for feed acquisition.
//!
//! Only fetching a feed can fail in a way callers see. Parsing never fails:
//! malformed input is skipped and logged.

use std::fmt;

use calfeed_core::agenda::Language;
use thiserror::Error;

/// The category of a feed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedErrorCode {
    /// The request could not be sent or the body could not be read.
    RequestFailed,
    /// The server answered with a non-2xx status.
    BadStatus,
    /// The server answered 2xx with an empty body.
    EmptyResponse,
    /// The feed URL was rejected before any request was made.
    PolicyViolation,
}

impl FeedErrorCode {
    /// Returns the stable string code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestFailed => "request_failed",
            Self::BadStatus => "bad_status",
            Self::EmptyResponse => "empty_response",
            Self::PolicyViolation => "policy_violation",
        }
    }

    /// Returns the message shown to end users for this code.
    pub fn user_message(&self, lang: Language) -> &'static str {
        match (lang, self) {
            (Language::En, Self::RequestFailed) => "Unable to download calendar feed.",
            (Language::En, Self::BadStatus) => "Calendar URL returned an invalid HTTP status.",
            (Language::En, Self::EmptyResponse) => "Calendar response is empty.",
            (Language::En, Self::PolicyViolation) => {
                "Calendar URL does not comply with the allowed URL policy."
            }
            (Language::Es, Self::RequestFailed) => "No se pudo descargar el calendario.",
            (Language::Es, Self::BadStatus) => {
                "La URL del calendario devolvió un estado HTTP inválido."
            }
            (Language::Es, Self::EmptyResponse) => "La respuesta del calendario está vacía.",
            (Language::Es, Self::PolicyViolation) => {
                "La URL del calendario no cumple con la política de seguridad permitida."
            }
        }
    }
}

impl fmt::Display for FeedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while acquiring a feed.
#[derive(Debug, Error)]
pub struct FeedError {
    code: FeedErrorCode,
    message: String,
    /// HTTP status, when a response was received.
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FeedError {
    /// Creates a new feed error with the given code and message.
    pub fn new(code: FeedErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a request failure.
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::RequestFailed, message)
    }

    /// Creates a bad status error carrying the HTTP status.
    pub fn bad_status(status: u16) -> Self {
        Self::new(FeedErrorCode::BadStatus, format!("HTTP status {}", status)).with_status(status)
    }

    /// Creates an empty response error.
    pub fn empty_response(status: u16) -> Self {
        Self::new(FeedErrorCode::EmptyResponse, "Response body is empty").with_status(status)
    }

    /// Creates a policy violation with the rejection reason as message.
    pub fn policy_violation(reason: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::PolicyViolation, reason)
    }

    /// Sets the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> FeedErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the localized end-user message.
    pub fn user_message(&self, lang: Language) -> &'static str {
        self.code.user_message(lang)
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
