//! Error types and HTTP response mapping

use serde::Serialize;
use thiserror::Error;

/// Result type alias for login operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Login error with HTTP status code mapping
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid return url: {message}")]
    InvalidReturnUrl { message: String },

    #[error("missing credential: {message}")]
    MissingCredential { message: String },

    #[error("validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("invalid assertion: {message}")]
    InvalidAssertion { message: String },

    #[error("profile fetch failed: {message}")]
    ProfileFetchFailed { message: String },

    #[error("invalid identifier: {message}")]
    InvalidIdentifier { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    pub fn invalid_return_url(message: impl Into<String>) -> Self {
        Self::InvalidReturnUrl {
            message: message.into(),
        }
    }

    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::MissingCredential {
            message: message.into(),
        }
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    pub fn invalid_assertion(message: impl Into<String>) -> Self {
        Self::InvalidAssertion {
            message: message.into(),
        }
    }

    pub fn profile_fetch_failed(message: impl Into<String>) -> Self {
        Self::ProfileFetchFailed {
            message: message.into(),
        }
    }

    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidReturnUrl { .. } => 400,
            Self::MissingCredential { .. } => 500,
            Self::ValidationFailed { .. } => 502,
            Self::InvalidAssertion { .. } => 401,
            Self::ProfileFetchFailed { .. } => 502,
            Self::InvalidIdentifier { .. } => 400,
            Self::Internal { .. } => 500,
        }
    }

    /// Get the stable error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::InvalidReturnUrl { .. } => "invalid_return_url",
            Self::MissingCredential { .. } => "missing_credential",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::InvalidAssertion { .. } => "invalid_assertion",
            Self::ProfileFetchFailed { .. } => "profile_fetch_failed",
            Self::InvalidIdentifier { .. } => "invalid_identifier",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Short phrase safe to show callers when debug output is disabled
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidReturnUrl { .. } => "the return URL is not acceptable",
            Self::MissingCredential { .. } => "the service is missing a credential",
            Self::ValidationFailed { .. } => "the login could not be validated",
            Self::InvalidAssertion { .. } => "the login assertion was rejected",
            Self::ProfileFetchFailed { .. } => "the player profile could not be fetched",
            Self::InvalidIdentifier { .. } => "the identifier is not a valid SteamID",
            Self::Internal { .. } => "an internal error occurred",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    /// Build the response body, surfacing the full cause only in debug mode
    pub fn from_error(err: &AuthError, debug: bool) -> Self {
        Self {
            error: err.error_key().to_string(),
            message: if debug {
                err.to_string()
            } else {
                err.public_message().to_string()
            },
        }
    }
}
