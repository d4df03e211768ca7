//! Error types for token acquisition and API calls
//!
//! Every failure is returned as a value. [`ApiError::kind`] gives callers a
//! flat tag to branch on without matching nested variants.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while obtaining an access token
#[derive(Debug, Error)]
pub enum AuthError {
    /// Consumer key or secret has not been configured
    #[error("Must specify consumer key and secret")]
    MissingCredentials,

    /// The token endpoint could not be reached
    #[error("Token request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The token endpoint answered with a non-success status
    #[error("Token endpoint returned status {0}")]
    Status(StatusCode),

    /// The token response was not the expected JSON document
    #[error("Failed to parse token response: {0}")]
    Parse(#[from] serde_json::Error),

    /// An exchange this caller was waiting on failed
    #[error("Token exchange failed: {message}")]
    ExchangeFailed {
        /// Kind of the original failure
        kind: ErrorKind,
        /// Message of the original failure
        message: String,
    },
}

/// Errors returned from [`crate::client::ApiClient::call`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request options or helper arguments are malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Obtaining a token failed and no cached response was usable
    #[error("Error getting access token: {0}")]
    Auth(#[from] AuthError),

    /// The API could not be reached
    #[error("API call error: {0}")]
    Network(#[source] reqwest::Error),

    /// The API returned something other than 200
    #[error("API returned non-200 status code: {0}")]
    NonSuccessStatus(StatusCode),

    /// The API response body was not valid JSON
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Flat classification of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request options or helper arguments
    InvalidArgument,
    /// Credentials are not configured
    Config,
    /// An endpoint could not be reached
    Network,
    /// An endpoint answered with an unexpected status
    NonSuccessStatus,
    /// A response body was not the expected JSON
    Parse,
}

impl AuthError {
    /// Returns the kind of failure this token error represents
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingCredentials => ErrorKind::Config,
            AuthError::Network(_) => ErrorKind::Network,
            AuthError::Status(_) => ErrorKind::NonSuccessStatus,
            AuthError::Parse(_) => ErrorKind::Parse,
            AuthError::ExchangeFailed { kind, .. } => *kind,
        }
    }
}

impl ApiError {
    /// Returns the kind of failure, looking through token errors
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ApiError::Auth(e) => e.kind(),
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::NonSuccessStatus(_) => ErrorKind::NonSuccessStatus,
            ApiError::Parse(_) => ErrorKind::Parse,
        }
    }

    /// Whether the error points at a programming or setup mistake rather
    /// than a transient outage. Such errors never fall back to the cache.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument | ErrorKind::Config)
    }
}
