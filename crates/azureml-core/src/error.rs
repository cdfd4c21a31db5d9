//! Error types for Azure ML management operations.
//!
//! This module provides the error type shared by the management clients along
//! with the failure body the API returns on non-success responses.

use serde::Deserialize;
use thiserror::Error;

/// Main error type for Azure ML management operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The management API answered with a non-success status
    #[error("HTTP error {status}: {code} - {message}")]
    Http {
        /// Numeric HTTP status code
        status: u16,
        /// `error.code` from the response body
        code: String,
        /// `error.message` from the response body
        message: String,
    },

    /// Non-success status whose body carries no usable `error` object
    #[error("HTTP error {status} with unrecognised body: {body}")]
    MalformedErrorBody {
        /// Numeric HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// An operation needed data that the API call did not produce
    #[error("No data returned: {0}")]
    MissingData(String),

    /// A success response did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Specialized result type for Azure ML management operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build the error for a non-success response from its status and raw body.
    ///
    /// Bodies that do not decode as `{"error": {"code", "message"}}` become
    /// [`Error::MalformedErrorBody`] so the status is never lost.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        match ApiErrorResponse::from_body(body) {
            Some(response) => response.into_error(status),
            None => Self::MalformedErrorBody {
                status,
                body: body.to_string(),
            },
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http { .. } => "HTTP_ERROR",
            Self::MalformedErrorBody { .. } => "MALFORMED_ERROR_BODY",
            Self::MissingData(_) => "MISSING_DATA",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status carried by the error, if it came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::MalformedErrorBody { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `FAILURE ...` line logged when a response carries this error.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Http {
                status,
                code,
                message,
            } => Some(format!("FAILURE {status}: {code} - {message}")),
            Self::MalformedErrorBody { status, body } => Some(format!("FAILURE {status}: {body}")),
            _ => None,
        }
    }
}

/// Failure body returned by the management API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiErrorResponse {
    /// Error details
    pub error: ApiErrorDetail,
}

/// Error detail structure.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiErrorDetail {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiErrorResponse {
    /// Decode a failure body, returning `None` when it lacks `error.code` or
    /// `error.message`.
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Convert into an [`Error::Http`] for the given status.
    #[must_use]
    pub fn into_error(self, status: u16) -> Error {
        Error::Http {
            status,
            code: self.error.code,
            message: self.error.message,
        }
    }
}

// Conversions from external error types
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
