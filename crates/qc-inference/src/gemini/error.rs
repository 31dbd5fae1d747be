//! Gemini-specific error handling.

use qc_core::Error;

/// Gemini error classes, from HTTP status and the `error.status` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Missing or rejected API key.
    AuthenticationError,
    /// Quota or rate limit exhausted.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Malformed request (bad image, schema, or parameters).
    InvalidArgument,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl GeminiErrorCode {
    /// Determine error code from HTTP status and error status string.
    pub fn from_response(status: u16, error_status: &str) -> Self {
        match (status, error_status) {
            (401, _) | (403, _) | (_, "UNAUTHENTICATED") | (_, "PERMISSION_DENIED") => {
                Self::AuthenticationError
            }
            (429, _) | (_, "RESOURCE_EXHAUSTED") => Self::RateLimitExceeded,
            (404, _) | (_, "NOT_FOUND") => Self::ModelNotFound,
            (400, _) | (_, "INVALID_ARGUMENT") | (_, "FAILED_PRECONDITION") => {
                Self::InvalidArgument
            }
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if this error is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::ServerError)
    }
}

/// Convert a Gemini error to a qc Error.
pub fn to_qc_error(code: GeminiErrorCode, message: &str) -> Error {
    match code {
        GeminiErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        GeminiErrorCode::RateLimitExceeded => {
            Error::Inference(format!("Rate limit exceeded: {}", message))
        }
        GeminiErrorCode::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        GeminiErrorCode::InvalidArgument => {
            Error::Inference(format!("Invalid request: {}", message))
        }
        GeminiErrorCode::ServerError => Error::Inference(format!("Server error: {}", message)),
        GeminiErrorCode::Unknown => Error::Inference(message.to_string()),
    }
}
