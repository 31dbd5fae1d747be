//! Error types for qc-insight.

use thiserror::Error;

/// Result type alias using qc-insight's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// User notice shown when an inspection is attempted before any source is designated.
pub const NOTICE_NOT_CONNECTED: &str =
    "품질 판독을 위해 먼저 지식 베이스(구글 드라이브 자료)를 지정해야 합니다.";

/// User notice shown for any model invocation failure.
pub const NOTICE_ANALYSIS_FAILED: &str = "판독 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

/// Core error type for qc-insight operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Analysis attempted while no knowledge sources are designated
    #[error("Knowledge base not connected: designate reference sources before analysis")]
    NotConnected,

    /// Model invocation failed; subtypes are deliberately not distinguished
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Inference/generation failed at the provider
    #[error("Inference error: {0}")]
    Inference(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Image payload could not be decoded or is not an image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The fixed notice to surface to the inspector for this error, if any.
    ///
    /// Only the two user-facing kinds carry a notice; everything else is an
    /// operator problem and should be reported through logs.
    pub fn user_notice(&self) -> Option<&'static str> {
        match self {
            Error::NotConnected => Some(NOTICE_NOT_CONNECTED),
            Error::AnalysisFailed(_) => Some(NOTICE_ANALYSIS_FAILED),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
