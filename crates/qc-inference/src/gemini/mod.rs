//! Gemini vision backend.
//!
//! Talks to the Gemini `generateContent` endpoint with one inline image plus
//! a text prompt, under a fixed system instruction and low-randomness
//! sampling.
//!
//! # Example
//!
//! ```rust,no_run
//! use qc_inference::gemini::{GeminiConfig, GeminiVisionBackend};
//! use qc_core::VisionBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GeminiConfig {
//!         api_key: std::env::var("GEMINI_API_KEY").ok(),
//!         ..Default::default()
//!     };
//!     let backend = GeminiVisionBackend::new(config).unwrap();
//!     assert!(backend.health_check().await.unwrap());
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{
    GeminiConfig, GeminiVisionBackend, DEFAULT_GEMINI_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
pub use error::{to_qc_error, GeminiErrorCode};
pub use types::*;
