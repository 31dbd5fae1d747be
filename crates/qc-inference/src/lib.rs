//! # qc-inference
//!
//! Grounded defect analysis for qc-insight.
//!
//! This crate provides:
//! - Prompt composition from the designated reference sources
//! - Gemini vision backend (`generateContent` with an inline image)
//! - Tagged-section and structured (JSON) report extraction
//! - The [`DefectInspector`] pipeline that gates, analyzes, and records
//! - Inspector configuration from TOML or environment variables
//! - A scripted mock backend for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use qc_inference::{DefectInspector, GeminiVisionBackend, InspectorConfig, SessionContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = InspectorConfig::load()?;
//!     let backend = GeminiVisionBackend::new(config.gemini_config())?;
//!     let inspector = DefectInspector::new(Arc::new(backend), config.inspector_settings());
//!
//!     let mut session = SessionContext::new();
//!     // session.complete_setup(sources)?;
//!     let record = inspector.inspect(&mut session, "data:image/png;base64,...").await?;
//!     println!("{}", record.result.defect_type);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod extract;
pub mod gemini;
pub mod inspector;
pub mod mock;
pub mod prompt;

// Re-export core types
pub use qc_core::*;

pub use config::{ConfigError, InspectorConfig};
pub use extract::{extract, extract_tagged, Extraction};
pub use gemini::{GeminiConfig, GeminiVisionBackend};
pub use inspector::{DefectInspector, InspectorSettings};
pub use mock::MockVisionBackend;
