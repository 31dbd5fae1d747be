//! # qc-core
//!
//! Core types, traits, and session state for qc-insight defect inspection.
//!
//! This crate provides the data contract shared by the inspection pipeline:
//! reference sources and the knowledge connection, analysis results and
//! inspection records, the collaborator traits for the vision model and the
//! source index, and the per-session context that gates analysis.

pub mod catalog;
pub mod defaults;
pub mod error;
pub mod image;
pub mod logging;
pub mod models;
pub mod session;
pub mod traits;

// Re-export commonly used types at crate root
pub use catalog::StaticSourceCatalog;
pub use error::{Error, Result};
pub use image::ImagePayload;
pub use models::*;
pub use session::SessionContext;
pub use traits::*;
