//! Core traits for qc-insight collaborators.
//!
//! These traits define the seams between the inspection core and the outside
//! world (the vision model and the designated-source index), enabling
//! pluggable backends and testability.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::Result;
use crate::models::{ReferenceSource, VisionRequest};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend that answers a multimodal (image + text) request with free text.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Submit a composed request and return the raw reply text.
    ///
    /// Returns an empty string when the provider answers without text.
    async fn generate(&self, request: &VisionRequest) -> Result<String>;

    /// Check if the backend is available and responding.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// SOURCE DESIGNATION TRAITS
// =============================================================================

/// Index of reference items a user can designate as grounding sources.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    /// All designatable sources, in display order.
    async fn list_available_sources(&self) -> Result<Vec<ReferenceSource>>;

    /// Resolve a set of selected ids into sources, in catalog order.
    async fn confirm_selection(&self, ids: &HashSet<String>) -> Result<Vec<ReferenceSource>>;

    /// Sources whose name contains `query` (case-insensitive).
    async fn search(&self, query: &str) -> Result<Vec<ReferenceSource>> {
        let needle = query.trim().to_lowercase();
        let sources = self.list_available_sources().await?;
        if needle.is_empty() {
            return Ok(sources);
        }
        Ok(sources
            .into_iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect())
    }
}
