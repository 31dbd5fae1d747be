//! In-memory source catalog.
//!
//! Stands in for a real document index until one exists. The catalog is
//! injected into callers through [`SourceCatalog`]; nothing in the inspection
//! pipeline knows which implementation it talks to.

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ReferenceSource, SourceKind};
use crate::traits::SourceCatalog;

/// Catalog backed by a fixed list of sources.
#[derive(Debug, Clone, Default)]
pub struct StaticSourceCatalog {
    sources: Vec<ReferenceSource>,
}

impl StaticSourceCatalog {
    pub fn new(sources: Vec<ReferenceSource>) -> Self {
        Self { sources }
    }

    /// The simulated Drive archive offered by the setup flow.
    pub fn demo() -> Self {
        Self::new(vec![
            ReferenceSource::new("f1", "2024_생산라인_표준_매뉴얼", SourceKind::Folder)
                .with_last_modified("2024-12-01"),
            ReferenceSource::new("f2", "품질관리_결함_데이터베이스", SourceKind::Folder)
                .with_last_modified("2025-01-15"),
            ReferenceSource::new("ref1", "A구역_용접_불량_판독기준.pdf", SourceKind::Pdf)
                .with_size("2.4MB")
                .with_last_modified("2025-02-10"),
            ReferenceSource::new("ref2", "사출성형_기포_발생_사례.txt", SourceKind::Text)
                .with_size("15KB")
                .with_last_modified("2024-11-20"),
            ReferenceSource::new("ref3", "스크래치_허용_범위_이미지.img", SourceKind::Image)
                .with_size("4.1MB")
                .with_last_modified("2025-01-05"),
            ReferenceSource::new("ref4", "B라인_조립_체크리스트.pdf", SourceKind::Pdf)
                .with_size("1.2MB")
                .with_last_modified("2025-02-28"),
        ])
    }
}

#[async_trait]
impl SourceCatalog for StaticSourceCatalog {
    async fn list_available_sources(&self) -> Result<Vec<ReferenceSource>> {
        Ok(self.sources.clone())
    }

    async fn confirm_selection(&self, ids: &HashSet<String>) -> Result<Vec<ReferenceSource>> {
        if let Some(unknown) = ids
            .iter()
            .find(|id| !self.sources.iter().any(|s| &s.id == *id))
        {
            return Err(Error::NotFound(format!("reference source {}", unknown)));
        }

        let selected: Vec<ReferenceSource> = self
            .sources
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect();

        debug!(
            subsystem = "catalog",
            op = "confirm_selection",
            source_count = selected.len(),
            "Selection confirmed"
        );
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_demo_catalog_lists_six_sources() {
        let catalog = StaticSourceCatalog::demo();
        let sources = catalog.list_available_sources().await.unwrap();
        assert_eq!(sources.len(), 6);
        assert_eq!(sources[0].id, "f1");
        assert_eq!(sources[0].kind, SourceKind::Folder);
        assert!(sources[0].size.is_none());
        assert_eq!(sources[2].size.as_deref(), Some("2.4MB"));
    }

    #[tokio::test]
    async fn test_confirm_selection_keeps_catalog_order() {
        let catalog = StaticSourceCatalog::demo();
        let selected = catalog
            .confirm_selection(&ids(&["ref4", "f1", "ref2"]))
            .await
            .unwrap();
        let order: Vec<&str> = selected.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["f1", "ref2", "ref4"]);
    }

    #[tokio::test]
    async fn test_confirm_selection_unknown_id() {
        let catalog = StaticSourceCatalog::demo();
        let err = catalog
            .confirm_selection(&ids(&["f1", "ghost"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref msg) if msg.contains("ghost")));
    }

    #[tokio::test]
    async fn test_confirm_empty_selection() {
        let catalog = StaticSourceCatalog::demo();
        let selected = catalog.confirm_selection(&HashSet::new()).await.unwrap();
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_substring() {
        let catalog = StaticSourceCatalog::new(vec![
            ReferenceSource::new("a", "Weld_Criteria.pdf", SourceKind::Pdf),
            ReferenceSource::new("b", "assembly_checklist.pdf", SourceKind::Pdf),
        ]);
        let hits = catalog.search("weld").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }

    #[tokio::test]
    async fn test_search_korean_name() {
        let catalog = StaticSourceCatalog::demo();
        let hits = catalog.search("용접").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "ref1");
    }

    #[tokio::test]
    async fn test_blank_search_returns_everything() {
        let catalog = StaticSourceCatalog::demo();
        assert_eq!(catalog.search("   ").await.unwrap().len(), 6);
    }
}
