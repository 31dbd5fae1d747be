//! Catalog → designation → recording flow without any model involved.

use std::collections::HashSet;

use qc_core::{
    AnalysisResult, Error, SessionContext, SourceCatalog, SourceKind, StaticSourceCatalog,
};

fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_designation_connects_session() {
    let catalog = StaticSourceCatalog::demo();
    let mut session = SessionContext::new();
    assert!(matches!(session.require_connected(), Err(Error::NotConnected)));

    let sources = catalog.confirm_selection(&ids(&["ref2", "f2"])).await.unwrap();
    session.complete_setup(sources).unwrap();

    let designated = session.require_connected().unwrap();
    assert_eq!(designated.len(), 2);
    assert_eq!(designated[0].kind, SourceKind::Folder);
    assert_eq!(designated[1].id, "ref2");
    assert!(session.connection().last_synced_at.is_some());
}

#[tokio::test]
async fn test_unknown_id_does_not_change_session() {
    let catalog = StaticSourceCatalog::demo();
    let mut session = SessionContext::new();

    let err = catalog
        .confirm_selection(&ids(&["ref1", "missing"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(!session.is_connected());

    let empty = catalog.confirm_selection(&HashSet::new()).await.unwrap();
    assert!(session.complete_setup(empty).is_err());
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_redesignation_replaces_sources_and_keeps_history() {
    let catalog = StaticSourceCatalog::demo();
    let mut session = SessionContext::new();

    session
        .complete_setup(catalog.confirm_selection(&ids(&["ref1"])).await.unwrap())
        .unwrap();
    session.record("data:image/png;base64,AAAA", AnalysisResult::default());

    session
        .complete_setup(catalog.confirm_selection(&ids(&["ref4"])).await.unwrap())
        .unwrap();

    let designated = session.require_connected().unwrap();
    assert_eq!(designated.len(), 1);
    assert_eq!(designated[0].id, "ref4");
    assert_eq!(session.history_len(), 1);
}

#[tokio::test]
async fn test_catalog_search() {
    let catalog = StaticSourceCatalog::demo();

    let pdfs = catalog.search(".PDF").await.unwrap();
    assert_eq!(pdfs.len(), 2);

    let all = catalog.search("   ").await.unwrap();
    assert_eq!(all.len(), 6);
}

#[test]
fn test_history_search_by_defect() {
    let mut session = SessionContext::new();
    let result = AnalysisResult {
        defect_type: "표면 스크래치".to_string(),
        category: "표면 결함".to_string(),
        ..Default::default()
    };
    session.record("data:image/png;base64,AAAA", result);
    session.record("data:image/png;base64,BBBB", AnalysisResult::default());

    let hits = session.search_history("스크래치");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].image_data, "data:image/png;base64,AAAA");
    assert_eq!(session.search_history("").len(), 2);
}
