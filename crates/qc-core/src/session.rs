//! Per-session inspection state.
//!
//! A [`SessionContext`] owns the knowledge connection and the bounded
//! inspection history for one user session. It starts disconnected with an
//! empty history and is discarded as a whole when the session ends; nothing
//! is persisted.
//!
//! ```text
//!   Disconnected ──complete_setup(non-empty)──▶ Connected
//!                                               │    ▲
//!                                               └────┘ complete_setup replaces sources
//! ```

use chrono::Utc;
use std::collections::VecDeque;
use tracing::{info, warn};

use crate::defaults::{HISTORY_LIMIT, RECORD_ID_PREFIX};
use crate::error::{Error, Result};
use crate::models::{AnalysisResult, InspectionRecord, KnowledgeConnection, ReferenceSource};

/// Connection state and bounded history for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    connection: KnowledgeConnection,
    history: VecDeque<InspectionRecord>,
}

impl SessionContext {
    /// Create a disconnected session with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection(&self) -> &KnowledgeConnection {
        &self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection.connected
    }

    /// Designate the grounding sources and mark the session connected.
    ///
    /// Replaces any previous designation and stamps `last_synced_at`. An
    /// empty designation is refused and leaves the session unchanged.
    pub fn complete_setup(&mut self, sources: Vec<ReferenceSource>) -> Result<()> {
        if sources.is_empty() {
            return Err(Error::InvalidInput(
                "at least one reference source must be designated".to_string(),
            ));
        }

        info!(
            subsystem = "session",
            op = "complete_setup",
            source_count = sources.len(),
            reconnect = self.connection.connected,
            "Knowledge sources designated"
        );

        self.connection = KnowledgeConnection {
            connected: true,
            sources,
            last_synced_at: Some(Utc::now()),
        };
        Ok(())
    }

    /// The designated sources, or [`Error::NotConnected`] before setup.
    pub fn require_connected(&self) -> Result<&[ReferenceSource]> {
        if !self.connection.connected {
            warn!(
                subsystem = "session",
                op = "require_connected",
                "Inspection refused: no knowledge sources designated"
            );
            return Err(Error::NotConnected);
        }
        Ok(&self.connection.sources)
    }

    /// Store a completed inspection at the front of history.
    ///
    /// History keeps at most [`HISTORY_LIMIT`] records; the oldest are dropped.
    pub fn record(
        &mut self,
        image_data: impl Into<String>,
        result: AnalysisResult,
    ) -> &InspectionRecord {
        let record = InspectionRecord {
            id: format!("{}{}", RECORD_ID_PREFIX, uuid::Uuid::now_v7().simple()),
            captured_at: Utc::now(),
            image_data: image_data.into(),
            result,
        };

        self.history.push_front(record);
        self.history.truncate(HISTORY_LIMIT);

        let newest = &self.history[0];
        info!(
            subsystem = "session",
            op = "record",
            record_id = %newest.id,
            history_len = self.history.len(),
            "Inspection recorded"
        );
        newest
    }

    /// Inspection history, newest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &InspectionRecord> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn latest(&self) -> Option<&InspectionRecord> {
        self.history.front()
    }

    /// Records whose id, defect type, or category contains `query` (case-insensitive).
    pub fn search_history(&self, query: &str) -> Vec<&InspectionRecord> {
        let needle = query.trim().to_lowercase();
        self.history
            .iter()
            .filter(|r| {
                needle.is_empty()
                    || r.id.to_lowercase().contains(&needle)
                    || r.result.defect_type.to_lowercase().contains(&needle)
                    || r.result.category.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    fn sources() -> Vec<ReferenceSource> {
        vec![
            ReferenceSource::new("f1", "2024_생산라인_표준_매뉴얼", SourceKind::Folder),
            ReferenceSource::new("ref1", "A구역_용접_불량_판독기준.pdf", SourceKind::Pdf),
        ]
    }

    fn result(defect: &str, category: &str) -> AnalysisResult {
        AnalysisResult {
            defect_type: defect.to_string(),
            category: category.to_string(),
            evidence: "매뉴얼 3장과 일치".to_string(),
            recommendations: "재검사".to_string(),
        }
    }

    #[test]
    fn test_new_session_is_disconnected() {
        let session = SessionContext::new();
        assert!(!session.is_connected());
        assert!(session.connection().sources.is_empty());
        assert!(session.connection().last_synced_at.is_none());
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn test_require_connected_before_setup() {
        let session = SessionContext::new();
        assert!(matches!(
            session.require_connected(),
            Err(Error::NotConnected)
        ));
    }

    #[test]
    fn test_complete_setup_connects() {
        let mut session = SessionContext::new();
        session.complete_setup(sources()).unwrap();

        assert!(session.is_connected());
        assert_eq!(session.connection().sources, sources());
        assert!(session.connection().last_synced_at.is_some());
        assert_eq!(session.require_connected().unwrap(), sources().as_slice());
    }

    #[test]
    fn test_empty_setup_is_refused() {
        let mut session = SessionContext::new();
        let err = session.complete_setup(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!session.is_connected());
        assert!(session.connection().last_synced_at.is_none());
    }

    #[test]
    fn test_reconnect_replaces_sources_and_stays_connected() {
        let mut session = SessionContext::new();
        session.complete_setup(sources()).unwrap();
        let first_sync = session.connection().last_synced_at;

        let replacement = vec![ReferenceSource::new(
            "ref4",
            "B라인_조립_체크리스트.pdf",
            SourceKind::Pdf,
        )];
        session.complete_setup(replacement.clone()).unwrap();

        assert!(session.is_connected());
        assert_eq!(session.connection().sources, replacement);
        assert!(session.connection().last_synced_at >= first_sync);

        // An empty re-designation never disconnects.
        assert!(session.complete_setup(Vec::new()).is_err());
        assert!(session.is_connected());
        assert_eq!(session.connection().sources, replacement);
    }

    #[test]
    fn test_record_prepends() {
        let mut session = SessionContext::new();
        session.record("data:image/jpeg;base64,AAAA", result("스크래치", "표면 결함"));
        session.record("data:image/jpeg;base64,BBBB", result("크랙", "구조 결함"));

        let defects: Vec<&str> = session
            .history()
            .map(|r| r.result.defect_type.as_str())
            .collect();
        assert_eq!(defects, vec!["크랙", "스크래치"]);
        assert_eq!(session.latest().unwrap().image_data, "data:image/jpeg;base64,BBBB");
    }

    #[test]
    fn test_record_ids_are_unique_and_prefixed() {
        let mut session = SessionContext::new();
        for _ in 0..5 {
            session.record("data:,", AnalysisResult::default());
        }
        let ids: std::collections::HashSet<&str> =
            session.history().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.iter().all(|id| id.starts_with(RECORD_ID_PREFIX)));
    }

    #[test]
    fn test_history_is_capped_newest_first() {
        let mut session = SessionContext::new();
        for i in 0..=HISTORY_LIMIT {
            session.record(format!("img-{}", i), result(&format!("defect-{}", i), "기타 결함"));
        }

        assert_eq!(session.history_len(), HISTORY_LIMIT);
        let newest = session.latest().unwrap();
        assert_eq!(newest.result.defect_type, format!("defect-{}", HISTORY_LIMIT));
        // The very first record was evicted, the second survives at the tail.
        assert!(session.history().all(|r| r.image_data != "img-0"));
        assert_eq!(session.history().last().unwrap().image_data, "img-1");
    }

    #[test]
    fn test_search_history() {
        let mut session = SessionContext::new();
        session.record("a", result("표면 스크래치", "표면 결함"));
        session.record("b", result("용접 크랙", "구조 결함"));
        session.record("c", result("색상 불일치", "외관 결함"));

        assert_eq!(session.search_history("구조").len(), 1);
        assert_eq!(session.search_history("스크래치")[0].image_data, "a");
        assert_eq!(session.search_history("").len(), 3);
        assert!(session.search_history("치수").is_empty());

        let id = session.latest().unwrap().id.to_lowercase();
        assert_eq!(session.search_history(&id).len(), 1);
    }
}
