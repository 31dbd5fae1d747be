//! Core data models for qc-insight.
//!
//! These types are shared across qc-insight crates and represent the
//! inspection domain: designated reference sources, the knowledge connection,
//! analysis results, and the records kept in session history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::image::ImagePayload;

// =============================================================================
// REFERENCE SOURCES
// =============================================================================

/// Kind of a designated reference item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Image,
    Text,
    Pdf,
    Folder,
}

impl SourceKind {
    /// Bracketed marker used when listing the source in a grounding context.
    pub fn marker(&self) -> &'static str {
        match self {
            SourceKind::Folder => "[폴더]",
            SourceKind::Image | SourceKind::Text | SourceKind::Pdf => "[파일]",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Text => write!(f, "text"),
            Self::Pdf => write!(f, "pdf"),
            Self::Folder => write!(f, "folder"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "text" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            "folder" => Ok(Self::Folder),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}

/// A user-designated grounding item (file or folder descriptor).
///
/// Only the name and kind ever reach the model; content is never fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSource {
    pub id: String,
    pub name: String,
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl ReferenceSource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            size: None,
            last_modified: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_last_modified(mut self, date: impl Into<String>) -> Self {
        self.last_modified = Some(date.into());
        self
    }
}

/// Connection state between a session and its designated knowledge sources.
///
/// `connected == false` implies `sources` is empty. Only
/// [`SessionContext::complete_setup`](crate::session::SessionContext::complete_setup)
/// moves it to the connected state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeConnection {
    pub connected: bool,
    pub sources: Vec<ReferenceSource>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

// =============================================================================
// ANALYSIS RESULTS
// =============================================================================

/// Defect type substituted when the reply carries no `[결함 유형]` section.
pub const FALLBACK_DEFECT_TYPE: &str = "미판별 (분석 데이터 부족)";

/// Category substituted when the reply carries no `[결함 카테고리]` section.
pub const FALLBACK_CATEGORY: &str = "미분류";

/// Evidence substituted when the reply carries no `[유사 사례 근거]` section.
pub const FALLBACK_EVIDENCE: &str = "드라이브 데이터와 일치하는 사례를 찾을 수 없음";

/// Recommendations substituted when the reply carries no `[권장 조치 사항]` section.
pub const FALLBACK_RECOMMENDATIONS: &str = "현장 관리자 확인 필요";

/// Four-field defect report extracted from a model reply.
///
/// Every field is always populated; absent sections take the fixed fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub defect_type: String,
    pub category: String,
    pub evidence: String,
    pub recommendations: String,
}

impl Default for AnalysisResult {
    /// The all-fallback result, as produced from a reply with no recognizable sections.
    fn default() -> Self {
        Self {
            defect_type: FALLBACK_DEFECT_TYPE.to_string(),
            category: FALLBACK_CATEGORY.to_string(),
            evidence: FALLBACK_EVIDENCE.to_string(),
            recommendations: FALLBACK_RECOMMENDATIONS.to_string(),
        }
    }
}

/// One completed inspection kept in session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    pub id: String,
    pub captured_at: DateTime<Utc>,
    /// The inspected image as a data-URI string.
    pub image_data: String,
    pub result: AnalysisResult,
}

// =============================================================================
// MODEL REQUESTS
// =============================================================================

/// Sampling parameters sent with every analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: crate::defaults::TEMPERATURE,
            top_p: crate::defaults::TOP_P,
        }
    }
}

/// Reply format requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Free text with bracketed section headers.
    #[default]
    Tagged,
    /// Schema-constrained JSON, with the tagged scan as fallback.
    Structured,
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tagged => write!(f, "tagged"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tagged" | "text" => Ok(Self::Tagged),
            "structured" | "json" => Ok(Self::Structured),
            _ => Err(format!("Unknown response mode: {}", s)),
        }
    }
}

/// A fully composed multimodal request, independent of any vendor wire format.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub image: ImagePayload,
    pub system_instruction: String,
    pub prompt: String,
    pub sampling: SamplingParams,
    /// JSON schema for structured replies; `None` requests free text.
    pub response_schema: Option<serde_json::Value>,
}
