//! Structured result extraction from free-form model replies.
//!
//! The model is instructed to answer with four bracketed section headers in a
//! fixed order. Extraction scans for each header independently, so a reply
//! that omits, reorders, or mangles one section still yields the others.
//! Any section whose header cannot be found takes its fixed fallback text;
//! a header with an empty value yields an empty field. Extraction itself
//! never fails.
//!
//! The first three sections end at the first newline or the next `[`,
//! whichever comes first. The recommendations section runs to the end of the
//! text and keeps its internal line breaks.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use qc_core::{
    AnalysisResult, ResponseMode, FALLBACK_CATEGORY, FALLBACK_DEFECT_TYPE, FALLBACK_EVIDENCE,
    FALLBACK_RECOMMENDATIONS,
};

static DEFECT_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[결함 유형\]\s*:\s*(.*?)(?:\n|\[|$)").expect("valid regex"));
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[결함 카테고리\]\s*:\s*(.*?)(?:\n|\[|$)").expect("valid regex"));
static EVIDENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[유사 사례 근거\]\s*:\s*(.*?)(?:\n|\[|$)").expect("valid regex"));
static RECOMMENDATIONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[권장 조치 사항\]\s*:\s*(.*)").expect("valid regex"));

/// Result field names, in section order.
pub const FIELD_NAMES: [&str; 4] = ["defectType", "category", "evidence", "recommendations"];

/// An extracted result plus the fields that fell back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub result: AnalysisResult,
    /// Field names (see [`FIELD_NAMES`]) whose section was absent, or blank in a structured reply.
    pub missing: Vec<&'static str>,
    /// Whether the reply was read as schema-constrained JSON.
    pub structured: bool,
}

impl Extraction {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Extract the four-field report from tagged reply text.
///
/// # Examples
///
/// ```
/// use qc_inference::extract::extract_tagged;
///
/// let text = "[결함 유형]: 표면 스크래치\n[결함 카테고리]: 표면 결함\n\
///             [유사 사례 근거]: 매뉴얼 3장과 일치\n[권장 조치 사항]: 재연마 후 재검사\n2차 확인 필요";
/// let result = extract_tagged(text);
/// assert_eq!(result.defect_type, "표면 스크래치");
/// assert_eq!(result.recommendations, "재연마 후 재검사\n2차 확인 필요");
/// ```
pub fn extract_tagged(text: &str) -> AnalysisResult {
    scan_tagged(text).result
}

/// Extract according to the reply format that was requested.
///
/// Structured replies are read as JSON first and fall back to the tagged scan
/// when the text is not the expected JSON object.
pub fn extract(text: &str, mode: ResponseMode) -> Extraction {
    match mode {
        ResponseMode::Tagged => scan_tagged(text),
        ResponseMode::Structured => parse_structured(text).unwrap_or_else(|| scan_tagged(text)),
    }
}

/// Tagged-section scan with a report of which fields fell back.
pub fn scan_tagged(text: &str) -> Extraction {
    let fields = [
        capture(&DEFECT_TYPE_RE, text),
        capture(&CATEGORY_RE, text),
        capture(&EVIDENCE_RE, text),
        capture(&RECOMMENDATIONS_RE, text),
    ];
    assemble(fields, false)
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredReply {
    #[serde(default, alias = "defect_type")]
    defect_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    evidence: Option<String>,
    #[serde(default)]
    recommendations: Option<String>,
}

/// Read a schema-constrained JSON reply. `None` when the text is not a JSON
/// object carrying at least one of the four fields.
pub fn parse_structured(text: &str) -> Option<Extraction> {
    let reply: StructuredReply = serde_json::from_str(strip_code_fence(text)).ok()?;
    let fields = [
        reply.defect_type,
        reply.category,
        reply.evidence,
        reply.recommendations,
    ];
    if fields.iter().all(Option::is_none) {
        return None;
    }
    // Schema replies always carry every key; an empty string means no answer.
    let fields = fields.map(|f| {
        f.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    });
    Some(assemble(fields, true))
}

/// Remove a surrounding Markdown code fence (```json ... ```), if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn assemble(fields: [Option<String>; 4], structured: bool) -> Extraction {
    let [defect_type, category, evidence, recommendations] = fields;
    let mut missing = Vec::new();
    let mut take = |value: Option<String>, name: &'static str, fallback: &str| match value {
        Some(v) => v,
        None => {
            missing.push(name);
            fallback.to_string()
        }
    };

    let result = AnalysisResult {
        defect_type: take(defect_type, FIELD_NAMES[0], FALLBACK_DEFECT_TYPE),
        category: take(category, FIELD_NAMES[1], FALLBACK_CATEGORY),
        evidence: take(evidence, FIELD_NAMES[2], FALLBACK_EVIDENCE),
        recommendations: take(recommendations, FIELD_NAMES[3], FALLBACK_RECOMMENDATIONS),
    };

    Extraction {
        result,
        missing,
        structured,
    }
}
