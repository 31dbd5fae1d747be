//! Prompt composition for defect analysis.
//!
//! Turns the designated reference sources into a grounding context and
//! combines it with the fixed QC-inspector system instruction and the image
//! into a [`VisionRequest`]. Construction is pure; nothing here performs I/O.

use qc_core::{ImagePayload, ReferenceSource, ResponseMode, SamplingParams, VisionRequest};
use serde_json::json;

/// Section header for the defect name.
pub const TAG_DEFECT_TYPE: &str = "[결함 유형]";
/// Section header for the defect category.
pub const TAG_CATEGORY: &str = "[결함 카테고리]";
/// Section header for the matching reference evidence.
pub const TAG_EVIDENCE: &str = "[유사 사례 근거]";
/// Section header for remediation steps (always the final section).
pub const TAG_RECOMMENDATIONS: &str = "[권장 조치 사항]";

/// Fixed system instruction. It enumerates the five defect categories and
/// mandates the four tagged sections in order; it never varies per call.
pub const SYSTEM_INSTRUCTION: &str = "당신은 품질 관리(QC) 판독 전문가입니다.
사용자가 업로드한 이미지를 분석하여 결함을 판별하는 것이 임무입니다.

[판독 기준]
- 반드시 연동된 구글 드라이브 아카이브 정보를 최우선 근거로 활용하십시오.
- 드라이브에는 공식 공정 매뉴얼, 결함 사례집, 품질 기준서가 포함되어 있습니다.
- 시각적 증거와 매뉴얼의 텍스트 설명을 대조하여 결론을 도출하십시오.

[결함 카테고리 분류 지침]
모든 결함은 다음 중 하나로 분류하십시오:
1. 표면 결함 (Surface Defects): 스크래치, 오염, 얼룩 등
2. 구조 결함 (Structural Defects): 크랙, 파손, 변형 등
3. 외관 결함 (Cosmetic Defects): 색상 불일치, 광택 불량 등
4. 치수 결함 (Dimensional Defects): 크기 오차, 간격 불량 등
5. 기타 결함 (Others): 위 카테고리에 속하지 않는 경우

[답변 필수 형식]
반드시 아래 태그를 사용하여 한국어로 답변하십시오:

[결함 유형]: (구체적인 결함 명칭)
[결함 카테고리]: (위에 정의된 5가지 카테고리 중 하나 선택)
[유사 사례 근거]: (연동된 드라이브 파일 중 어떤 기준이나 사례와 가장 일치하는지 설명)
[권장 조치 사항]: (품질 기준에 따른 현장 대응 지침 및 공정 개선 제안)";

/// Prompt used when no grounding sources are supplied.
pub const UNGROUNDED_PROMPT: &str =
    "다음 이미지의 품질 결함을 분석하고 판독 결과를 제공하십시오.";

/// Render sources as `[폴더] name, [파일] name, ...` in designation order.
pub fn describe_sources(sources: &[ReferenceSource]) -> String {
    sources
        .iter()
        .map(|s| format!("{} {}", s.kind.marker(), s.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Natural-language grounding context for the designated sources.
///
/// Returns `None` when there is nothing to ground on.
pub fn grounding_context(sources: &[ReferenceSource]) -> Option<String> {
    if sources.is_empty() {
        return None;
    }
    Some(format!(
        "사용자가 지정한 지식 베이스 소스 목록: {}. \
         AI는 위 파일들의 내용을 인덱싱하여 품질 판독의 최우선 기준으로 삼고 있습니다. \
         만약 이미지의 결함이 위 자료 중 어느 지침에 해당하는지 명확히 밝혀주십시오.",
        describe_sources(sources)
    ))
}

/// User-turn prompt embedding the grounding context.
pub fn compose_prompt(context: Option<&str>) -> String {
    match context {
        Some(context) => format!(
            "[연동 데이터 정보]\n{}\n\n위의 사내 아카이브 데이터를 기반으로 다음 이미지의 품질을 판독하십시오.",
            context
        ),
        None => UNGROUNDED_PROMPT.to_string(),
    }
}

/// JSON schema for structured replies; field descriptions mirror the tagged sections.
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "defectType": {
                "type": "STRING",
                "description": "구체적인 결함 명칭"
            },
            "category": {
                "type": "STRING",
                "description": "표면 결함, 구조 결함, 외관 결함, 치수 결함, 기타 결함 중 하나"
            },
            "evidence": {
                "type": "STRING",
                "description": "연동된 드라이브 파일 중 가장 일치하는 기준이나 사례"
            },
            "recommendations": {
                "type": "STRING",
                "description": "품질 기준에 따른 현장 대응 지침 및 공정 개선 제안"
            }
        },
        "required": ["defectType", "category", "evidence", "recommendations"],
        "propertyOrdering": ["defectType", "category", "evidence", "recommendations"]
    })
}

/// Compose the full model request for one image.
pub fn build_request(
    sources: &[ReferenceSource],
    image: ImagePayload,
    sampling: SamplingParams,
    mode: ResponseMode,
) -> VisionRequest {
    let context = grounding_context(sources);
    VisionRequest {
        image,
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        prompt: compose_prompt(context.as_deref()),
        sampling,
        response_schema: match mode {
            ResponseMode::Tagged => None,
            ResponseMode::Structured => Some(response_schema()),
        },
    }
}
