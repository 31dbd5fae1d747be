//! Gemini `generateContent` request and response types.

use serde::{Deserialize, Serialize};

use qc_core::VisionRequest;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request body for the `models/{model}:generateContent` endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl From<&VisionRequest> for GenerateContentRequest {
    fn from(request: &VisionRequest) -> Self {
        let structured = request.response_schema.is_some();
        Self {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(&request.system_instruction)],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::inline_data(&request.image.mime_type, request.image.to_base64()),
                    Part::text(&request.prompt),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: request.sampling.temperature,
                top_p: request.sampling.top_p,
                response_mime_type: structured.then(|| "application/json".to_string()),
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

/// A role-tagged list of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of a content: text or inline binary data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set on reasoning summaries, which are not part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: String) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
            ..Default::default()
        }
    }
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Sampling and output-format settings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Response from the `generateContent` endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Answer text of the first candidate; empty when the provider returned none.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought.unwrap_or(false))
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Reason the prompt was blocked, if any.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }
}

/// A single generated candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Safety feedback about the prompt itself.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error response from the Gemini API.
#[derive(Debug, Deserialize)]
pub struct GeminiErrorResponse {
    pub error: GeminiError,
}

/// Detailed error information.
#[derive(Debug, Deserialize)]
pub struct GeminiError {
    #[serde(default)]
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub status: String,
}
