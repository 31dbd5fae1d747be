//! Gemini vision backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use qc_core::defaults::{ANALYSIS_TIMEOUT_SECS, GEMINI_URL, HEALTH_TIMEOUT_SECS, VISION_MODEL};
use qc_core::{Error, Result, VisionBackend, VisionRequest};

use super::error::{to_qc_error, GeminiErrorCode};
use super::types::*;

/// Default Gemini API endpoint.
pub const DEFAULT_GEMINI_URL: &str = GEMINI_URL;

/// Default multimodal model.
pub const DEFAULT_MODEL: &str = VISION_MODEL;

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = ANALYSIS_TIMEOUT_SECS;

/// API version path segment.
const API_VERSION: &str = "v1beta";

/// Configuration for the Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key, sent as `x-goog-api-key`.
    pub api_key: Option<String>,
    /// Model to use for analysis.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Gemini `generateContent` vision backend.
pub struct GeminiVisionBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiVisionBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            warn!("Gemini backend created without an API key; requests will be rejected");
        }

        info!(
            "Initializing Gemini backend: url={}, model={}",
            config.base_url, config.model
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(crate::config::InspectorConfig::from_env().gemini_config())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn model_url(&self, suffix: &str) -> String {
        format!(
            "{}/{}/models/{}{}",
            self.config.base_url.trim_end_matches('/'),
            API_VERSION,
            self.config.model,
            suffix
        )
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("x-goog-api-key", api_key),
            None => req,
        }
    }
}

#[async_trait]
impl VisionBackend for GeminiVisionBackend {
    #[instrument(skip(self, request), fields(subsystem = "inference", component = "gemini", op = "generate", model = %self.config.model, prompt_len = request.prompt.len(), image_bytes = request.image.len()))]
    async fn generate(&self, request: &VisionRequest) -> Result<String> {
        let start = Instant::now();
        let body = GenerateContentRequest::from(request);

        debug!(
            structured = request.response_schema.is_some(),
            mime_type = %request.image.mime_type,
            "Sending generateContent request"
        );

        let response = self
            .with_auth(self.client.post(self.model_url(":generateContent")))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let raw = response.text().await.unwrap_or_default();
            let (error_status, message) = match serde_json::from_str::<GeminiErrorResponse>(&raw) {
                Ok(parsed) => (parsed.error.status, parsed.error.message),
                Err(_) => (String::new(), raw),
            };
            let code = GeminiErrorCode::from_response(status.as_u16(), &error_status);
            warn!(
                status = status.as_u16(),
                error_status = %error_status,
                retryable = code.is_retryable(),
                "Gemini returned an error"
            );
            return Err(to_qc_error(
                code,
                &format!("Gemini returned {}: {}", status, message),
            ));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        if let Some(reason) = result.block_reason() {
            warn!(block_reason = reason, "Gemini blocked the prompt; no text returned");
        }

        let text = result.text();
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = text.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 30_000 {
            warn!(duration_ms = elapsed, slow = true, "Slow analysis request");
        }
        Ok(text)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .with_auth(self.client.get(self.model_url("")))
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    info!("Gemini health check passed");
                    Ok(true)
                } else {
                    warn!("Gemini health check failed: {}", resp.status());
                    Ok(false)
                }
            }
            Err(e) => {
                warn!("Gemini health check error: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();
        assert_eq!(config.base_url, DEFAULT_GEMINI_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_backend_creation() {
        let backend = GeminiVisionBackend::new(GeminiConfig::default()).unwrap();
        assert_eq!(backend.config().base_url, DEFAULT_GEMINI_URL);
        assert_eq!(backend.model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_model_url() {
        let backend = GeminiVisionBackend::new(GeminiConfig {
            base_url: "http://localhost:8080/".to_string(),
            model: "gemini-test".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            backend.model_url(":generateContent"),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(
            backend.model_url(""),
            "http://localhost:8080/v1beta/models/gemini-test"
        );
    }
}
