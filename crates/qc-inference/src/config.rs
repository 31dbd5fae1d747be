//! Inspector configuration.
//!
//! Configuration can be loaded from:
//! - TOML files (default: ~/.config/qc-insight/inspector.toml)
//! - Environment variables (`QC_*` prefixed, plus `GEMINI_API_KEY`)
//!
//! # Example
//!
//! ```rust,no_run
//! use qc_inference::config::InspectorConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = InspectorConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = InspectorConfig::from_file(std::path::Path::new("inspector.toml")).expect("Failed to load");
//! ```
//!
//! A config file looks like:
//!
//! ```toml
//! [inspector]
//! api_key = "${GEMINI_API_KEY}"
//! model = "gemini-3-flash-preview"
//! response_mode = "structured"
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use qc_core::defaults::{self, ENV_API_KEY, ENV_GEMINI_API_KEY};
use qc_core::{ResponseMode, SamplingParams};

use crate::gemini::GeminiConfig;
use crate::inspector::InspectorSettings;

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid regex"));

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Complete inspector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Base URL for the Gemini API.
    pub base_url: String,
    /// API key (optional so that `${VAR}` can be left unresolved in files).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Multimodal model name.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling mass.
    pub top_p: f32,
    /// Reply format requested from the model.
    pub response_mode: ResponseMode,
    /// Largest decoded image accepted, in bytes.
    pub max_image_bytes: usize,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GEMINI_URL.to_string(),
            api_key: None,
            model: defaults::VISION_MODEL.to_string(),
            timeout_secs: defaults::ANALYSIS_TIMEOUT_SECS,
            temperature: defaults::TEMPERATURE,
            top_p: defaults::TOP_P,
            response_mode: ResponseMode::default(),
            max_image_bytes: defaults::MAX_IMAGE_BYTES,
        }
    }
}

impl InspectorConfig {
    /// Get the default config file path.
    ///
    /// Returns: ~/.config/qc-insight/inspector.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("qc-insight");
        path.push("inspector.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading inspector config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            let config = Self::from_env();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a TOML file with an `[inspector]` table.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, substituting `${VAR}` references.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);

        #[derive(Deserialize)]
        struct TomlRoot {
            #[serde(default)]
            inspector: InspectorConfig,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        let mut config = root.inspector;

        // An unresolved placeholder is as good as no key.
        if config
            .api_key
            .as_deref()
            .is_some_and(|k| k.is_empty() || k.starts_with("${"))
        {
            config.api_key = None;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_env() -> Self {
        let base = Self::default();

        Self {
            base_url: env::var(defaults::ENV_GEMINI_URL).unwrap_or(base.base_url),
            api_key: env::var(ENV_GEMINI_API_KEY)
                .or_else(|_| env::var(ENV_API_KEY))
                .ok()
                .filter(|k| !k.is_empty()),
            model: env::var(defaults::ENV_GEMINI_MODEL).unwrap_or(base.model),
            timeout_secs: parse_env(defaults::ENV_TIMEOUT_SECS).unwrap_or(base.timeout_secs),
            temperature: parse_env(defaults::ENV_TEMPERATURE).unwrap_or(base.temperature),
            top_p: parse_env(defaults::ENV_TOP_P).unwrap_or(base.top_p),
            response_mode: parse_env(defaults::ENV_RESPONSE_MODE).unwrap_or(base.response_mode),
            max_image_bytes: parse_env(defaults::ENV_MAX_IMAGE_BYTES)
                .unwrap_or(base.max_image_bytes),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "base_url cannot be empty".to_string(),
            ));
        }

        // Basic URL validation
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation("model cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(format!(
                "temperature must be within [0, 2], got: {}",
                self.temperature
            )));
        }

        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ConfigError::Validation(format!(
                "top_p must be within (0, 1], got: {}",
                self.top_p
            )));
        }

        if self.max_image_bytes == 0 {
            return Err(ConfigError::Validation(
                "max_image_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Backend settings derived from this configuration.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout_seconds: self.timeout_secs,
        }
    }

    /// Pipeline settings derived from this configuration.
    pub fn inspector_settings(&self) -> InspectorSettings {
        InspectorSettings {
            sampling: SamplingParams {
                temperature: self.temperature,
                top_p: self.top_p,
            },
            response_mode: self.response_mode,
            max_image_bytes: self.max_image_bytes,
        }
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = InspectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.response_mode, ResponseMode::Tagged);
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.top_p, 0.9);
    }

    #[test]
    fn test_env_var_substitution_with_value() {
        let content = "api_key = \"${QC_TEST_SUBSTITUTION_VAR}\"";

        env::set_var("QC_TEST_SUBSTITUTION_VAR", "test-value");
        let result = InspectorConfig::substitute_env_vars(content);
        env::remove_var("QC_TEST_SUBSTITUTION_VAR");

        assert_eq!(result, "api_key = \"test-value\"");
    }

    #[test]
    fn test_env_var_substitution_missing() {
        let content = "api_key = \"${QC_NONEXISTENT_TEST_VAR_12345}\"";
        let result = InspectorConfig::substitute_env_vars(content);
        assert_eq!(result, "api_key = \"${QC_NONEXISTENT_TEST_VAR_12345}\"");
    }

    #[test]
    fn test_from_toml_partial_table_uses_defaults() {
        let config = InspectorConfig::from_toml_str(
            r#"
            [inspector]
            model = "gemini-2.5-flash"
            response_mode = "structured"
            "#,
        )
        .unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.response_mode, ResponseMode::Structured);
        assert_eq!(config.base_url, defaults::GEMINI_URL);
        assert_eq!(config.max_image_bytes, defaults::MAX_IMAGE_BYTES);
    }

    #[test]
    fn test_from_toml_unresolved_key_is_dropped() {
        let config = InspectorConfig::from_toml_str(
            "[inspector]\napi_key = \"${QC_UNSET_KEY_FOR_TEST_98765}\"\n",
        )
        .unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_from_toml_without_table() {
        let config = InspectorConfig::from_toml_str("").unwrap();
        assert_eq!(config.model, defaults::VISION_MODEL);
    }

    #[test]
    fn test_from_toml_rejects_bad_mode() {
        let err = InspectorConfig::from_toml_str("[inspector]\nresponse_mode = \"xml\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = InspectorConfig {
            base_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let config = InspectorConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_sampling_ranges() {
        let hot = InspectorConfig {
            temperature: 2.5,
            ..Default::default()
        };
        assert!(hot.validate().is_err());

        let zero_top_p = InspectorConfig {
            top_p: 0.0,
            ..Default::default()
        };
        assert!(zero_top_p.validate().is_err());
    }

    #[test]
    fn test_validate_zero_limits() {
        let no_timeout = InspectorConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(no_timeout.validate().is_err());

        let no_images = InspectorConfig {
            max_image_bytes: 0,
            ..Default::default()
        };
        assert!(no_images.validate().is_err());
    }

    #[test]
    fn test_derived_settings() {
        let config = InspectorConfig {
            api_key: Some("k".to_string()),
            temperature: 0.2,
            response_mode: ResponseMode::Structured,
            ..Default::default()
        };
        let gemini = config.gemini_config();
        assert_eq!(gemini.api_key.as_deref(), Some("k"));
        assert_eq!(gemini.timeout_seconds, config.timeout_secs);

        let settings = config.inspector_settings();
        assert_eq!(settings.sampling.temperature, 0.2);
        assert_eq!(settings.response_mode, ResponseMode::Structured);
    }

    #[test]
    fn test_serialize_config() {
        let serialized = toml::to_string(&InspectorConfig::default()).unwrap();
        assert!(serialized.contains("model"));
        assert!(serialized.contains("response_mode = \"tagged\""));
        assert!(!serialized.contains("api_key"));
    }
}
