//! Centralized default constants for qc-insight.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates and binaries should reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// SESSION
// =============================================================================

/// Maximum inspection records kept in a session's history (newest first).
pub const HISTORY_LIMIT: usize = 50;

/// Prefix for inspection record identifiers.
pub const RECORD_ID_PREFIX: &str = "REC-";

// =============================================================================
// IMAGE
// =============================================================================

/// MIME type assumed when neither magic bytes nor the data-URI declare one.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Maximum decoded image size accepted for analysis (20 MiB, the inline-data ceiling).
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default Gemini API base URL.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Default multimodal model name.
pub const VISION_MODEL: &str = "gemini-3-flash-preview";

/// Near-deterministic temperature keeps the tagged reply format stable.
pub const TEMPERATURE: f32 = 0.1;

/// Nucleus sampling mass.
pub const TOP_P: f32 = 0.9;

/// Timeout for analysis requests in seconds.
pub const ANALYSIS_TIMEOUT_SECS: u64 = 120;

/// Timeout for health-check probes in seconds.
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Gemini API base URL override.
pub const ENV_GEMINI_URL: &str = "QC_GEMINI_URL";

/// Gemini API key.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Legacy API key variable, consulted when `GEMINI_API_KEY` is unset.
pub const ENV_API_KEY: &str = "API_KEY";

/// Model name override.
pub const ENV_GEMINI_MODEL: &str = "QC_GEMINI_MODEL";

/// Request timeout override (seconds).
pub const ENV_TIMEOUT_SECS: &str = "QC_TIMEOUT_SECS";

/// Sampling temperature override.
pub const ENV_TEMPERATURE: &str = "QC_TEMPERATURE";

/// Nucleus sampling override.
pub const ENV_TOP_P: &str = "QC_TOP_P";

/// Reply format: "tagged" or "structured".
pub const ENV_RESPONSE_MODE: &str = "QC_RESPONSE_MODE";

/// Maximum decoded image size override (bytes).
pub const ENV_MAX_IMAGE_BYTES: &str = "QC_MAX_IMAGE_BYTES";
