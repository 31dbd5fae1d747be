//! Structured logging schema and field name constants for qc-insight.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation can query inspections across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, fallback value substituted, precondition refused |
//! | INFO  | Setup completed, inspection recorded |
//! | DEBUG | Request composition, reply sizes, extraction decisions |
//! | TRACE | Per-field extraction detail (never image data) |
//!
//! ## Usage
//!
//! `tracing` macros take field keys as bare identifiers, so call sites spell
//! the key out (`subsystem = "session"`). These constants are the schema on
//! the consuming side: log queries, dashboards, and tests build on them.
//!
//! ```
//! use qc_core::logging::{OPERATION, SUBSYSTEM};
//!
//! let selector = format!("{{{}=\"session\", {}=\"record\"}}", SUBSYSTEM, OPERATION);
//! assert_eq!(selector, "{subsystem=\"session\", op=\"record\"}");
//! ```

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "session", "inference", "catalog", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "gemini", "inspector", "extractor"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "analyze", "inspect", "complete_setup"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Inspection record identifier.
pub const RECORD_ID: &str = "record_id";

/// Number of designated reference sources.
pub const SOURCE_COUNT: &str = "source_count";

/// Number of records held in session history.
pub const HISTORY_LEN: &str = "history_len";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

/// Decoded image size in bytes.
pub const IMAGE_BYTES: &str = "image_bytes";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Tagged sections absent from a reply (fallbacks substituted).
pub const MISSING_FIELDS: &str = "missing_fields";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
