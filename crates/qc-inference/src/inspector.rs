//! Defect inspection pipeline.
//!
//! [`DefectInspector`] ties the pieces together: the session gate, image
//! decoding, prompt composition, the vision backend, and result extraction.
//! It holds no per-session state of its own, so one inspector can serve any
//! number of [`SessionContext`]s.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use qc_core::defaults::MAX_IMAGE_BYTES;
use qc_core::{
    AnalysisResult, Error, ImagePayload, InspectionRecord, ReferenceSource, ResponseMode, Result,
    SamplingParams, SessionContext, VisionBackend,
};

use crate::extract;
use crate::prompt;

/// Per-inspector tuning, usually derived from
/// [`InspectorConfig`](crate::config::InspectorConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InspectorSettings {
    pub sampling: SamplingParams,
    pub response_mode: ResponseMode,
    /// Largest decoded image accepted, in bytes.
    pub max_image_bytes: usize,
}

impl Default for InspectorSettings {
    fn default() -> Self {
        Self {
            sampling: SamplingParams::default(),
            response_mode: ResponseMode::default(),
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }
}

/// Grounded defect analysis over a vision backend.
pub struct DefectInspector {
    backend: Arc<dyn VisionBackend>,
    settings: InspectorSettings,
}

impl DefectInspector {
    pub fn new(backend: Arc<dyn VisionBackend>, settings: InspectorSettings) -> Self {
        Self { backend, settings }
    }

    pub fn settings(&self) -> &InspectorSettings {
        &self.settings
    }

    pub fn backend(&self) -> &Arc<dyn VisionBackend> {
        &self.backend
    }

    /// Analyze one image against the given grounding sources.
    ///
    /// Every backend failure is reported as [`Error::AnalysisFailed`]; a reply
    /// that lacks some sections still succeeds with fallback values.
    #[instrument(skip(self, sources, image), fields(subsystem = "inference", component = "inspector", op = "analyze", model = %self.backend.model_name(), source_count = sources.len(), image_bytes = image.len()))]
    pub async fn analyze(
        &self,
        sources: &[ReferenceSource],
        image: ImagePayload,
    ) -> Result<AnalysisResult> {
        let start = Instant::now();
        let request = prompt::build_request(
            sources,
            image,
            self.settings.sampling,
            self.settings.response_mode,
        );
        debug!(prompt_len = request.prompt.len(), "Prompt composed");

        let reply = self.backend.generate(&request).await.map_err(|e| {
            warn!(error = %e, "Vision backend call failed");
            Error::AnalysisFailed(e.to_string())
        })?;

        let extraction = extract::extract(&reply, self.settings.response_mode);
        if !extraction.is_complete() {
            warn!(
                missing_fields = ?extraction.missing,
                response_len = reply.len(),
                "Reply missing sections; fallback values used"
            );
        }

        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = reply.len(),
            structured = extraction.structured,
            success = true,
            "Analysis complete"
        );
        Ok(extraction.result)
    }

    /// Gate, decode, analyze, and record one submitted image.
    ///
    /// Nothing is composed or sent while the session is disconnected, and a
    /// failed analysis leaves the history untouched.
    pub async fn inspect(
        &self,
        session: &mut SessionContext,
        image_data_uri: &str,
    ) -> Result<InspectionRecord> {
        let sources = session.require_connected()?;

        let image = ImagePayload::from_data_uri(image_data_uri)?;
        if image.len() > self.settings.max_image_bytes {
            return Err(Error::InvalidImage(format!(
                "image is {} bytes, limit is {}",
                image.len(),
                self.settings.max_image_bytes
            )));
        }

        let result = self.analyze(sources, image).await?;
        Ok(session.record(image_data_uri, result).clone())
    }
}
