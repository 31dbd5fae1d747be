//! Mock vision backend for deterministic testing.
//!
//! Replies come from a scripted queue, falling back to a fixed default once
//! the queue is drained. Every request is logged so tests can assert on what
//! was (or was not) sent to the model.
//!
//! ## Usage
//!
//! ```rust
//! use qc_inference::mock::MockVisionBackend;
//!
//! let backend = MockVisionBackend::new()
//!     .with_fixed_response("[결함 유형]: 기포")
//!     .then_fail("quota exhausted");
//!
//! assert_eq!(backend.generate_call_count(), 0);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use qc_core::{Error, Result, VisionBackend, VisionRequest};

/// Mock vision backend for testing.
#[derive(Clone)]
pub struct MockVisionBackend {
    config: Arc<MockConfig>,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    model: String,
    default_response: String,
    latency_ms: u64,
    healthy: bool,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Failure(String),
}

/// One logged `generate` call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system_instruction: String,
    pub prompt: String,
    pub mime_type: String,
    pub image_bytes: usize,
    pub structured: bool,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model: "mock-vision".to_string(),
            default_response: String::new(),
            latency_ms: 0,
            healthy: true,
        }
    }
}

impl MockVisionBackend {
    /// Create a new mock backend that answers with empty text.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply used once the scripted queue is empty.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Set the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).model = model.into();
        self
    }

    /// Set simulated latency for every call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    /// Make `health_check` report the backend as unavailable.
    pub fn unhealthy(mut self) -> Self {
        Arc::make_mut(&mut self.config).healthy = false;
        self
    }

    /// Queue a text reply for the next unanswered call.
    pub fn then_respond(self, response: impl Into<String>) -> Self {
        self.push(MockReply::Text(response.into()));
        self
    }

    /// Queue a failure for the next unanswered call.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(MockReply::Failure(message.into()));
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    /// Get number of generation calls.
    pub fn generate_call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    fn push(&self, reply: MockReply) {
        self.script.lock().unwrap().push_back(reply);
    }

    fn log_call(&self, request: &VisionRequest) {
        self.call_log.lock().unwrap().push(MockCall {
            system_instruction: request.system_instruction.clone(),
            prompt: request.prompt.clone(),
            mime_type: request.image.mime_type.clone(),
            image_bytes: request.image.len(),
            structured: request.response_schema.is_some(),
            timestamp: std::time::Instant::now(),
        });
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

impl Default for MockVisionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionBackend for MockVisionBackend {
    async fn generate(&self, request: &VisionRequest) -> Result<String> {
        self.log_call(request);
        self.simulate_latency().await;

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure(message)) => Err(Error::Inference(message)),
            None => Ok(self.config.default_response.clone()),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.config.healthy)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
