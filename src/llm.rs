//! Inference backend access
//!
//! Streams generations from an Ollama-compatible backend and lists its
//! model catalog.

mod error;
mod ndjson;
mod ollama;
mod types;

#[cfg(test)]
mod proptests;

#[allow(unused_imports)] // Public API re-exports
pub use error::{LlmError, LlmErrorKind};
pub use ollama::OllamaClient;
pub use types::{GenerateRequest, ModelOptions};

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Common interface for inference backends
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Start one streaming generation
    async fn generate_stream(&self, request: &GenerateRequest) -> Result<FragmentStream, LlmError>;

    /// Fetch the backend's model catalog, in backend order
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;
}

/// Incremental reply of one generation
///
/// Fragments are handed out as they arrive and appended to the accumulated
/// reply at the same time.
pub struct FragmentStream {
    inner: BoxStream<'static, Result<String, LlmError>>,
    text: String,
}

impl FragmentStream {
    pub fn new(inner: impl Stream<Item = Result<String, LlmError>> + Send + 'static) -> Self {
        Self {
            inner: inner.boxed(),
            text: String::new(),
        }
    }

    /// Next fragment, or `None` once the generation is complete
    pub async fn next_fragment(&mut self) -> Option<Result<String, LlmError>> {
        let item = self.inner.next().await?;
        if let Ok(fragment) = &item {
            self.text.push_str(fragment);
        }
        Some(item)
    }

    /// Reply accumulated so far
    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Logging wrapper for model clients
pub struct LoggingClient {
    inner: Arc<dyn ModelClient>,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn ModelClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ModelClient for LoggingClient {
    async fn generate_stream(&self, request: &GenerateRequest) -> Result<FragmentStream, LlmError> {
        let start = Instant::now();
        let result = self.inner.generate_stream(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::debug!(
                    model = %request.model,
                    prompt_chars = request.prompt.chars().count(),
                    duration_ms = %duration.as_millis(),
                    "Generation stream opened"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Generation request failed"
                );
            }
        }

        result
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let start = Instant::now();
        let result = self.inner.list_models().await;
        let duration = start.elapsed();

        match &result {
            Ok(models) => {
                tracing::info!(
                    count = models.len(),
                    duration_ms = %duration.as_millis(),
                    "Model catalog fetched"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Model catalog request failed"
                );
            }
        }

        result
    }
}
