//! Mock implementations for testing
//!
//! These mocks enable runtime and API tests without a real backend.

use super::{Conversation, ParticipantConfig};
use crate::llm::{FragmentStream, GenerateRequest, LlmError, ModelClient};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};

/// Conversation with no sampling options
pub fn conversation(prompt: &str, model_a: &str, model_b: &str) -> Conversation {
    Conversation {
        prompt: prompt.to_string(),
        first: ParticipantConfig {
            model: model_a.to_string(),
            options: None,
        },
        second: ParticipantConfig {
            model: model_b.to_string(),
            options: None,
        },
    }
}

// ============================================================================
// Mock Model Client
// ============================================================================

/// Mock client that returns queued streams, per model
///
/// A model with nothing queued fails with a network error, which ends any
/// conversation loop deterministically.
pub struct MockModelClient {
    streams: Mutex<HashMap<String, VecDeque<Result<FragmentStream, LlmError>>>>,
    models: Mutex<Result<Vec<String>, LlmError>>,
    /// Record of all generation requests made
    pub requests: Mutex<Vec<GenerateRequest>>,
    /// Notified each time a generation request starts
    pub request_started: Arc<Notify>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            models: Mutex::new(Ok(Vec::new())),
            requests: Mutex::new(Vec::new()),
            request_started: Arc::new(Notify::new()),
        }
    }

    fn queue(&self, model: &str, stream: Result<FragmentStream, LlmError>) {
        self.streams
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(stream);
    }

    /// Queue a reply streamed as the given fragments
    pub fn queue_reply(&self, model: &str, fragments: &[&str]) {
        let items: Vec<Result<String, LlmError>> =
            fragments.iter().map(|f| Ok((*f).to_string())).collect();
        self.queue_items(model, items);
    }

    /// Queue a stream of raw items (fragments and mid-stream errors)
    pub fn queue_items(&self, model: &str, items: Vec<Result<String, LlmError>>) {
        self.queue(model, Ok(FragmentStream::new(futures::stream::iter(items))));
    }

    /// Queue a request that fails before any fragment
    pub fn queue_error(&self, model: &str, error: LlmError) {
        self.queue(model, Err(error));
    }

    /// Queue a reply that streams `before`, then waits until the returned
    /// sender fires (or is dropped) before streaming `after`
    pub fn queue_gated(&self, model: &str, before: &[&str], after: &[&str]) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel::<()>();
        let before: Vec<Result<String, LlmError>> =
            before.iter().map(|f| Ok((*f).to_string())).collect();
        let after: Vec<Result<String, LlmError>> =
            after.iter().map(|f| Ok((*f).to_string())).collect();

        let gated = futures::stream::once(async move {
            let _ = gate.await;
        })
        .flat_map(move |()| futures::stream::iter(after.clone()));

        self.queue(
            model,
            Ok(FragmentStream::new(
                futures::stream::iter(before).chain(gated),
            )),
        );
        release
    }

    /// Queue a reply that never produces anything
    pub fn queue_hang(&self, model: &str) {
        self.queue(
            model,
            Ok(FragmentStream::new(futures::stream::pending::<
                Result<String, LlmError>,
            >())),
        );
    }

    pub fn set_models(&self, models: Result<Vec<String>, LlmError>) {
        *self.models.lock().unwrap() = models;
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate_stream(&self, request: &GenerateRequest) -> Result<FragmentStream, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_one();
        self.streams
            .lock()
            .unwrap()
            .get_mut(&request.model)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        self.models.lock().unwrap().clone()
    }
}
