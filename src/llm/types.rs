//! Wire types for the Ollama-compatible inference API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque sampling options forwarded to the backend untouched
/// (`temperature`, `top_p`, `num_predict`, `num_ctx`, ...)
pub type ModelOptions = Map<String, Value>;

/// Body of `POST /api/generate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Always true; the client only speaks the streaming protocol
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

impl GenerateRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        options: Option<ModelOptions>,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
            options,
        }
    }
}

/// One line of the streamed `/api/generate` response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    /// Set when the backend fails after the stream has started
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /api/tags`
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

impl TagsResponse {
    pub fn into_names(self) -> Vec<String> {
        self.models.into_iter().map(|m| m.name).collect()
    }
}
