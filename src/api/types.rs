//! API request and response types

use crate::llm::ModelOptions;
use crate::runtime::{Conversation, ParticipantConfig};
use serde::{Deserialize, Serialize};

/// What an inbound chat message asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatAction {
    #[default]
    Start,
    Stop,
}

/// Message sent by the viewer over `/chat`
///
/// A stop message carries only `action`, so every field has a default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub prompt: String,
    pub model1: String,
    pub model2: String,
    pub options1: Option<ModelOptions>,
    pub options2: Option<ModelOptions>,
    pub action: ChatAction,
}

impl ChatRequest {
    pub fn into_conversation(self) -> Conversation {
        Conversation {
            prompt: self.prompt,
            first: ParticipantConfig {
                model: self.model1,
                options: self.options1,
            },
            second: ParticipantConfig {
                model: self.model2,
                options: self.options2,
            },
        }
    }
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}
