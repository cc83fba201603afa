//! HTTP and WebSocket surface
//!
//! `/chat` carries the conversation; `/models` lists the backend catalog;
//! everything else is the static viewer.

mod handlers;
mod types;
mod ws;

pub use handlers::create_router;

use crate::llm::ModelClient;
use crate::runtime::ConversationManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub conversations: Arc<ConversationManager>,
    pub client: Arc<dyn ModelClient>,
}

impl AppState {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            conversations: Arc::new(ConversationManager::new(client.clone())),
            client,
        }
    }
}
