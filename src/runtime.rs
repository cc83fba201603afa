//! Runtime for executing conversations
//!
//! One conversation task at most per viewer connection. Tasks are tracked by
//! connection so that a restart or a disconnect can tear the old one down
//! before anything else touches that connection's state.

mod cancellation;
mod executor;

#[cfg(test)]
pub mod testing;

pub use cancellation::CancellationRegistry;
pub use executor::ConversationRuntime;

use crate::llm::{ModelClient, ModelOptions};
use crate::state_machine::{ConvState, Participant};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Opaque identity of a live viewer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Model and sampling options for one participant
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantConfig {
    pub model: String,
    pub options: Option<ModelOptions>,
}

/// Everything needed to start a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub prompt: String,
    pub first: ParticipantConfig,
    pub second: ParticipantConfig,
}

impl Conversation {
    pub fn participant(&self, participant: Participant) -> &ParticipantConfig {
        match participant {
            Participant::One => &self.first,
            Participant::Two => &self.second,
        }
    }
}

/// Payload sent to the viewer for every streamed fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingFragment {
    pub model: String,
    pub content: String,
    pub participant: Participant,
}

/// Manager for all conversation tasks
pub struct ConversationManager {
    client: Arc<dyn ModelClient>,
    cancellations: CancellationRegistry,
    tasks: Mutex<HashMap<ConnectionId, JoinHandle<ConvState>>>,
}

impl ConversationManager {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            cancellations: CancellationRegistry::new(),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Register a newly accepted connection
    pub fn open(&self) -> ConnectionId {
        let conn_id = ConnectionId::new();
        self.cancellations.set_cancelled(conn_id, false);
        conn_id
    }

    /// Start a conversation on a connection, replacing any running one.
    ///
    /// Fragments are delivered to `outbound` in backend order.
    pub async fn start(
        &self,
        conn_id: ConnectionId,
        conversation: Conversation,
        outbound: mpsc::Sender<OutgoingFragment>,
    ) {
        self.halt(conn_id).await;
        self.cancellations.set_cancelled(conn_id, false);

        let runtime = ConversationRuntime::new(
            conn_id,
            conversation,
            self.client.clone(),
            self.cancellations.clone(),
            outbound,
        );
        let handle = tokio::spawn(runtime.run());
        self.lock_tasks().insert(conn_id, handle);
    }

    /// Request a stop; the conversation ends at its next checkpoint
    pub fn stop(&self, conn_id: ConnectionId) {
        self.cancellations.set_cancelled(conn_id, true);
    }

    /// Tear down a closed connection: its task first, then its flag
    pub async fn close(&self, conn_id: ConnectionId) {
        self.halt(conn_id).await;
        self.cancellations.remove(conn_id);
    }

    /// Whether a conversation task is still running on this connection
    pub fn is_running(&self, conn_id: ConnectionId) -> bool {
        self.lock_tasks()
            .get(&conn_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    #[cfg(test)]
    pub fn cancellations(&self) -> &CancellationRegistry {
        &self.cancellations
    }

    /// Connections that still hold a task handle
    #[cfg(test)]
    pub fn task_count(&self) -> usize {
        self.lock_tasks().len()
    }

    /// Abort the connection's task, if any, and wait for it to go away
    async fn halt(&self, conn_id: ConnectionId) {
        let Some(handle) = self.lock_tasks().remove(&conn_id) else {
            return;
        };

        self.cancellations.set_cancelled(conn_id, true);
        handle.abort();
        match handle.await {
            Ok(state) => {
                tracing::debug!(conn_id = %conn_id, state = state.name(), "Conversation already finished");
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!(conn_id = %conn_id, "Conversation aborted");
            }
            Err(e) => {
                tracing::error!(conn_id = %conn_id, error = %e, "Conversation task panicked");
            }
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, HashMap<ConnectionId, JoinHandle<ConvState>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
