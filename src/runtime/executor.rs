//! Conversation runtime executor

use super::{CancellationRegistry, ConnectionId, Conversation, OutgoingFragment};
use crate::llm::{GenerateRequest, LlmError, ModelClient};
use crate::sanitize::strip_reasoning;
use crate::state_machine::{transition, ConvState, Event, Participant};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Why a turn ended early
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("viewer connection closed")]
    ViewerGone,
}

/// Turn-taking loop for one connection
///
/// The cancellation flag is consulted before every turn. A turn that has
/// started always streams to completion (or failure); stopping takes effect
/// at the next checkpoint.
pub struct ConversationRuntime {
    conn_id: ConnectionId,
    conversation: Conversation,
    client: Arc<dyn ModelClient>,
    cancellations: CancellationRegistry,
    outbound: mpsc::Sender<OutgoingFragment>,
}

impl ConversationRuntime {
    pub fn new(
        conn_id: ConnectionId,
        conversation: Conversation,
        client: Arc<dyn ModelClient>,
        cancellations: CancellationRegistry,
        outbound: mpsc::Sender<OutgoingFragment>,
    ) -> Self {
        Self {
            conn_id,
            conversation,
            client,
            cancellations,
            outbound,
        }
    }

    /// Alternate between both models until stopped or a turn fails.
    ///
    /// Returns the terminal state.
    pub async fn run(self) -> ConvState {
        tracing::info!(
            conn_id = %self.conn_id,
            model_a = %self.conversation.first.model,
            model_b = %self.conversation.second.model,
            "Starting conversation"
        );

        let mut state = ConvState::default();
        let mut prompt = self.conversation.prompt.clone();
        let mut turns: u64 = 0;

        while let ConvState::Running(participant) = state {
            let event = if self.cancellations.is_cancelled(self.conn_id) {
                Event::Cancelled
            } else {
                match self.run_turn(participant, &prompt).await {
                    Ok(reply) => {
                        turns += 1;
                        prompt = strip_reasoning(&reply);
                        Event::TurnComplete
                    }
                    Err(e) => {
                        tracing::error!(
                            conn_id = %self.conn_id,
                            participant = %participant,
                            error = %e,
                            "Turn failed"
                        );
                        Event::TurnFailed {
                            message: e.to_string(),
                        }
                    }
                }
            };
            state = transition(&state, event);
        }

        tracing::info!(
            conn_id = %self.conn_id,
            state = state.name(),
            turns,
            "Conversation ended"
        );
        state
    }

    /// Stream one reply, forwarding every fragment as it arrives.
    async fn run_turn(&self, participant: Participant, prompt: &str) -> Result<String, TurnError> {
        let config = self.conversation.participant(participant);
        let request = GenerateRequest::new(&config.model, prompt, config.options.clone());

        let mut stream = self.client.generate_stream(&request).await?;
        while let Some(fragment) = stream.next_fragment().await {
            let fragment = OutgoingFragment {
                model: config.model.clone(),
                content: fragment?,
                participant,
            };
            self.outbound
                .send(fragment)
                .await
                .map_err(|_| TurnError::ViewerGone)?;
        }

        let reply = stream.into_text();
        tracing::debug!(
            conn_id = %self.conn_id,
            participant = %participant,
            model = %config.model,
            reply_chars = reply.chars().count(),
            "Turn complete"
        );
        Ok(reply)
    }
}
