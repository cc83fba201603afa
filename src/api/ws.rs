//! WebSocket connection gateway
//!
//! Per connection the handler task reads control messages and a writer task
//! owns the socket's send half. Conversation tasks never touch the socket;
//! they hand fragments to the writer through a bounded channel.

use super::types::{ChatAction, ChatRequest};
use super::AppState;
use crate::runtime::{ConnectionId, ConversationManager, OutgoingFragment};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

/// Fragments buffered between a conversation and a slow viewer
const OUTBOUND_BUFFER: usize = 256;

/// WebSocket upgrade handler for `/chat`
pub async fn chat_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conversations = state.conversations;
    let conn_id = conversations.open();
    tracing::info!(conn_id = %conn_id, "Viewer connected");

    let (ws_sender, mut ws_receiver) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
    let writer = tokio::spawn(write_fragments(conn_id, ws_sender, outbound_rx));

    while let Some(message) = ws_receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                dispatch(&conversations, conn_id, &text, &outbound_tx).await;
            }
            Ok(Message::Close(_)) => break,
            // Pings are answered by axum; binary frames carry nothing for us
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(conn_id = %conn_id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    if conversations.is_running(conn_id) {
        tracing::info!(conn_id = %conn_id, "Viewer left mid-conversation");
    }
    conversations.close(conn_id).await;

    // The writer drains and exits once the last sender is gone
    drop(outbound_tx);
    if let Err(e) = writer.await {
        tracing::error!(conn_id = %conn_id, error = %e, "Writer task failed");
    }
    tracing::info!(conn_id = %conn_id, "Viewer disconnected");
}

/// Decode one inbound text message and act on it
async fn dispatch(
    conversations: &ConversationManager,
    conn_id: ConnectionId,
    text: &str,
    outbound: &mpsc::Sender<OutgoingFragment>,
) {
    let request: ChatRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(conn_id = %conn_id, error = %e, "Ignoring unparseable chat message");
            return;
        }
    };

    match request.action {
        ChatAction::Stop => {
            tracing::info!(conn_id = %conn_id, "Stop requested");
            conversations.stop(conn_id);
        }
        ChatAction::Start => {
            let conversation = request.into_conversation();
            conversations
                .start(conn_id, conversation, outbound.clone())
                .await;
        }
    }
}

/// Forward fragments to the socket, in order, until the channel closes or
/// the viewer goes away
async fn write_fragments(
    conn_id: ConnectionId,
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<OutgoingFragment>,
) {
    while let Some(fragment) = outbound.recv().await {
        let payload = match serde_json::to_string(&fragment) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(conn_id = %conn_id, error = %e, "Failed to encode fragment");
                continue;
            }
        };
        if let Err(e) = sender.send(Message::Text(payload)).await {
            tracing::debug!(conn_id = %conn_id, error = %e, "Viewer write failed");
            break;
        }
    }
    // Dropping the receiver makes any further conversation send fail
    drop(outbound);
    let _ = sender.close().await;
}
