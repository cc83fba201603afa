//! Events that can occur in a conversation

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The cancellation flag was found set at a checkpoint
    Cancelled,
    /// The current participant's reply streamed to completion
    TurnComplete,
    /// The current participant's turn failed (backend or viewer transport)
    TurnFailed { message: String },
}
