//! Pure state transition function

use super::{ConvState, Event};

/// Compute the next state.
///
/// Terminal states ignore every event, so a late event can never restart a
/// finished conversation.
pub fn transition(state: &ConvState, event: Event) -> ConvState {
    match (state, event) {
        (ConvState::Running(_), Event::Cancelled) => ConvState::Stopped,

        // RunningA -> RunningB -> RunningA ...
        (ConvState::Running(participant), Event::TurnComplete) => {
            ConvState::Running(participant.other())
        }

        (ConvState::Running(participant), Event::TurnFailed { message }) => ConvState::Failed {
            participant: *participant,
            message,
        },

        (terminal, _) => terminal.clone(),
    }
}
