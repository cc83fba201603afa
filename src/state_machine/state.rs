//! Conversation state types

use serde::{Serialize, Serializer};
use std::fmt;

/// One of the two models taking turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    One,
    Two,
}

impl Participant {
    /// Wire number (1 or 2)
    pub fn number(self) -> u8 {
        match self {
            Participant::One => 1,
            Participant::Two => 2,
        }
    }

    /// The participant whose turn comes next
    pub fn other(self) -> Self {
        match self {
            Participant::One => Participant::Two,
            Participant::Two => Participant::One,
        }
    }
}

impl Serialize for Participant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Conversation state
///
/// `Running(One)` and `Running(Two)` alternate until the loop is stopped or a
/// turn fails. Both terminal states are absorbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvState {
    /// Waiting on (or streaming from) this participant's model
    Running(Participant),
    /// Cancellation observed at a checkpoint
    Stopped,
    /// A turn failed; nothing is retried
    Failed {
        participant: Participant,
        message: String,
    },
}

impl Default for ConvState {
    fn default() -> Self {
        ConvState::Running(Participant::One)
    }
}

impl ConvState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConvState::Running(_))
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ConvState::Running(Participant::One) => "running_a",
            ConvState::Running(Participant::Two) => "running_b",
            ConvState::Stopped => "stopped",
            ConvState::Failed { .. } => "failed",
        }
    }
}
