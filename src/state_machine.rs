//! Turn-taking state machine
//!
//! Pure state transitions; the runtime performs the I/O and feeds the
//! outcome of each step back in as an `Event`.

pub mod event;
pub mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use event::Event;
pub use state::{ConvState, Participant};
pub use transition::transition;
