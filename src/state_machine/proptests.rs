//! Property-based tests for the turn-taking state machine

use super::{transition, ConvState, Event, Participant};
use proptest::prelude::*;

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => Just(Event::TurnComplete),
        1 => Just(Event::Cancelled),
        1 => "[a-z ]{1,20}".prop_map(|message| Event::TurnFailed { message }),
    ]
}

proptest! {
    /// Once terminal, no event sequence leaves the terminal state
    #[test]
    fn prop_terminal_states_absorb(events in proptest::collection::vec(arb_event(), 1..50)) {
        let mut state = ConvState::default();
        let mut terminal: Option<ConvState> = None;
        for event in events {
            state = transition(&state, event);
            if let Some(t) = &terminal {
                prop_assert_eq!(&state, t);
            } else if state.is_terminal() {
                terminal = Some(state.clone());
            }
        }
    }

    /// Without cancellation or failure, participants strictly alternate
    /// starting with participant one
    #[test]
    fn prop_completions_alternate(turns in 0usize..100) {
        let mut state = ConvState::default();
        for _ in 0..turns {
            state = transition(&state, Event::TurnComplete);
        }
        let expected = if turns % 2 == 0 { Participant::One } else { Participant::Two };
        prop_assert_eq!(state, ConvState::Running(expected));
    }

    /// Cancellation always lands in Stopped, never Failed
    #[test]
    fn prop_cancel_stops(turns in 0usize..10) {
        let mut state = ConvState::default();
        for _ in 0..turns {
            state = transition(&state, Event::TurnComplete);
        }
        prop_assert_eq!(transition(&state, Event::Cancelled), ConvState::Stopped);
    }
}
