//! Appointment negotiation state machine
//!
//! Transitions are pure: given a proposal's state, its context and an event,
//! `transition` returns the next state and the effects the caller must apply
//! to the thread store. Nothing here touches storage.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{NegotiationContext, NegotiationState};
pub use transition::{transition, TransitionError, TransitionResult};
