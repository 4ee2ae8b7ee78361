//! Pure state transition function

use super::state::AppointmentOutcome;
use super::{Effect, Event, NegotiationContext, NegotiationState};
use crate::error::EngineError;
use crate::session::Role;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: NegotiationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: NegotiationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{0}")]
    WrongParty(String),
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl From<TransitionError> for EngineError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::WrongParty(msg) => EngineError::WrongParty(msg),
            TransitionError::InvalidPrice(msg) => EngineError::InvalidPrice(msg),
            TransitionError::InvalidTransition(msg) => EngineError::InvalidTransition(msg),
        }
    }
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs and performs no
/// I/O. Party checks run before state checks, so answering your own proposal
/// is always `WrongParty` whatever the proposal's state.
pub fn transition(
    state: &NegotiationState,
    context: &NegotiationContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    if event.is_response() && event.actor() == context.proposed_by {
        return Err(TransitionError::WrongParty(format!(
            "{} cannot answer their own proposal",
            event.actor()
        )));
    }

    match (state, event) {
        // ============================================================
        // Responding to a proposal
        // ============================================================

        // Pending + Accept -> Scheduled, price recorded
        (NegotiationState::Pending, Event::Accept { price, .. }) => {
            price.validate().map_err(TransitionError::InvalidPrice)?;
            Ok(TransitionResult::new(NegotiationState::Scheduled)
                .with_effect(Effect::accept(price)))
        }

        // Pending + Decline -> Declined
        (NegotiationState::Pending, Event::Decline { .. }) => {
            Ok(TransitionResult::new(NegotiationState::Declined).with_effect(Effect::decline()))
        }

        // ============================================================
        // Closing an accepted appointment
        // ============================================================

        // Only the professional can say the work happened
        (NegotiationState::Scheduled, Event::Complete { actor: Role::Professional }) => {
            Ok(TransitionResult::new(NegotiationState::Completed).with_effect(Effect::resolve(
                AppointmentOutcome::Completed,
                Role::Professional,
            )))
        }

        (NegotiationState::Scheduled, Event::Complete { actor: Role::Customer }) => {
            Err(TransitionError::WrongParty(
                "customer cannot mark an appointment completed".to_string(),
            ))
        }

        // Either party may call it off
        (NegotiationState::Scheduled, Event::Cancel { actor }) => {
            Ok(TransitionResult::new(NegotiationState::Cancelled)
                .with_effect(Effect::resolve(AppointmentOutcome::Cancelled, actor)))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "cannot {} proposal {} of inquiry {} while {:?}",
            event.name(),
            context.message_index,
            context.inquiry_id,
            state
        ))),
    }
}
