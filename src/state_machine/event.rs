//! Events that can happen to a proposal

use crate::session::Role;
use crate::thread::PriceInfo;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // Responses to a pending proposal
    Accept { responder: Role, price: PriceInfo },
    Decline { responder: Role },

    // Closing an accepted appointment
    Complete { actor: Role },
    Cancel { actor: Role },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Accept { .. } => "accept",
            Event::Decline { .. } => "decline",
            Event::Complete { .. } => "complete",
            Event::Cancel { .. } => "cancel",
        }
    }

    /// The party performing the action
    pub fn actor(&self) -> Role {
        match self {
            Event::Accept { responder, .. } | Event::Decline { responder } => *responder,
            Event::Complete { actor } | Event::Cancel { actor } => *actor,
        }
    }

    /// Check if this event answers a pending proposal
    pub fn is_response(&self) -> bool {
        matches!(self, Event::Accept { .. } | Event::Decline { .. })
    }
}
