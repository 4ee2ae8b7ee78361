//! Effects produced by state transitions

use super::state::{AppointmentOutcome, ProposalStatus};
use crate::session::Role;
use crate::thread::PriceInfo;

/// Store mutations to apply after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Move the proposal out of `Pending`
    SetProposalStatus {
        status: ProposalStatus,
        price: Option<PriceInfo>,
    },

    /// Close an accepted appointment
    ResolveAppointment {
        outcome: AppointmentOutcome,
        by: Role,
    },
}

impl Effect {
    pub fn accept(price: PriceInfo) -> Self {
        Effect::SetProposalStatus {
            status: ProposalStatus::Accepted,
            price: Some(price),
        }
    }

    pub fn decline() -> Self {
        Effect::SetProposalStatus {
            status: ProposalStatus::Declined,
            price: None,
        }
    }

    pub fn resolve(outcome: AppointmentOutcome, by: Role) -> Self {
        Effect::ResolveAppointment { outcome, by }
    }
}
