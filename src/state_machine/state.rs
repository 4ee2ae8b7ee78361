//! Negotiation state types

use crate::session::Role;
use crate::thread::Proposal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Stored status
// ============================================================================

/// Status stored on a proposal message
///
/// Only `Pending -> Accepted` and `Pending -> Declined` exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an accepted appointment ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentOutcome {
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AppointmentOutcome::Completed => "completed",
            AppointmentOutcome::Cancelled => "cancelled",
        })
    }
}

/// Record of who closed an accepted appointment, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: AppointmentOutcome,
    pub by: Role,
    pub at: DateTime<Utc>,
}

impl Resolution {
    pub fn new(outcome: AppointmentOutcome, by: Role) -> Self {
        Self {
            outcome,
            by,
            at: Utc::now(),
        }
    }
}

// ============================================================================
// Negotiation State
// ============================================================================

/// Where a single proposal stands, as seen by the transition function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NegotiationState {
    /// Waiting for the other party to accept or decline
    #[default]
    Pending,

    /// Rejected by the other party (terminal)
    Declined,

    /// Accepted and not yet closed
    Scheduled,

    /// Appointment took place (terminal)
    Completed,

    /// Appointment called off after acceptance (terminal)
    Cancelled,
}

impl NegotiationState {
    /// Derive the state from a stored proposal
    pub fn of(proposal: &Proposal) -> Self {
        match (proposal.status, &proposal.resolution) {
            (ProposalStatus::Pending, _) => NegotiationState::Pending,
            (ProposalStatus::Declined, _) => NegotiationState::Declined,
            (ProposalStatus::Accepted, None) => NegotiationState::Scheduled,
            (ProposalStatus::Accepted, Some(r)) => match r.outcome {
                AppointmentOutcome::Completed => NegotiationState::Completed,
                AppointmentOutcome::Cancelled => NegotiationState::Cancelled,
            },
        }
    }

    /// Check if no event can move this proposal any further
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NegotiationState::Declined | NegotiationState::Completed | NegotiationState::Cancelled
        )
    }

    /// The proposal status this state is stored as
    pub fn proposal_status(self) -> ProposalStatus {
        match self {
            NegotiationState::Pending => ProposalStatus::Pending,
            NegotiationState::Declined => ProposalStatus::Declined,
            NegotiationState::Scheduled
            | NegotiationState::Completed
            | NegotiationState::Cancelled => ProposalStatus::Accepted,
        }
    }
}

/// Context for one proposal (immutable for its lifetime)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationContext {
    pub inquiry_id: String,
    pub message_index: usize,
    /// Party that sent the proposal; only the other party may answer it
    pub proposed_by: Role,
}

impl NegotiationContext {
    pub fn new(inquiry_id: impl Into<String>, message_index: usize, proposed_by: Role) -> Self {
        Self {
            inquiry_id: inquiry_id.into(),
            message_index,
            proposed_by,
        }
    }

    pub fn responder(&self) -> Role {
        self.proposed_by.counterpart()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn proposal() -> Proposal {
        Proposal::new(
            Role::Customer,
            Utc.with_ymd_and_hms(2025, 10, 2, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_state_of_stored_proposal() {
        let mut p = proposal();
        assert_eq!(NegotiationState::of(&p), NegotiationState::Pending);

        p.status = ProposalStatus::Declined;
        assert_eq!(NegotiationState::of(&p), NegotiationState::Declined);

        p.status = ProposalStatus::Accepted;
        assert_eq!(NegotiationState::of(&p), NegotiationState::Scheduled);

        p.resolution = Some(Resolution::new(AppointmentOutcome::Cancelled, Role::Customer));
        assert_eq!(NegotiationState::of(&p), NegotiationState::Cancelled);
        assert_eq!(NegotiationState::Cancelled.proposal_status(), ProposalStatus::Accepted);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!NegotiationState::Pending.is_terminal());
        assert!(!NegotiationState::Scheduled.is_terminal());
        assert!(NegotiationState::Declined.is_terminal());
        assert!(NegotiationState::Completed.is_terminal());
        assert!(NegotiationState::Cancelled.is_terminal());
    }

    #[test]
    fn test_responder_is_other_party() {
        let ctx = NegotiationContext::new("101", 3, Role::Customer);
        assert_eq!(ctx.responder(), Role::Professional);
    }
}
