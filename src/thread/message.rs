//! Message types

pub use crate::state_machine::state::{AppointmentOutcome, ProposalStatus, Resolution};
use crate::session::{Role, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of an inquiry thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Role,
    pub sender_name: String,
    pub sent_at: DateTime<Utc>,
    pub kind: MessageKind,
}

impl Message {
    fn new(session: &Session, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: session.role,
            sender_name: session.display_name.clone(),
            sent_at: Utc::now(),
            kind,
        }
    }

    pub fn plain(session: &Session, text: impl Into<String>) -> Self {
        Self::new(session, MessageKind::PlainText { text: text.into() })
    }

    pub fn form(session: &Session, fields: Vec<FormField>) -> Self {
        Self::new(session, MessageKind::FormSubmission { fields })
    }

    pub fn proposal(session: &Session, scheduled_for: DateTime<Utc>) -> Self {
        Self::new(
            session,
            MessageKind::AppointmentProposal(Proposal::new(session.role, scheduled_for)),
        )
    }

    /// Override the send time (seeding and replaying history)
    #[must_use]
    pub fn sent_at(mut self, at: DateTime<Utc>) -> Self {
        self.sent_at = at;
        self
    }

    pub fn as_proposal(&self) -> Option<&Proposal> {
        match &self.kind {
            MessageKind::AppointmentProposal(proposal) => Some(proposal),
            _ => None,
        }
    }

    pub(crate) fn as_proposal_mut(&mut self) -> Option<&mut Proposal> {
        match &mut self.kind {
            MessageKind::AppointmentProposal(proposal) => Some(proposal),
            _ => None,
        }
    }

    pub fn is_proposal(&self) -> bool {
        self.as_proposal().is_some()
    }
}

/// What a message carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageKind {
    PlainText {
        text: String,
    },
    /// The inquiry form a customer fills in, in question order
    FormSubmission {
        fields: Vec<FormField>,
    },
    AppointmentProposal(Proposal),
}

/// A single question/answer pair of an inquiry form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub question: String,
    pub answer: String,
}

impl FormField {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// The first non-blank answer of a form, used as the inquiry's title
pub fn form_title(fields: &[FormField]) -> Option<String> {
    fields
        .iter()
        .map(|f| f.answer.trim())
        .find(|a| !a.is_empty())
        .map(String::from)
}

/// An appointment time offered by one party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub scheduled_for: DateTime<Utc>,
    pub status: ProposalStatus,
    pub proposed_by: Role,
    /// Set when the proposal is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceInfo>,
    /// Set when an accepted appointment is completed or cancelled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl Proposal {
    pub fn new(proposed_by: Role, scheduled_for: DateTime<Utc>) -> Self {
        Self {
            scheduled_for,
            status: ProposalStatus::Pending,
            proposed_by,
            price: None,
            resolution: None,
        }
    }
}

/// Price information attached when a proposal is accepted
///
/// Amounts are whole currency units. Formatting belongs to the presentation
/// layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PriceInfo {
    Range { min: u32, max: u32 },
    /// Free-text note such as "Needs Further Investigation"
    Note { text: String },
}

impl PriceInfo {
    pub fn range(min: u32, max: u32) -> Self {
        PriceInfo::Range { min, max }
    }

    pub fn note(text: impl Into<String>) -> Self {
        PriceInfo::Note { text: text.into() }
    }

    /// Check the price is something a customer can be shown
    pub fn validate(&self) -> Result<(), String> {
        match self {
            PriceInfo::Range { min, max } if min > max => {
                Err(format!("minimum {min} exceeds maximum {max}"))
            }
            PriceInfo::Note { text } if text.trim().is_empty() => {
                Err("price note is blank".to_string())
            }
            _ => Ok(()),
        }
    }
}
