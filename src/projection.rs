//! Inquiry status projection for list views
//!
//! Everything here is derived from a thread on demand and never stored.

use crate::session::Role;
use crate::state_machine::state::{AppointmentOutcome, ProposalStatus};
use crate::thread::{form_title, InquiryThread, Message, MessageKind, Proposal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary status of an inquiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    /// No active proposal
    #[default]
    Initial,
    /// Latest proposal awaits an answer
    Pending,
    /// Latest proposal was accepted
    Appointment,
}

/// Project a thread's history onto its summary status
///
/// Only the latest proposal counts. A declined proposal, or an accepted one
/// that was later cancelled, leaves the inquiry `Initial`.
pub fn project_status(messages: &[Message]) -> InquiryStatus {
    let latest = messages.iter().rev().find_map(Message::as_proposal);
    latest.map_or(InquiryStatus::Initial, status_of)
}

fn status_of(proposal: &Proposal) -> InquiryStatus {
    match proposal.status {
        ProposalStatus::Pending => InquiryStatus::Pending,
        ProposalStatus::Declined => InquiryStatus::Initial,
        ProposalStatus::Accepted => match proposal.resolution.as_ref().map(|r| r.outcome) {
            Some(AppointmentOutcome::Cancelled) => InquiryStatus::Initial,
            Some(AppointmentOutcome::Completed) | None => InquiryStatus::Appointment,
        },
    }
}

/// What a list row shows for the latest message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePreview {
    Text {
        text: String,
        truncated: bool,
    },
    Form {
        title: Option<String>,
    },
    Proposal {
        scheduled_for: DateTime<Utc>,
        status: ProposalStatus,
    },
}

impl MessagePreview {
    pub fn of(message: &Message, max_chars: usize) -> Self {
        match &message.kind {
            MessageKind::PlainText { text } => {
                let text = text.trim();
                let truncated = text.chars().count() > max_chars;
                MessagePreview::Text {
                    text: text.chars().take(max_chars).collect(),
                    truncated,
                }
            }
            MessageKind::FormSubmission { fields } => MessagePreview::Form {
                title: form_title(fields),
            },
            MessageKind::AppointmentProposal(p) => MessagePreview::Proposal {
                scheduled_for: p.scheduled_for,
                status: p.status,
            },
        }
    }
}

/// One row of an inquiry list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquirySummary {
    pub inquiry_id: String,
    pub counterparty_name: String,
    pub title: Option<String>,
    pub preview: Option<MessagePreview>,
    pub last_activity: Option<DateTime<Utc>>,
    pub unread: bool,
    pub status: InquiryStatus,
}

impl InquirySummary {
    /// Summarize `thread` as seen by `viewer`
    pub fn of(thread: &InquiryThread, viewer: Role, preview_chars: usize) -> Self {
        Self {
            inquiry_id: thread.inquiry_id().to_string(),
            counterparty_name: thread.counterparty_name(viewer).to_string(),
            title: thread.title().map(String::from),
            preview: thread
                .last_message()
                .map(|m| MessagePreview::of(m, preview_chars)),
            last_activity: thread.last_activity(),
            unread: thread.is_unread_for(viewer),
            status: project_status(thread.messages()),
        }
    }
}

/// Summaries for every thread, most recent activity first
pub fn summarize_all(threads: &[InquiryThread], viewer: Role, preview_chars: usize) -> Vec<InquirySummary> {
    let mut rows: Vec<InquirySummary> = threads
        .iter()
        .map(|t| InquirySummary::of(t, viewer, preview_chars))
        .collect();
    rows.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.inquiry_id.cmp(&b.inquiry_id))
    });
    rows
}

/// Filter chips on the inquiry list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "status", rename_all = "snake_case")]
pub enum InquiryFilter {
    #[default]
    All,
    Unread,
    Status(InquiryStatus),
}

impl InquiryFilter {
    pub fn matches(self, summary: &InquirySummary) -> bool {
        match self {
            InquiryFilter::All => true,
            InquiryFilter::Unread => summary.unread,
            InquiryFilter::Status(status) => summary.status == status,
        }
    }

    pub fn apply(self, summaries: &[InquirySummary]) -> Vec<InquirySummary> {
        summaries
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }
}

/// Counters shown above the inquiry list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InquiryStats {
    pub total: usize,
    pub unread: usize,
    pub pending: usize,
    pub appointments: usize,
}

impl InquiryStats {
    pub fn from_summaries(summaries: &[InquirySummary]) -> Self {
        summaries.iter().fold(Self::default(), |mut stats, s| {
            stats.total += 1;
            stats.unread += usize::from(s.unread);
            match s.status {
                InquiryStatus::Pending => stats.pending += 1,
                InquiryStatus::Appointment => stats.appointments += 1,
                InquiryStatus::Initial => {}
            }
            stats
        })
    }
}
