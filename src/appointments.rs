//! Appointments derived from inquiry threads
//!
//! An appointment is never stored on its own. It is a view over the latest
//! proposal of a thread, recomputed every time it is read.

use crate::schedule::TimeRange;
use crate::session::Role;
use crate::state_machine::NegotiationState;
use crate::thread::{InquiryThread, PriceInfo};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Title used when the inquiry form gave none
pub const DEFAULT_TITLE: &str = "Appointment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Proposed, not yet answered
    Pending,
    /// Accepted and upcoming
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// `None` for proposals that were declined
    pub fn from_state(state: NegotiationState) -> Option<Self> {
        match state {
            NegotiationState::Pending => Some(AppointmentStatus::Pending),
            NegotiationState::Scheduled => Some(AppointmentStatus::Scheduled),
            NegotiationState::Completed => Some(AppointmentStatus::Completed),
            NegotiationState::Cancelled => Some(AppointmentStatus::Cancelled),
            NegotiationState::Declined => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub inquiry_id: String,
    /// Position of the proposal message in its thread
    pub message_index: usize,
    pub title: String,
    #[serde(flatten)]
    pub time: TimeRange,
    pub counterparty_name: String,
    pub address: Option<String>,
    pub price: Option<PriceInfo>,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// The appointment behind a thread's latest proposal, as seen by `viewer`
    pub fn from_thread(thread: &InquiryThread, viewer: Role, length: Duration) -> Option<Self> {
        let (message_index, proposal) = thread.latest_proposal()?;
        let status = AppointmentStatus::from_state(NegotiationState::of(proposal))?;
        Some(Self {
            inquiry_id: thread.inquiry_id().to_string(),
            message_index,
            title: thread.title().unwrap_or(DEFAULT_TITLE).to_string(),
            time: TimeRange::starting_at(proposal.scheduled_for, length),
            counterparty_name: thread.counterparty_name(viewer).to_string(),
            address: thread.address().map(String::from),
            price: proposal.price.clone(),
            status,
        })
    }
}

/// Appointments grouped the way the appointments page lists them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentBook {
    pub pending: Vec<Appointment>,
    pub scheduled: Vec<Appointment>,
    /// Completed or cancelled
    pub closed: Vec<Appointment>,
}

impl AppointmentBook {
    pub fn from_threads(threads: &[InquiryThread], viewer: Role, length: Duration) -> Self {
        Self::partition(
            threads
                .iter()
                .filter_map(|t| Appointment::from_thread(t, viewer, length))
                .collect(),
        )
    }

    /// Split by status, each group ordered by start time
    pub fn partition(mut appointments: Vec<Appointment>) -> Self {
        appointments.sort_by(|a, b| {
            a.time
                .start
                .cmp(&b.time.start)
                .then_with(|| a.inquiry_id.cmp(&b.inquiry_id))
        });
        let mut book = Self::default();
        for appointment in appointments {
            match appointment.status {
                AppointmentStatus::Pending => book.pending.push(appointment),
                AppointmentStatus::Scheduled => book.scheduled.push(appointment),
                AppointmentStatus::Completed | AppointmentStatus::Cancelled => {
                    book.closed.push(appointment);
                }
            }
        }
        book
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.scheduled.len() + self.closed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
