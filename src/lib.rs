//! Inquiry Desk - conversation and appointment negotiation engine
//!
//! Keeps per-inquiry message threads between a customer and a professional,
//! negotiates appointment proposals through a pure state machine, and derives
//! the status shown in inquiry lists from each thread's history.

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod appointments;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod negotiator;
pub mod projection;
pub mod schedule;
pub mod session;
pub mod state_machine;
pub mod thread;

pub use appointments::{Appointment, AppointmentBook, AppointmentStatus};
pub use config::{EngineConfig, ProposalPolicy};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use negotiator::Negotiator;
pub use projection::{project_status, InquiryFilter, InquiryStats, InquiryStatus, InquirySummary};
pub use session::{Role, Session};
pub use thread::{FormField, Message, MessageKind, PriceInfo, Proposal, ProposalStatus, ThreadStore};
