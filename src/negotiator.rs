//! Negotiation engine
//!
//! Validates caller actions, runs them through the pure transition function and
//! applies the resulting effects to the thread store. Each operation is
//! all-or-nothing.

use crate::appointments::AppointmentBook;
use crate::config::{EngineConfig, ProposalPolicy};
use crate::error::{EngineError, EngineResult};
use crate::projection::{project_status, summarize_all, InquiryStatus, InquirySummary};
use crate::schedule::parse_instant;
use crate::session::Session;
use crate::state_machine::state::Resolution;
use crate::state_machine::{transition, Effect, Event, NegotiationContext, NegotiationState};
use crate::thread::{FormField, InquiryThread, Message, PriceInfo, ProposalStatus, ThreadStore};
use chrono::{DateTime, Utc};

pub struct Negotiator {
    store: ThreadStore,
    config: EngineConfig,
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Negotiator {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_store(ThreadStore::new(), config)
    }

    /// Run on top of an existing store (shared handle)
    pub fn with_store(store: ThreadStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &ThreadStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================== Messages ====================

    pub fn send_plain_message(
        &self,
        inquiry_id: &str,
        sender: &Session,
        text: &str,
    ) -> EngineResult<Message> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }
        self.append(inquiry_id, Message::plain(sender, text))
    }

    /// Open (or add to) an inquiry with a filled-in form
    pub fn submit_inquiry_form(
        &self,
        inquiry_id: &str,
        sender: &Session,
        fields: Vec<FormField>,
    ) -> EngineResult<Message> {
        if fields.iter().all(|f| f.answer.trim().is_empty()) {
            return Err(EngineError::EmptyMessage);
        }
        self.append(inquiry_id, Message::form(sender, fields))
    }

    fn append(&self, inquiry_id: &str, message: Message) -> EngineResult<Message> {
        self.store.append(inquiry_id, message.clone())?;
        Ok(message)
    }

    // ==================== Proposals ====================

    /// Offer an appointment time to the other party
    ///
    /// Times in the past are accepted.
    pub fn propose_appointment(
        &self,
        inquiry_id: &str,
        proposer: &Session,
        scheduled_for: DateTime<Utc>,
    ) -> EngineResult<Message> {
        let message = Message::proposal(proposer, scheduled_for);
        let policy = self.config.proposal_policy;
        let index = self
            .store
            .append_if(inquiry_id, message.clone(), |thread| {
                check_policy(policy, thread)
            })
            .inspect_err(|e| {
                tracing::warn!(inquiry_id = %inquiry_id, error = %e, "Proposal rejected");
            })?;

        tracing::info!(
            inquiry_id = %inquiry_id,
            index,
            role = %proposer.role,
            scheduled_for = %scheduled_for,
            "Appointment proposed"
        );
        Ok(message)
    }

    /// Same as `propose_appointment`, taking the time as entered in a picker
    pub fn propose_appointment_at(
        &self,
        inquiry_id: &str,
        proposer: &Session,
        when: &str,
    ) -> EngineResult<Message> {
        let scheduled_for = parse_instant(when)?;
        self.propose_appointment(inquiry_id, proposer, scheduled_for)
    }

    pub fn accept_proposal(
        &self,
        inquiry_id: &str,
        message_index: usize,
        responder: &Session,
        price: PriceInfo,
    ) -> EngineResult<()> {
        self.handle(
            inquiry_id,
            message_index,
            Event::Accept {
                responder: responder.role,
                price,
            },
        )
    }

    pub fn decline_proposal(
        &self,
        inquiry_id: &str,
        message_index: usize,
        responder: &Session,
    ) -> EngineResult<()> {
        self.handle(
            inquiry_id,
            message_index,
            Event::Decline {
                responder: responder.role,
            },
        )
    }

    // ==================== Appointments ====================

    /// Mark an accepted appointment as done (professional only)
    pub fn complete_appointment(
        &self,
        inquiry_id: &str,
        message_index: usize,
        actor: &Session,
    ) -> EngineResult<()> {
        self.handle(inquiry_id, message_index, Event::Complete { actor: actor.role })
    }

    /// Call off an accepted appointment (either party)
    pub fn cancel_appointment(
        &self,
        inquiry_id: &str,
        message_index: usize,
        actor: &Session,
    ) -> EngineResult<()> {
        self.handle(inquiry_id, message_index, Event::Cancel { actor: actor.role })
    }

    fn handle(&self, inquiry_id: &str, message_index: usize, event: Event) -> EngineResult<()> {
        let proposal = self.store.proposal(inquiry_id, message_index)?;
        let context = NegotiationContext::new(inquiry_id, message_index, proposal.proposed_by);
        let state = NegotiationState::of(&proposal);
        let event_name = event.name();
        let actor = event.actor();

        let result = transition(&state, &context, event).map_err(|e| {
            tracing::warn!(
                inquiry_id = %inquiry_id,
                index = message_index,
                event = event_name,
                role = %actor,
                error = %e,
                "Negotiation action rejected"
            );
            EngineError::from(e)
        })?;

        for effect in result.effects {
            self.apply(&context, effect)?;
        }

        tracing::info!(
            inquiry_id = %inquiry_id,
            index = message_index,
            event = event_name,
            role = %actor,
            from = ?state,
            to = ?result.new_state,
            "Negotiation transition"
        );
        Ok(())
    }

    fn apply(&self, context: &NegotiationContext, effect: Effect) -> EngineResult<()> {
        match effect {
            Effect::SetProposalStatus { status, price } => self.store.update_proposal_status(
                &context.inquiry_id,
                context.message_index,
                status,
                price,
            ),
            Effect::ResolveAppointment { outcome, by } => self.store.resolve_appointment(
                &context.inquiry_id,
                context.message_index,
                Resolution::new(outcome, by),
            ),
        }
    }

    // ==================== Thread details ====================

    pub fn set_service_address(&self, inquiry_id: &str, address: &str) -> EngineResult<()> {
        let address = address.trim();
        if address.is_empty() {
            return Err(EngineError::EmptyMessage);
        }
        self.store.set_address(inquiry_id, address)
    }

    pub fn mark_read(&self, inquiry_id: &str, reader: &Session) {
        self.store.mark_read(inquiry_id, reader.role);
    }

    // ==================== Reads ====================

    pub fn thread(&self, inquiry_id: &str) -> Vec<Message> {
        self.store.get(inquiry_id)
    }

    pub fn status(&self, inquiry_id: &str) -> InquiryStatus {
        project_status(&self.store.get(inquiry_id))
    }

    /// Inquiry list rows for the viewer, newest activity first
    pub fn summaries(&self, viewer: &Session) -> Vec<InquirySummary> {
        summarize_all(&self.store.threads(), viewer.role, self.config.preview_chars)
    }

    pub fn appointments(&self, viewer: &Session) -> AppointmentBook {
        AppointmentBook::from_threads(
            &self.store.threads(),
            viewer.role,
            self.config.appointment_duration,
        )
    }
}

fn check_policy(policy: ProposalPolicy, thread: &InquiryThread) -> EngineResult<()> {
    match (policy, thread.latest_proposal()) {
        (ProposalPolicy::SinglePending, Some((index, p))) if p.status == ProposalStatus::Pending => {
            Err(EngineError::InvalidTransition(format!(
                "proposal {index} is still pending"
            )))
        }
        _ => Ok(()),
    }
}
