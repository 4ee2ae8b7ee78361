//! In-memory thread store
//!
//! The store is the single source of truth for every inquiry. Each thread sits
//! behind its own mutex, so mutations on one inquiry are serialized while other
//! inquiries stay independent.

use super::message::{form_title, Message, MessageKind, PriceInfo, Proposal, ProposalStatus, Resolution};
use crate::error::{EngineError, EngineResult};
use crate::session::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// A value held once for each side of the negotiation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerRole<T> {
    pub customer: T,
    pub professional: T,
}

impl<T> PerRole<T> {
    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::Customer => &self.customer,
            Role::Professional => &self.professional,
        }
    }

    pub fn get_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::Customer => &mut self.customer,
            Role::Professional => &mut self.professional,
        }
    }
}

/// One inquiry and its ordered message history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryThread {
    inquiry_id: String,
    messages: Vec<Message>,
    /// Role of the first message's sender
    initiator: Option<Role>,
    /// Display names, fixed the first time each party speaks
    party_names: PerRole<Option<String>>,
    title: Option<String>,
    address: Option<String>,
    /// Number of leading messages each party has seen
    read_marks: PerRole<usize>,
}

impl InquiryThread {
    fn new(inquiry_id: &str) -> Self {
        Self {
            inquiry_id: inquiry_id.to_string(),
            messages: Vec::new(),
            initiator: None,
            party_names: PerRole::default(),
            title: None,
            address: None,
            read_marks: PerRole::default(),
        }
    }

    pub fn inquiry_id(&self) -> &str {
        &self.inquiry_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn initiator(&self) -> Option<Role> {
        self.initiator
    }

    pub fn party_name(&self, role: Role) -> Option<&str> {
        self.party_names.get(role).as_deref()
    }

    /// Name of the party on the other side from `viewer`
    pub fn counterparty_name(&self, viewer: Role) -> &str {
        let other = viewer.counterpart();
        self.party_name(other)
            .unwrap_or_else(|| other.placeholder_name())
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().map(|m| m.sent_at).max()
    }

    /// The most recently appended proposal and its index
    pub fn latest_proposal(&self) -> Option<(usize, &Proposal)> {
        self.messages
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, msg)| msg.as_proposal().map(|p| (index, p)))
    }

    /// Whether the other party has written since `viewer` last read the thread
    pub fn is_unread_for(&self, viewer: Role) -> bool {
        let seen = *self.read_marks.get(viewer);
        self.messages
            .iter()
            .skip(seen)
            .any(|m| m.sender != viewer)
    }

    fn push(&mut self, message: Message) -> usize {
        let sender = message.sender;
        if self.initiator.is_none() {
            self.initiator = Some(sender);
        }
        let name = self.party_names.get_mut(sender);
        if name.is_none() {
            *name = Some(message.sender_name.clone());
        }
        if self.title.is_none() {
            if let MessageKind::FormSubmission { fields } = &message.kind {
                self.title = form_title(fields);
            }
        }

        self.messages.push(message);
        // Writing a message implies having read everything before it
        *self.read_marks.get_mut(sender) = self.messages.len();
        self.messages.len() - 1
    }

    fn proposal_mut(&mut self, index: usize) -> EngineResult<&mut Proposal> {
        let inquiry_id = &self.inquiry_id;
        self.messages
            .get_mut(index)
            .and_then(Message::as_proposal_mut)
            .ok_or_else(|| EngineError::message_not_found(inquiry_id, index))
    }
}

/// Serializable copy of every thread, ordered by inquiry id
pub type ThreadSnapshot = Vec<InquiryThread>;

/// Thread-safe store handle
#[derive(Clone, Default)]
pub struct ThreadStore {
    threads: Arc<RwLock<HashMap<String, Arc<Mutex<InquiryThread>>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn validate_inquiry_id(inquiry_id: &str) -> EngineResult<()> {
    if inquiry_id.trim().is_empty() {
        return Err(EngineError::InvalidInquiry(inquiry_id.to_string()));
    }
    Ok(())
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from a snapshot
    pub fn from_snapshot(snapshot: ThreadSnapshot) -> Self {
        let threads = snapshot
            .into_iter()
            .map(|t| (t.inquiry_id.clone(), Arc::new(Mutex::new(t))))
            .collect();
        Self {
            threads: Arc::new(RwLock::new(threads)),
        }
    }

    fn existing(&self, inquiry_id: &str) -> Option<Arc<Mutex<InquiryThread>>> {
        let threads = self.threads.read().unwrap_or_else(PoisonError::into_inner);
        threads.get(inquiry_id).cloned()
    }

    fn get_or_create(&self, inquiry_id: &str) -> Arc<Mutex<InquiryThread>> {
        if let Some(thread) = self.existing(inquiry_id) {
            return thread;
        }
        let mut threads = self.threads.write().unwrap_or_else(PoisonError::into_inner);
        threads
            .entry(inquiry_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(inquiry_id = %inquiry_id, "Creating thread");
                Arc::new(Mutex::new(InquiryThread::new(inquiry_id)))
            })
            .clone()
    }

    fn with_existing<R>(
        &self,
        inquiry_id: &str,
        index: usize,
        f: impl FnOnce(&mut InquiryThread) -> EngineResult<R>,
    ) -> EngineResult<R> {
        validate_inquiry_id(inquiry_id)?;
        let thread = self
            .existing(inquiry_id)
            .ok_or_else(|| EngineError::message_not_found(inquiry_id, index))?;
        let mut guard = lock(&thread);
        f(&mut guard)
    }

    // ==================== Thread Operations ====================

    /// Append a message, creating the thread on first use
    pub fn append(&self, inquiry_id: &str, message: Message) -> EngineResult<usize> {
        self.append_if(inquiry_id, message, |_| Ok(()))
    }

    /// Append a message only if `guard` accepts the thread as it is right now
    ///
    /// The check and the append happen under the same lock.
    pub fn append_if(
        &self,
        inquiry_id: &str,
        message: Message,
        guard: impl FnOnce(&InquiryThread) -> EngineResult<()>,
    ) -> EngineResult<usize> {
        validate_inquiry_id(inquiry_id)?;
        let thread = self.get_or_create(inquiry_id);
        let mut thread = lock(&thread);
        guard(&thread)?;
        let index = thread.push(message);
        tracing::debug!(inquiry_id = %inquiry_id, index, "Appended message");
        Ok(index)
    }

    /// Full ordered thread; empty for an inquiry nobody has written to
    pub fn get(&self, inquiry_id: &str) -> Vec<Message> {
        self.existing(inquiry_id)
            .map(|t| {
                let thread = lock(&t);
                thread.messages.clone()
            })
            .unwrap_or_default()
    }

    /// Snapshot of one thread, including its party and read metadata
    pub fn thread(&self, inquiry_id: &str) -> Option<InquiryThread> {
        self.existing(inquiry_id).map(|t| {
            let thread = lock(&t);
            thread.clone()
        })
    }

    /// Snapshot of every thread, ordered by inquiry id
    pub fn threads(&self) -> ThreadSnapshot {
        let handles: Vec<_> = {
            let threads = self.threads.read().unwrap_or_else(PoisonError::into_inner);
            threads.values().cloned().collect()
        };
        let mut snapshot: Vec<InquiryThread> = handles.iter().map(|t| lock(t).clone()).collect();
        snapshot.sort_by(|a, b| a.inquiry_id.cmp(&b.inquiry_id));
        snapshot
    }

    /// Copy of the proposal embedded at `index`
    pub fn proposal(&self, inquiry_id: &str, index: usize) -> EngineResult<Proposal> {
        self.with_existing(inquiry_id, index, |thread| {
            thread.proposal_mut(index).cloned()
        })
    }

    /// Move a pending proposal to `new_status`
    ///
    /// `price` is recorded only on acceptance.
    pub fn update_proposal_status(
        &self,
        inquiry_id: &str,
        index: usize,
        new_status: ProposalStatus,
        price: Option<PriceInfo>,
    ) -> EngineResult<()> {
        self.with_existing(inquiry_id, index, |thread| {
            let proposal = thread.proposal_mut(index)?;
            if proposal.status != ProposalStatus::Pending {
                return Err(EngineError::InvalidTransition(format!(
                    "proposal is already {}",
                    proposal.status
                )));
            }
            if new_status == ProposalStatus::Pending {
                return Err(EngineError::InvalidTransition(
                    "proposal is already pending".to_string(),
                ));
            }
            proposal.status = new_status;
            proposal.price = match new_status {
                ProposalStatus::Accepted => price,
                _ => None,
            };
            Ok(())
        })
    }

    /// Record the completion or cancellation of an accepted appointment
    pub fn resolve_appointment(
        &self,
        inquiry_id: &str,
        index: usize,
        resolution: Resolution,
    ) -> EngineResult<()> {
        self.with_existing(inquiry_id, index, |thread| {
            let proposal = thread.proposal_mut(index)?;
            if proposal.status != ProposalStatus::Accepted {
                return Err(EngineError::InvalidTransition(format!(
                    "proposal is {}, not accepted",
                    proposal.status
                )));
            }
            if let Some(existing) = &proposal.resolution {
                return Err(EngineError::InvalidTransition(format!(
                    "appointment is already {}",
                    existing.outcome
                )));
            }
            proposal.resolution = Some(resolution);
            Ok(())
        })
    }

    pub fn set_address(&self, inquiry_id: &str, address: impl Into<String>) -> EngineResult<()> {
        validate_inquiry_id(inquiry_id)?;
        let thread = self
            .existing(inquiry_id)
            .ok_or_else(|| EngineError::NotFound(format!("inquiry {inquiry_id}")))?;
        lock(&thread).address = Some(address.into());
        Ok(())
    }

    /// Mark every current message as seen by `role`; a no-op for unknown inquiries
    pub fn mark_read(&self, inquiry_id: &str, role: Role) {
        if let Some(thread) = self.existing(inquiry_id) {
            let mut thread = lock(&thread);
            let len = thread.messages.len();
            *thread.read_marks.get_mut(role) = len;
        }
    }

    pub fn inquiry_ids(&self) -> Vec<String> {
        let threads = self.threads.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = threads.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::state_machine::state::AppointmentOutcome;
    use crate::thread::FormField;
    use chrono::TimeZone;

    fn customer() -> Session {
        Session::customer("john_s")
    }

    fn professional() -> Session {
        Session::professional("Pro Plumbers Inc.")
    }

    fn proposal_at_ten() -> Message {
        Message::proposal(&customer(), Utc.with_ymd_and_hms(2025, 10, 2, 10, 0, 0).unwrap())
    }

    #[test]
    fn test_unknown_inquiry_reads_empty() {
        let store = ThreadStore::new();
        assert!(store.get("404").is_empty());
        assert!(store.thread("404").is_none());
        assert!(store.get("").is_empty());
    }

    #[test]
    fn test_append_returns_positions() {
        let store = ThreadStore::new();
        assert_eq!(store.append("101", Message::plain(&customer(), "a")).unwrap(), 0);
        assert_eq!(store.append("101", Message::plain(&customer(), "a")).unwrap(), 1);
        assert_eq!(store.append("102", Message::plain(&customer(), "b")).unwrap(), 0);
        assert_eq!(store.get("101").len(), 2);
    }

    #[test]
    fn test_append_rejects_empty_inquiry_id() {
        let store = ThreadStore::new();
        let err = store.append("", Message::plain(&customer(), "hi")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInquiry(_)));
        let err = store.append("  ", Message::plain(&customer(), "hi")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInquiry(_)));
        assert!(store.inquiry_ids().is_empty());
    }

    #[test]
    fn test_reads_have_no_side_effects() {
        let store = ThreadStore::new();
        store.append("101", Message::plain(&customer(), "hello")).unwrap();
        store.append("101", proposal_at_ten()).unwrap();
        assert_eq!(store.get("101"), store.get("101"));
    }

    #[test]
    fn test_parties_fixed_on_first_message() {
        let store = ThreadStore::new();
        store
            .append(
                "101",
                Message::form(&customer(), vec![FormField::new("What is the issue?", "Leaky Faucet")]),
            )
            .unwrap();
        store.append("101", Message::plain(&professional(), "On my way")).unwrap();
        store
            .append("101", Message::plain(&Session::customer("renamed"), "ok"))
            .unwrap();

        let thread = store.thread("101").unwrap();
        assert_eq!(thread.initiator(), Some(Role::Customer));
        assert_eq!(thread.party_name(Role::Customer), Some("john_s"));
        assert_eq!(thread.counterparty_name(Role::Customer), "Pro Plumbers Inc.");
        assert_eq!(thread.counterparty_name(Role::Professional), "john_s");
        assert_eq!(thread.title(), Some("Leaky Faucet"));
    }

    #[test]
    fn test_counterparty_placeholder_before_reply() {
        let store = ThreadStore::new();
        store.append("102", Message::plain(&customer(), "hello?")).unwrap();
        let thread = store.thread("102").unwrap();
        assert_eq!(thread.counterparty_name(Role::Customer), "Professional");
    }

    #[test]
    fn test_update_status_not_found() {
        let store = ThreadStore::new();
        store.append("101", Message::plain(&customer(), "hi")).unwrap();

        let err = store
            .update_proposal_status("101", 5, ProposalStatus::Accepted, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));

        let err = store
            .update_proposal_status("101", 0, ProposalStatus::Accepted, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));

        let err = store
            .update_proposal_status("999", 0, ProposalStatus::Accepted, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn test_update_status_only_from_pending() {
        let store = ThreadStore::new();
        let index = store.append("101", proposal_at_ten()).unwrap();

        store
            .update_proposal_status("101", index, ProposalStatus::Declined, None)
            .unwrap();
        let err = store
            .update_proposal_status("101", index, ProposalStatus::Accepted, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));

        let proposal = store.proposal("101", index).unwrap();
        assert_eq!(proposal.status, ProposalStatus::Declined);
    }

    #[test]
    fn test_update_status_rejects_pending_target() {
        let store = ThreadStore::new();
        let index = store.append("101", proposal_at_ten()).unwrap();
        let err = store
            .update_proposal_status("101", index, ProposalStatus::Pending, None)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
    }

    #[test]
    fn test_price_kept_only_on_accept() {
        let store = ThreadStore::new();
        let first = store.append("101", proposal_at_ten()).unwrap();
        let second = store.append("101", proposal_at_ten()).unwrap();

        store
            .update_proposal_status(
                "101",
                first,
                ProposalStatus::Declined,
                Some(PriceInfo::range(1, 2)),
            )
            .unwrap();
        store
            .update_proposal_status(
                "101",
                second,
                ProposalStatus::Accepted,
                Some(PriceInfo::range(150, 250)),
            )
            .unwrap();

        assert_eq!(store.proposal("101", first).unwrap().price, None);
        assert_eq!(
            store.proposal("101", second).unwrap().price,
            Some(PriceInfo::range(150, 250))
        );
    }

    #[test]
    fn test_resolve_requires_accepted() {
        let store = ThreadStore::new();
        let index = store.append("101", proposal_at_ten()).unwrap();
        let resolution = Resolution::new(AppointmentOutcome::Completed, Role::Professional);

        let err = store
            .resolve_appointment("101", index, resolution.clone())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));

        store
            .update_proposal_status("101", index, ProposalStatus::Accepted, Some(PriceInfo::range(1, 2)))
            .unwrap();
        store.resolve_appointment("101", index, resolution.clone()).unwrap();

        let err = store.resolve_appointment("101", index, resolution).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
        assert_eq!(
            store.proposal("101", index).unwrap().status,
            ProposalStatus::Accepted
        );
    }

    #[test]
    fn test_read_tracking() {
        let store = ThreadStore::new();
        store.append("101", Message::plain(&customer(), "hi")).unwrap();

        let thread = store.thread("101").unwrap();
        assert!(thread.is_unread_for(Role::Professional));
        assert!(!thread.is_unread_for(Role::Customer));

        store.mark_read("101", Role::Professional);
        assert!(!store.thread("101").unwrap().is_unread_for(Role::Professional));

        store.append("101", Message::plain(&professional(), "hello")).unwrap();
        let thread = store.thread("101").unwrap();
        assert!(thread.is_unread_for(Role::Customer));
        assert!(!thread.is_unread_for(Role::Professional));

        store.mark_read("nope", Role::Customer);
    }

    #[test]
    fn test_append_if_guard_blocks_append() {
        let store = ThreadStore::new();
        store.append("101", Message::plain(&customer(), "hi")).unwrap();
        let err = store
            .append_if("101", Message::plain(&customer(), "again"), |_| {
                Err(EngineError::InvalidTransition("blocked".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
        assert_eq!(store.get("101").len(), 1);
    }

    #[test]
    fn test_set_address_requires_thread() {
        let store = ThreadStore::new();
        assert!(matches!(
            store.set_address("101", "123 Main St"),
            Err(EngineError::NotFound(_))
        ));
        store.append("101", Message::plain(&customer(), "hi")).unwrap();
        store.set_address("101", "123 Main St").unwrap();
        assert_eq!(store.thread("101").unwrap().address(), Some("123 Main St"));
    }

    #[test]
    fn test_snapshot_restores_threads() {
        let store = ThreadStore::new();
        store.append("102", Message::plain(&customer(), "b")).unwrap();
        store.append("101", proposal_at_ten()).unwrap();

        let snapshot = store.threads();
        assert_eq!(snapshot[0].inquiry_id(), "101");

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = ThreadStore::from_snapshot(serde_json::from_str(&json).unwrap());
        assert_eq!(restored.inquiry_ids(), vec!["101".to_string(), "102".to_string()]);
        assert_eq!(restored.get("101"), store.get("101"));
    }

    #[test]
    fn test_concurrent_responses_first_writer_wins() {
        let store = ThreadStore::new();
        let index = store.append("101", proposal_at_ten()).unwrap();

        let handles: Vec<_> = [ProposalStatus::Accepted, ProposalStatus::Declined]
            .into_iter()
            .map(|status| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.update_proposal_status("101", index, status, Some(PriceInfo::range(1, 2)))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, EngineError::InvalidTransition(_))));
    }
}
