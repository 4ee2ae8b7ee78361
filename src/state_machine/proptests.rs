//! Property-based tests for the negotiation state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::session::Role;
use crate::thread::PriceInfo;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn context(proposed_by: Role) -> NegotiationContext {
    NegotiationContext::new("101", 0, proposed_by)
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Customer), Just(Role::Professional)]
}

fn arb_price() -> impl Strategy<Value = PriceInfo> {
    prop_oneof![
        (0u32..1000, 0u32..1000).prop_map(|(a, b)| PriceInfo::range(a, b)),
        "[a-zA-Z ]{0,30}".prop_map(PriceInfo::note),
    ]
}

fn arb_valid_price() -> impl Strategy<Value = PriceInfo> {
    prop_oneof![
        (0u32..1000, 0u32..1000).prop_map(|(a, b)| PriceInfo::range(a.min(b), a.max(b))),
        "[a-zA-Z]{1,30}".prop_map(PriceInfo::note),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (arb_role(), arb_price()).prop_map(|(responder, price)| Event::Accept { responder, price }),
        arb_role().prop_map(|responder| Event::Decline { responder }),
        arb_role().prop_map(|actor| Event::Complete { actor }),
        arb_role().prop_map(|actor| Event::Cancel { actor }),
    ]
}

fn arb_state() -> impl Strategy<Value = NegotiationState> {
    prop_oneof![
        Just(NegotiationState::Pending),
        Just(NegotiationState::Declined),
        Just(NegotiationState::Scheduled),
        Just(NegotiationState::Completed),
        Just(NegotiationState::Cancelled),
    ]
}

fn arb_terminal_state() -> impl Strategy<Value = NegotiationState> {
    prop_oneof![
        Just(NegotiationState::Declined),
        Just(NegotiationState::Completed),
        Just(NegotiationState::Cancelled),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: A proposer can never answer their own proposal
    #[test]
    fn prop_self_response_is_wrong_party(
        state in arb_state(),
        proposer in arb_role(),
        price in arb_price(),
        accept in any::<bool>(),
    ) {
        let event = if accept {
            Event::Accept { responder: proposer, price }
        } else {
            Event::Decline { responder: proposer }
        };
        let result = transition(&state, &context(proposer), event);
        prop_assert!(matches!(result, Err(TransitionError::WrongParty(_))));
    }

    // Invariant 2: Terminal states accept no event at all
    #[test]
    fn prop_terminal_states_are_final(
        state in arb_terminal_state(),
        proposer in arb_role(),
        event in arb_event(),
    ) {
        prop_assert!(transition(&state, &context(proposer), event).is_err());
    }

    // Invariant 3: The stored status never returns to Pending and never
    // changes once it has left Pending
    #[test]
    fn prop_status_is_monotonic(
        proposer in arb_role(),
        events in proptest::collection::vec(arb_event(), 0..20),
    ) {
        let ctx = context(proposer);
        let mut state = NegotiationState::Pending;
        let mut settled: Option<ProposalStatus> = None;

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
                let status = state.proposal_status();
                prop_assert_ne!(status, ProposalStatus::Pending);
                if let Some(previous) = settled {
                    prop_assert_eq!(previous, status);
                }
                settled = Some(status);
            }
        }
    }

    // Invariant 4: Every successful transition yields exactly one effect, and
    // a status effect never targets Pending
    #[test]
    fn prop_single_effect_per_transition(
        state in arb_state(),
        proposer in arb_role(),
        event in arb_event(),
    ) {
        if let Ok(result) = transition(&state, &context(proposer), event) {
            prop_assert_eq!(result.effects.len(), 1);
            if let Effect::SetProposalStatus { status, price } = &result.effects[0] {
                prop_assert_ne!(*status, ProposalStatus::Pending);
                prop_assert_eq!(price.is_some(), *status == ProposalStatus::Accepted);
            }
        }
    }

    // Invariant 5: The counterpart can always answer a pending proposal with a
    // well-formed price
    #[test]
    fn prop_counterpart_can_accept(
        proposer in arb_role(),
        price in arb_valid_price(),
    ) {
        let event = Event::Accept { responder: proposer.counterpart(), price: price.clone() };
        let result = transition(&NegotiationState::Pending, &context(proposer), event).unwrap();
        prop_assert_eq!(result.new_state, NegotiationState::Scheduled);
        prop_assert_eq!(&result.effects[0], &Effect::accept(price));
    }

    // Invariant 6: Transitions are pure
    #[test]
    fn prop_transition_is_deterministic(
        state in arb_state(),
        proposer in arb_role(),
        event in arb_event(),
    ) {
        let ctx = context(proposer);
        let first = transition(&state, &ctx, event.clone());
        let second = transition(&state, &ctx, event);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "transition disagreed with itself"),
        }
    }
}
