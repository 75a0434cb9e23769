//! Property-based tests for WorkflowEngine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::transaction::{Transaction, TransactionType};
use crate::workflow::definition::WorkflowPolicy;
use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowEngine;
use crate::workflow::types::{TransactionStatus, Transition};
use atrium_shared::types::Currency;

fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    proptest::sample::select(TransactionStatus::ALL.to_vec())
}

fn arb_transition() -> impl Strategy<Value = Transition> {
    proptest::sample::select(Transition::ALL.to_vec())
}

fn arb_policy() -> impl Strategy<Value = WorkflowPolicy> {
    (any::<bool>(), any::<bool>()).prop_map(|(allow_reopen_paid, require_total_before_invoice)| {
        WorkflowPolicy {
            allow_reopen_paid,
            require_total_before_invoice,
        }
    })
}

fn arb_tx() -> impl Strategy<Value = Transaction> {
    (arb_status(), 0i64..1_000_000, 1i32..1000).prop_map(|(status, cents, version)| {
        let mut tx = Transaction::draft(
            "TX-2026-000001",
            "Generated",
            TransactionType::Service,
            Currency::Chf,
        );
        tx.status = status;
        tx.set_amounts(Decimal::new(cents, 2), Decimal::ZERO).unwrap();
        tx.version = version;
        tx
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `quote` is possible iff the transaction is a draft, and not again after applying it.
    #[test]
    fn prop_quote_iff_draft(mut tx in arb_tx(), policy in arb_policy()) {
        let engine = WorkflowEngine::with_policy(policy);
        let was_draft = tx.status == TransactionStatus::Draft;
        prop_assert_eq!(engine.can(&tx, "quote"), was_draft);

        if was_draft {
            engine.apply(&mut tx, "quote").unwrap();
            prop_assert_eq!(tx.status, TransactionStatus::Quoted);
            prop_assert!(!engine.can(&tx, "quote"));
        }
    }

    /// The happy path from draft always ends at paid when totals are positive.
    #[test]
    fn prop_happy_path_ends_paid(cents in 1i64..1_000_000, policy in arb_policy()) {
        let engine = WorkflowEngine::with_policy(policy);
        let mut tx = Transaction::draft(
            "TX-2026-000001",
            "Deal",
            TransactionType::Order,
            Currency::Eur,
        );
        tx.set_amounts(Decimal::new(cents, 2), Decimal::ZERO).unwrap();

        for name in ["quote", "order", "start_production", "deliver", "invoice", "mark_paid"] {
            prop_assert!(engine.apply(&mut tx, name).is_ok(), "{} failed", name);
        }
        prop_assert_eq!(tx.status, TransactionStatus::Paid);
        prop_assert_eq!(tx.version, 7);
    }

    /// A refused transition leaves the transaction unchanged.
    #[test]
    fn prop_invalid_transition_is_side_effect_free(
        mut tx in arb_tx(),
        transition in arb_transition(),
        policy in arb_policy(),
    ) {
        let engine = WorkflowEngine::with_policy(policy);
        let before = tx.clone();

        match engine.apply_transition(&mut tx, transition) {
            Ok(outcome) => {
                prop_assert_eq!(outcome.from, before.status);
                prop_assert_eq!(tx.status, outcome.to);
                prop_assert_eq!(tx.version, before.version + 1);
            }
            Err(WorkflowError::InvalidTransition { status, blockers, .. }) => {
                prop_assert_eq!(status, before.status);
                prop_assert!(!blockers.is_empty());
                prop_assert_eq!(tx, before);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// Enabled transitions, `can` and `transition_states` agree.
    #[test]
    fn prop_introspection_is_consistent(tx in arb_tx(), policy in arb_policy()) {
        let engine = WorkflowEngine::with_policy(policy);
        let enabled = engine.enabled_transitions(&tx);

        for state in engine.transition_states(&tx) {
            prop_assert_eq!(state.enabled, enabled.contains(&state.transition));
            prop_assert_eq!(state.enabled, engine.can(&tx, state.transition.name()));
            prop_assert_eq!(state.enabled, state.blockers.is_empty());
        }
    }

    /// Terminal statuses only ever offer `reopen`.
    #[test]
    fn prop_terminal_only_reopens(tx in arb_tx(), policy in arb_policy()) {
        let engine = WorkflowEngine::with_policy(policy);
        if tx.status.is_terminal() {
            for t in engine.enabled_transitions(&tx) {
                prop_assert_eq!(t, Transition::Reopen);
            }
        }
    }
}
