//! Workflow engine for transaction state transitions.
//!
//! The engine is pure: it validates transitions against the
//! [`WorkflowDefinition`] and mutates the in-memory [`Transaction`]. Making the
//! write atomic against concurrent requests is the repository's job, which
//! compares the returned [`TransitionOutcome`] against the stored row.

use tracing::info;

use crate::transaction::Transaction;
use crate::workflow::definition::{WorkflowDefinition, WorkflowPolicy};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{TransactionStatus, Transition, TransitionOutcome, TransitionState};

/// Guarded state machine over [`Transaction::status`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine {
    definition: WorkflowDefinition,
}

impl WorkflowEngine {
    /// Creates an engine over an explicit definition.
    pub const fn new(definition: WorkflowDefinition) -> Self {
        Self { definition }
    }

    /// Creates the standard sales workflow with the given policy.
    pub fn with_policy(policy: WorkflowPolicy) -> Self {
        Self::new(WorkflowDefinition::standard(policy))
    }

    /// The transition table.
    pub const fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// The transaction's current place.
    pub const fn current_place(&self, tx: &Transaction) -> TransactionStatus {
        tx.status
    }

    /// True iff `name` is a known transition that is enabled for `tx`.
    pub fn can(&self, tx: &Transaction, name: &str) -> bool {
        Transition::parse(name).is_some_and(|t| self.can_transition(tx, t))
    }

    /// True iff the status is in the from-set and every guard passes.
    pub fn can_transition(&self, tx: &Transaction, transition: Transition) -> bool {
        self.definition
            .get(transition)
            .is_some_and(|def| def.is_enabled(tx))
    }

    /// Validates a transition without mutating anything.
    pub fn check(
        &self,
        tx: &Transaction,
        transition: Transition,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let def = self
            .definition
            .get(transition)
            .ok_or_else(|| WorkflowError::UnknownTransition(transition.name().to_string()))?;

        let blockers = def.blockers(tx);
        if !blockers.is_empty() {
            return Err(WorkflowError::InvalidTransition {
                transition,
                status: tx.status,
                blockers,
            });
        }

        Ok(TransitionOutcome {
            transition,
            from: tx.status,
            to: def.to,
            expected_version: tx.version,
        })
    }

    /// Applies a transition by wire name.
    ///
    /// On success the status moves to the target and `version` is bumped. On
    /// failure `tx` is left untouched.
    pub fn apply(
        &self,
        tx: &mut Transaction,
        name: &str,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let transition = Transition::parse(name)
            .ok_or_else(|| WorkflowError::UnknownTransition(name.to_string()))?;
        self.apply_transition(tx, transition)
    }

    /// Applies a typed transition. See [`Self::apply`].
    pub fn apply_transition(
        &self,
        tx: &mut Transaction,
        transition: Transition,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let outcome = self.check(tx, transition)?;
        tx.status = outcome.to;
        tx.version += 1;

        info!(
            transaction_id = %tx.id,
            transition = %transition,
            from = %outcome.from,
            to = %outcome.to,
            "Applied workflow transition"
        );
        Ok(outcome)
    }

    /// Transitions currently enabled for `tx`, in declaration order.
    pub fn enabled_transitions(&self, tx: &Transaction) -> Vec<Transition> {
        self.definition
            .iter()
            .filter(|def| def.is_enabled(tx))
            .map(|def| def.transition)
            .collect()
    }

    /// Every transition with its availability and blockers.
    pub fn transition_states(&self, tx: &Transaction) -> Vec<TransitionState> {
        self.definition
            .iter()
            .map(|def| {
                let blockers = def.blockers(tx);
                TransitionState {
                    transition: def.transition,
                    to: def.to,
                    enabled: blockers.is_empty(),
                    blockers,
                }
            })
            .collect()
    }
}
