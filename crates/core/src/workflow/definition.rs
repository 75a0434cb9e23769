//! The static transition table and its guards.

use atrium_shared::config::WorkflowConfig;

use crate::transaction::Transaction;
use crate::workflow::types::{TransactionStatus, Transition};

/// A named predicate that must hold for a transition to be enabled.
#[derive(Debug, Clone, Copy)]
pub struct Guard {
    /// Message shown when the predicate fails.
    pub blocker: &'static str,
    /// The predicate.
    pub check: fn(&Transaction) -> bool,
}

impl Guard {
    /// Returns the blocker message if the guard fails.
    pub fn evaluate(&self, tx: &Transaction) -> Option<&'static str> {
        (!(self.check)(tx)).then_some(self.blocker)
    }
}

/// One edge set of the workflow graph.
#[derive(Debug, Clone)]
pub struct TransitionDefinition {
    /// Transition name.
    pub transition: Transition,
    /// Statuses the transition may start from.
    pub from: Vec<TransactionStatus>,
    /// Resulting status.
    pub to: TransactionStatus,
    /// Additional predicates, all must pass.
    pub guards: Vec<Guard>,
}

impl TransitionDefinition {
    fn new(transition: Transition, from: &[TransactionStatus], to: TransactionStatus) -> Self {
        Self {
            transition,
            from: from.to_vec(),
            to,
            guards: Vec::new(),
        }
    }

    fn guarded(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// True if `status` is in the from-set.
    pub fn starts_from(&self, status: TransactionStatus) -> bool {
        self.from.contains(&status)
    }

    /// Every reason the transition is currently blocked. Empty means enabled.
    pub fn blockers(&self, tx: &Transaction) -> Vec<String> {
        if !self.starts_from(tx.status) {
            return vec![format!(
                "transition `{}` is not available from status `{}`",
                self.transition, tx.status
            )];
        }
        self.guards
            .iter()
            .filter_map(|guard| guard.evaluate(tx))
            .map(str::to_string)
            .collect()
    }

    /// True if the status matches and every guard passes.
    pub fn is_enabled(&self, tx: &Transaction) -> bool {
        self.starts_from(tx.status) && self.guards.iter().all(|g| (g.check)(tx))
    }
}

/// Business policy switches that add or relax guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Allow `reopen` from `paid` (from `cancelled` is always allowed).
    pub allow_reopen_paid: bool,
    /// Require a positive gross total before `invoice`.
    pub require_total_before_invoice: bool,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            allow_reopen_paid: true,
            require_total_before_invoice: false,
        }
    }
}

impl From<&WorkflowConfig> for WorkflowPolicy {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            allow_reopen_paid: config.allow_reopen_paid,
            require_total_before_invoice: config.require_total_before_invoice,
        }
    }
}

const REOPEN_NOT_PAID: Guard = Guard {
    blocker: "reopening a paid transaction is disabled by policy",
    check: |tx| tx.status != TransactionStatus::Paid,
};

const POSITIVE_TOTAL: Guard = Guard {
    blocker: "gross total must be greater than zero before invoicing",
    check: |tx| tx.gross().is_positive(),
};

/// The full transition table.
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    transitions: Vec<TransitionDefinition>,
}

impl WorkflowDefinition {
    /// The sales workflow, with guards chosen by `policy`.
    pub fn standard(policy: WorkflowPolicy) -> Self {
        use TransactionStatus::{
            Cancelled, Delivered, Draft, InProduction, Invoiced, Ordered, Paid, Quoted,
        };

        let mut invoice = TransitionDefinition::new(Transition::Invoice, &[Delivered], Invoiced);
        if policy.require_total_before_invoice {
            invoice = invoice.guarded(POSITIVE_TOTAL);
        }

        let mut reopen = TransitionDefinition::new(Transition::Reopen, &[Cancelled, Paid], Draft);
        if !policy.allow_reopen_paid {
            reopen = reopen.guarded(REOPEN_NOT_PAID);
        }

        Self {
            transitions: vec![
                TransitionDefinition::new(Transition::Quote, &[Draft], Quoted),
                TransitionDefinition::new(Transition::Order, &[Quoted], Ordered),
                TransitionDefinition::new(Transition::StartProduction, &[Ordered], InProduction),
                TransitionDefinition::new(Transition::Deliver, &[InProduction], Delivered),
                invoice,
                TransitionDefinition::new(Transition::MarkPaid, &[Invoiced], Paid),
                TransitionDefinition::new(
                    Transition::Cancel,
                    &[Draft, Quoted, Ordered, InProduction],
                    Cancelled,
                ),
                reopen,
            ],
        }
    }

    /// Looks up a transition.
    pub fn get(&self, transition: Transition) -> Option<&TransitionDefinition> {
        self.transitions.iter().find(|d| d.transition == transition)
    }

    /// All transitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionDefinition> {
        self.transitions.iter()
    }
}

impl Default for WorkflowDefinition {
    fn default() -> Self {
        Self::standard(WorkflowPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionType;
    use atrium_shared::types::Currency;
    use rust_decimal_macros::dec;

    fn tx(status: TransactionStatus) -> Transaction {
        let mut tx = Transaction::draft(
            "TX-2026-000001",
            "Test",
            TransactionType::Order,
            Currency::Eur,
        );
        tx.status = status;
        tx
    }

    #[test]
    fn test_every_transition_is_defined_once() {
        let def = WorkflowDefinition::default();
        for t in Transition::ALL {
            assert_eq!(def.iter().filter(|d| d.transition == t).count(), 1, "{t}");
        }
    }

    #[test]
    fn test_status_blocker_message() {
        let def = WorkflowDefinition::default();
        let quote = def.get(Transition::Quote).unwrap();
        assert_eq!(
            quote.blockers(&tx(TransactionStatus::Ordered)),
            vec!["transition `quote` is not available from status `ordered`".to_string()]
        );
        assert!(quote.blockers(&tx(TransactionStatus::Draft)).is_empty());
    }

    #[test]
    fn test_reopen_paid_policy() {
        let permissive = WorkflowDefinition::default();
        let reopen = permissive.get(Transition::Reopen).unwrap();
        assert!(reopen.is_enabled(&tx(TransactionStatus::Paid)));

        let strict = WorkflowDefinition::standard(WorkflowPolicy {
            allow_reopen_paid: false,
            ..WorkflowPolicy::default()
        });
        let reopen = strict.get(Transition::Reopen).unwrap();
        assert!(!reopen.is_enabled(&tx(TransactionStatus::Paid)));
        assert!(reopen.is_enabled(&tx(TransactionStatus::Cancelled)));
        assert_eq!(
            reopen.blockers(&tx(TransactionStatus::Paid)),
            vec![REOPEN_NOT_PAID.blocker.to_string()]
        );
    }

    #[test]
    fn test_invoice_total_guard() {
        let def = WorkflowDefinition::standard(WorkflowPolicy {
            require_total_before_invoice: true,
            ..WorkflowPolicy::default()
        });
        let invoice = def.get(Transition::Invoice).unwrap();

        let mut delivered = tx(TransactionStatus::Delivered);
        assert!(!invoice.is_enabled(&delivered));

        delivered.set_amounts(dec!(100), dec!(19)).unwrap();
        assert!(invoice.is_enabled(&delivered));
    }

    #[test]
    fn test_policy_from_config() {
        let config = WorkflowConfig {
            allow_reopen_paid: false,
            require_total_before_invoice: true,
        };
        let policy = WorkflowPolicy::from(&config);
        assert!(!policy.allow_reopen_paid);
        assert!(policy.require_total_before_invoice);
    }
}
