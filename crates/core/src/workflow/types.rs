//! Workflow domain types for the transaction lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction status (the workflow "place").
///
/// Happy path: draft → quoted → ordered → in_production → delivered →
/// invoiced → paid. `cancelled` is the abnormal end; both ends can be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Deal initiated, nothing sent yet.
    Draft,
    /// Quote sent to the customer.
    Quoted,
    /// Customer placed the order.
    Ordered,
    /// Work under way.
    InProduction,
    /// Goods or service delivered.
    Delivered,
    /// Invoice issued.
    Invoiced,
    /// Invoice settled.
    Paid,
    /// Deal abandoned.
    Cancelled,
}

impl TransactionStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Draft,
        Self::Quoted,
        Self::Ordered,
        Self::InProduction,
        Self::Delivered,
        Self::Invoiced,
        Self::Paid,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Quoted => "quoted",
            Self::Ordered => "ordered",
            Self::InProduction => "in_production",
            Self::Delivered => "delivered",
            Self::Invoiced => "invoiced",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "quoted" => Some(Self::Quoted),
            "ordered" => Some(Self::Ordered),
            "in_production" => Some(Self::InProduction),
            "delivered" => Some(Self::Delivered),
            "invoiced" => Some(Self::Invoiced),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// True for the two end states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Amounts, customer and assignee may only be edited before production starts.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Quoted | Self::Ordered)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named edge of the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// draft → quoted
    Quote,
    /// quoted → ordered
    Order,
    /// ordered → in_production
    StartProduction,
    /// in_production → delivered
    Deliver,
    /// delivered → invoiced
    Invoice,
    /// invoiced → paid
    MarkPaid,
    /// draft | quoted | ordered | in_production → cancelled
    Cancel,
    /// cancelled | paid → draft
    Reopen,
}

impl Transition {
    /// All transitions in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Quote,
        Self::Order,
        Self::StartProduction,
        Self::Deliver,
        Self::Invoice,
        Self::MarkPaid,
        Self::Cancel,
        Self::Reopen,
    ];

    /// Wire name of the transition.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Order => "order",
            Self::StartProduction => "start_production",
            Self::Deliver => "deliver",
            Self::Invoice => "invoice",
            Self::MarkPaid => "mark_paid",
            Self::Cancel => "cancel",
            Self::Reopen => "reopen",
        }
    }

    /// Parses a wire name. Matching is exact.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a validated (and possibly applied) transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    /// The transition taken.
    pub transition: Transition,
    /// Status before.
    pub from: TransactionStatus,
    /// Status after.
    pub to: TransactionStatus,
    /// Optimistic-lock version the transition was validated against.
    pub expected_version: i32,
}

/// Availability of one transition for a given transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionState {
    /// The transition.
    pub transition: Transition,
    /// Target status.
    pub to: TransactionStatus,
    /// True if the transition can be applied now.
    pub enabled: bool,
    /// Human-readable reasons it cannot, empty when enabled.
    pub blockers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in TransactionStatus::ALL {
            assert_eq!(TransactionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(
            TransactionStatus::parse("IN_PRODUCTION"),
            Some(TransactionStatus::InProduction)
        );
        assert_eq!(TransactionStatus::parse("posted"), None);
    }

    #[test]
    fn test_status_serde_is_snake_case() {
        let json = serde_json::to_string(&TransactionStatus::InProduction).unwrap();
        assert_eq!(json, "\"in_production\"");
    }

    #[test]
    fn test_status_flags() {
        assert!(TransactionStatus::Paid.is_terminal());
        assert!(TransactionStatus::Cancelled.is_terminal());
        assert!(!TransactionStatus::Invoiced.is_terminal());

        assert!(TransactionStatus::Draft.is_editable());
        assert!(TransactionStatus::Ordered.is_editable());
        assert!(!TransactionStatus::InProduction.is_editable());
        assert!(!TransactionStatus::Paid.is_editable());
    }

    #[test]
    fn test_transition_names() {
        for transition in Transition::ALL {
            assert_eq!(Transition::parse(transition.name()), Some(transition));
        }
        assert_eq!(Transition::StartProduction.to_string(), "start_production");
        assert_eq!(Transition::parse("MARK_PAID"), None);
        assert_eq!(Transition::parse("approve"), None);
    }
}
