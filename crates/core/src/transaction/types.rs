//! Transaction domain types.

use atrium_shared::types::{CompanyId, Currency, Money, TransactionId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::workflow::TransactionStatus;

/// Kind of business deal a transaction represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Quote only.
    Quote,
    /// Direct order.
    #[default]
    Order,
    /// Service engagement.
    Service,
    /// Recurring retainer.
    Retainer,
    /// Project work.
    Project,
    /// Anything else.
    Other,
}

impl TransactionType {
    /// All transaction types.
    pub const ALL: [Self; 6] = [
        Self::Quote,
        Self::Order,
        Self::Service,
        Self::Retainer,
        Self::Project,
        Self::Other,
    ];

    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Order => "order",
            Self::Service => "service",
            Self::Retainer => "retainer",
            Self::Project => "project",
            Self::Other => "other",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == lower)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest amount a `NUMERIC(19, 4)` column holds: `999_999_999_999_999.9999`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, 4);

/// Rejected transaction amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Net or tax amount below zero.
    #[error("amounts must not be negative")]
    Negative,

    /// An amount, or their sum, exceeds [`MAX_AMOUNT`].
    #[error("amounts must not exceed {MAX_AMOUNT}")]
    OutOfRange,
}

/// Validates both amounts and returns `net_total + tax_total`.
///
/// # Errors
///
/// Returns [`AmountError`] for negative amounts or totals past [`MAX_AMOUNT`].
pub fn gross_total(net_total: Decimal, tax_total: Decimal) -> Result<Decimal, AmountError> {
    if net_total < Decimal::ZERO || tax_total < Decimal::ZERO {
        return Err(AmountError::Negative);
    }
    net_total
        .checked_add(tax_total)
        .filter(|gross| *gross <= MAX_AMOUNT)
        .ok_or(AmountError::OutOfRange)
}

/// A business transaction moving through the sales workflow.
///
/// `status` changes only through [`crate::workflow::WorkflowEngine::apply`];
/// every applied transition bumps `version`, which the persistence layer uses
/// as its optimistic lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Human-facing unique number, e.g. `TX-2026-000042`.
    pub number: String,
    /// Short description.
    pub title: String,
    /// Deal kind.
    pub transaction_type: TransactionType,
    /// Current workflow status.
    pub status: TransactionStatus,
    /// Customer company.
    pub customer_id: Option<CompanyId>,
    /// Responsible user.
    pub assignee_id: Option<UserId>,
    /// Net amount.
    pub net_total: Decimal,
    /// Tax amount.
    pub tax_total: Decimal,
    /// Gross amount (net + tax).
    pub gross_total: Decimal,
    /// Currency of all amounts.
    pub currency: Currency,
    /// Optimistic-lock version, starts at 1.
    pub version: i32,
}

impl Transaction {
    /// Creates a new draft with zero totals.
    pub fn draft(
        number: impl Into<String>,
        title: impl Into<String>,
        transaction_type: TransactionType,
        currency: Currency,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            number: number.into(),
            title: title.into(),
            transaction_type,
            status: TransactionStatus::Draft,
            customer_id: None,
            assignee_id: None,
            net_total: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            gross_total: Decimal::ZERO,
            currency,
            version: 1,
        }
    }

    /// Sets net and tax amounts and recomputes the gross total.
    ///
    /// # Errors
    ///
    /// See [`gross_total`]. On error the amounts are left unchanged.
    pub fn set_amounts(
        &mut self,
        net_total: Decimal,
        tax_total: Decimal,
    ) -> Result<(), AmountError> {
        self.gross_total = gross_total(net_total, tax_total)?;
        self.net_total = net_total;
        self.tax_total = tax_total;
        Ok(())
    }

    /// Gross total as money.
    #[must_use]
    pub fn gross(&self) -> Money {
        Money::new(self.gross_total, self.currency)
    }

    /// True while amounts, customer and assignee may be edited.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        self.status.is_editable()
    }
}
