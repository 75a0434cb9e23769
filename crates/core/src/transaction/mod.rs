//! The workflowed `Transaction` record and its numbering scheme.

mod number;
mod types;

pub use number::{DEFAULT_PREFIX, TransactionNumber};
pub use types::{AmountError, MAX_AMOUNT, Transaction, TransactionType, gross_total};
