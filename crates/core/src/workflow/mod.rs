//! Transaction workflow: a guarded finite state machine.
//!
//! # Modules
//!
//! - `types` - Statuses, transitions and outcomes
//! - `definition` - The transition table, guards and policy
//! - `error` - Workflow-specific error types
//! - `service` - The engine that validates and applies transitions

pub mod definition;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use definition::{Guard, TransitionDefinition, WorkflowDefinition, WorkflowPolicy};
pub use error::WorkflowError;
pub use service::WorkflowEngine;
pub use types::{TransactionStatus, Transition, TransitionOutcome, TransitionState};
