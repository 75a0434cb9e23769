//! Core business logic for Atrium.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Repositories load data into the types defined here; handlers ask them for
//! decisions.
//!
//! # Modules
//!
//! - `auth` - Password hashing
//! - `authz` - Group-based resource authorization
//! - `transaction` - The workflowed transaction record
//! - `workflow` - Transaction lifecycle state machine

pub mod auth;
pub mod authz;
pub mod transaction;
pub mod workflow;
