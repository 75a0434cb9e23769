//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod catalog_cache;
pub mod company;
pub mod group;
pub mod permission;
pub mod transaction;
pub mod user;
pub mod workflow;

pub use catalog_cache::{CatalogCache, DEFAULT_CATALOG_TTL_SECS};
pub use company::CompanyRepository;
pub use group::{GroupError, GroupRepository};
pub use permission::{CreateResourceTypeInput, PermissionError, PermissionRepository};
pub use transaction::{
    CreateTransactionInput, TransactionError, TransactionFilter, TransactionRepository,
    UpdateTransactionInput,
};
pub use user::UserRepository;
pub use workflow::WorkflowRepository;
