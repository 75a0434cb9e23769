//! Transaction repository: CRUD with soft delete.
//!
//! Status is never written here; see [`super::workflow::WorkflowRepository`].

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    sea_query::{Expr, Func, SimpleExpr},
};
use tracing::{info, warn};
use uuid::Uuid;

use atrium_core::transaction::{DEFAULT_PREFIX, TransactionNumber};
use atrium_core::{transaction, workflow};
use atrium_shared::types::{Currency, PageRequest};

use crate::entities::{
    companies,
    sea_orm_active_enums::{TransactionStatus, TransactionType},
    transactions, users,
};

/// Attempts at picking a fresh number before giving up.
const NUMBER_ATTEMPTS: usize = 3;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found (or soft-deleted).
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Field edits are closed for this status.
    #[error("Transaction {id} cannot be edited in status '{status}'")]
    NotEditable {
        /// Transaction ID.
        id: Uuid,
        /// Current status.
        status: workflow::TransactionStatus,
    },

    /// Referenced customer does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Referenced assignee does not exist.
    #[error("Assignee not found: {0}")]
    AssigneeNotFound(Uuid),

    /// Invalid input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Row changed since it was read.
    #[error("Transaction {0} was modified concurrently, please reload")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl TransactionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::NotEditable { .. } => 422,
            Self::CustomerNotFound(_) | Self::AssigneeNotFound(_) | Self::Validation(_) => 400,
            Self::ConcurrentModification(_) => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::NotEditable { .. } => "TRANSACTION_NOT_EDITABLE",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::AssigneeNotFound(_) => "ASSIGNEE_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Short description.
    pub title: String,
    /// Deal kind.
    pub transaction_type: transaction::TransactionType,
    /// Customer company.
    pub customer_id: Option<Uuid>,
    /// Responsible user.
    pub assignee_id: Option<Uuid>,
    /// Net amount.
    pub net_total: Decimal,
    /// Tax amount.
    pub tax_total: Decimal,
    /// Currency of both amounts.
    pub currency: Currency,
    /// Creating user.
    pub created_by: Option<Uuid>,
}

/// Partial update of the editable fields.
///
/// `Some(None)` clears an optional reference.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    /// New title.
    pub title: Option<String>,
    /// New customer.
    pub customer_id: Option<Option<Uuid>>,
    /// New assignee.
    pub assignee_id: Option<Option<Uuid>>,
    /// New net amount.
    pub net_total: Option<Decimal>,
    /// New tax amount.
    pub tax_total: Option<Decimal>,
    /// New currency.
    pub currency: Option<Currency>,
    /// Version the caller last saw. Stale versions are rejected.
    pub expected_version: Option<i32>,
}

/// Filters for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only this status.
    pub status: Option<workflow::TransactionStatus>,
    /// Only this type.
    pub transaction_type: Option<transaction::TransactionType>,
    /// Only this customer.
    pub customer_id: Option<Uuid>,
    /// Only this assignee.
    pub assignee_id: Option<Uuid>,
}

/// Transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft at version 1 with the next number of the current year.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input, `CustomerNotFound` /
    /// `AssigneeNotFound` for dangling references.
    pub async fn create(
        &self,
        input: CreateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        validate_title(&input.title)?;
        let gross_total = checked_gross(input.net_total, input.tax_total)?;
        self.check_references(input.customer_id, input.assignee_id)
            .await?;

        let year = Utc::now().year();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let number = self.next_number(year).await?;
            let now = Utc::now().into();
            let model = transactions::ActiveModel {
                id: Set(Uuid::now_v7()),
                number: Set(number.clone()),
                title: Set(input.title.trim().to_string()),
                transaction_type: Set(input.transaction_type.into()),
                status: Set(TransactionStatus::Draft),
                customer_id: Set(input.customer_id),
                assignee_id: Set(input.assignee_id),
                net_total: Set(input.net_total),
                tax_total: Set(input.tax_total),
                gross_total: Set(gross_total),
                currency: Set(input.currency.as_str().to_string()),
                version: Set(1),
                created_by: Set(input.created_by),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            };

            match model.insert(&self.db).await {
                Ok(created) => {
                    info!(
                        transaction_id = %created.id,
                        number = %created.number,
                        "Created transaction"
                    );
                    return Ok(created);
                }
                Err(err)
                    if attempt < NUMBER_ATTEMPTS
                        && matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    warn!(%number, attempt, "Transaction number taken, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Gets a live transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing or soft-deleted.
    pub async fn get(&self, id: Uuid) -> Result<transactions::Model, TransactionError> {
        transactions::Entity::find_by_id(id)
            .filter(transactions::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }

    /// Lists live transactions, newest first.
    ///
    /// Returns the page and the total number of matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<(Vec<transactions::Model>, u64), TransactionError> {
        let page = page.normalized();
        let mut query =
            transactions::Entity::find().filter(transactions::Column::DeletedAt.is_null());

        if let Some(status) = filter.status {
            query = query.filter(
                transactions::Column::Status.eq(TransactionStatus::from(status)),
            );
        }
        if let Some(kind) = filter.transaction_type {
            query = query.filter(
                transactions::Column::TransactionType.eq(TransactionType::from(kind)),
            );
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(transactions::Column::CustomerId.eq(customer_id));
        }
        if let Some(assignee_id) = filter.assignee_id {
            query = query.filter(transactions::Column::AssigneeId.eq(assignee_id));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Updates editable fields while the status allows it.
    ///
    /// The write is conditioned on the version and status that were read, and
    /// bumps the version.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` past `ordered`, `ConcurrentModification` if the
    /// row changed in between or `expected_version` is stale.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateTransactionInput,
    ) -> Result<transactions::Model, TransactionError> {
        let current = self.get(id).await?;
        let status: workflow::TransactionStatus = current.status.into();
        if !status.is_editable() {
            return Err(TransactionError::NotEditable { id, status });
        }
        if input.expected_version.is_some_and(|v| v != current.version) {
            return Err(TransactionError::ConcurrentModification(id));
        }

        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        let net_total = input.net_total.unwrap_or(current.net_total);
        let tax_total = input.tax_total.unwrap_or(current.tax_total);
        let gross_total = checked_gross(net_total, tax_total)?;
        self.check_references(input.customer_id.flatten(), input.assignee_id.flatten())
            .await?;

        let mut changes = transactions::ActiveModel {
            net_total: Set(net_total),
            tax_total: Set(tax_total),
            gross_total: Set(gross_total),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        if let Some(title) = input.title {
            changes.title = Set(title.trim().to_string());
        }
        if let Some(customer_id) = input.customer_id {
            changes.customer_id = Set(customer_id);
        }
        if let Some(assignee_id) = input.assignee_id {
            changes.assignee_id = Set(assignee_id);
        }
        if let Some(currency) = input.currency {
            changes.currency = Set(currency.as_str().to_string());
        }

        let result = transactions::Entity::update_many()
            .set(changes)
            .col_expr(
                transactions::Column::Version,
                Expr::col(transactions::Column::Version).add(1),
            )
            .filter(transactions::Column::Id.eq(id))
            .filter(transactions::Column::Version.eq(current.version))
            .filter(transactions::Column::Status.eq(current.status))
            .filter(transactions::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            warn!(transaction_id = %id, version = current.version, "Lost update race");
            return Err(TransactionError::ConcurrentModification(id));
        }

        self.get(id).await
    }

    /// Soft-deletes a transaction. Rows are never removed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if missing or already deleted.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), TransactionError> {
        let now = Utc::now();
        let result = transactions::Entity::update_many()
            .col_expr(transactions::Column::DeletedAt, Expr::value(now))
            .col_expr(transactions::Column::UpdatedAt, Expr::value(now))
            .filter(transactions::Column::Id.eq(id))
            .filter(transactions::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(TransactionError::NotFound(id));
        }

        info!(transaction_id = %id, "Soft-deleted transaction");
        Ok(())
    }

    /// Next free number for `year`, counting soft-deleted rows too.
    ///
    /// Sequences past six digits are longer, so the highest number is the
    /// longest one first and the lexicographic maximum among those.
    async fn next_number(&self, year: i32) -> Result<String, TransactionError> {
        let last = transactions::Entity::find()
            .filter(
                transactions::Column::Number.starts_with(format!("{DEFAULT_PREFIX}-{year}-")),
            )
            .order_by_desc(SimpleExpr::from(Func::char_length(Expr::col(
                transactions::Column::Number,
            ))))
            .order_by_desc(transactions::Column::Number)
            .one(&self.db)
            .await?;

        Ok(TransactionNumber::next(
            DEFAULT_PREFIX,
            year,
            last.as_ref().map(|m| m.number.as_str()),
        ))
    }

    async fn check_references(
        &self,
        customer_id: Option<Uuid>,
        assignee_id: Option<Uuid>,
    ) -> Result<(), TransactionError> {
        if let Some(customer_id) = customer_id {
            companies::Entity::find_by_id(customer_id)
                .filter(companies::Column::DeletedAt.is_null())
                .one(&self.db)
                .await?
                .ok_or(TransactionError::CustomerNotFound(customer_id))?;
        }
        if let Some(assignee_id) = assignee_id {
            users::Entity::find_by_id(assignee_id)
                .one(&self.db)
                .await?
                .ok_or(TransactionError::AssigneeNotFound(assignee_id))?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), TransactionError> {
    if title.trim().is_empty() {
        return Err(TransactionError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn checked_gross(net_total: Decimal, tax_total: Decimal) -> Result<Decimal, TransactionError> {
    transaction::gross_total(net_total, tax_total)
        .map_err(|e| TransactionError::Validation(e.to_string()))
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
