//! Workflow repository for transaction state transitions.
//!
//! Validation happens in [`WorkflowEngine`]; this layer makes the write a
//! compare-and-set so that of two requests racing from the same state, at
//! most one succeeds.

use chrono::Utc;
use sea_orm::{
    ActiveEnum, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait, sea_query::Expr,
};
use tracing::{info, warn};
use uuid::Uuid;

use atrium_core::workflow::{
    Transition, TransitionOutcome, TransitionState, WorkflowEngine, WorkflowError,
};

use crate::entities::{
    sea_orm_active_enums::TransactionStatus, transaction_status_history, transactions,
};

/// Workflow repository for transaction state transitions.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
    engine: WorkflowEngine,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, engine: WorkflowEngine) -> Self {
        Self { db, engine }
    }

    /// The engine transitions are validated with.
    #[must_use]
    pub const fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    /// Applies a transition by name.
    ///
    /// Reads the row, validates against the engine, then in one database
    /// transaction updates the status only if status and version are still
    /// what was read, and appends a history row.
    ///
    /// # Errors
    ///
    /// - `UnknownTransition` if `name` is not a transition
    /// - `TransactionNotFound` if missing or soft-deleted
    /// - `InvalidTransition` if not enabled from the current state
    /// - `ConcurrentModification` if another writer got there first
    pub async fn apply_transition(
        &self,
        transaction_id: Uuid,
        name: &str,
        actor_id: Option<Uuid>,
    ) -> Result<transactions::Model, WorkflowError> {
        let transition = Transition::parse(name)
            .ok_or_else(|| WorkflowError::UnknownTransition(name.to_string()))?;

        let current = self.load(transaction_id).await?;
        let domain = current.to_domain().map_err(db_err)?;
        let outcome = self.engine.check(&domain, transition)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        let result = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::Status,
                TransactionStatus::from(outcome.to).as_enum(),
            )
            .col_expr(
                transactions::Column::Version,
                Expr::col(transactions::Column::Version).add(1),
            )
            .col_expr(transactions::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(transactions::Column::Id.eq(transaction_id))
            .filter(transactions::Column::Status.eq(TransactionStatus::from(outcome.from)))
            .filter(transactions::Column::Version.eq(outcome.expected_version))
            .filter(transactions::Column::DeletedAt.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            warn!(
                %transaction_id,
                transition = %transition,
                expected_status = %outcome.from,
                expected_version = outcome.expected_version,
                "Transition lost optimistic-lock race"
            );
            return Err(WorkflowError::ConcurrentModification {
                transaction_id,
                expected: outcome.from,
            });
        }

        let history = history_row(transaction_id, &outcome, actor_id);
        transaction_status_history::Entity::insert(history)
            .exec_without_returning(&txn)
            .await
            .map_err(db_err)?;

        let updated = transactions::Entity::find_by_id(transaction_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::TransactionNotFound(transaction_id))?;

        txn.commit().await.map_err(db_err)?;

        info!(
            %transaction_id,
            transition = %transition,
            from = %outcome.from,
            to = %outcome.to,
            version = updated.version,
            "Transaction status changed"
        );
        Ok(updated)
    }

    /// Every transition with availability and blockers for the transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if missing or soft-deleted.
    pub async fn transition_states(
        &self,
        transaction_id: Uuid,
    ) -> Result<(transactions::Model, Vec<TransitionState>), WorkflowError> {
        let current = self.load(transaction_id).await?;
        let domain = current.to_domain().map_err(db_err)?;
        let states = self.engine.transition_states(&domain);
        Ok((current, states))
    }

    /// Names of transitions currently enabled for the transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if missing or soft-deleted.
    pub async fn enabled_transitions(
        &self,
        transaction_id: Uuid,
    ) -> Result<Vec<Transition>, WorkflowError> {
        let current = self.load(transaction_id).await?;
        let domain = current.to_domain().map_err(db_err)?;
        Ok(self.engine.enabled_transitions(&domain))
    }

    /// Applied transitions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if missing or soft-deleted.
    pub async fn history(
        &self,
        transaction_id: Uuid,
    ) -> Result<Vec<transaction_status_history::Model>, WorkflowError> {
        self.load(transaction_id).await?;

        transaction_status_history::Entity::find()
            .filter(transaction_status_history::Column::TransactionId.eq(transaction_id))
            .order_by_asc(transaction_status_history::Column::CreatedAt)
            .order_by_asc(transaction_status_history::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn load(&self, transaction_id: Uuid) -> Result<transactions::Model, WorkflowError> {
        transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::TransactionNotFound(transaction_id))
    }
}

fn history_row(
    transaction_id: Uuid,
    outcome: &TransitionOutcome,
    actor_id: Option<Uuid>,
) -> transaction_status_history::ActiveModel {
    transaction_status_history::ActiveModel {
        id: Set(Uuid::now_v7()),
        transaction_id: Set(transaction_id),
        transition: Set(outcome.transition.name().to_string()),
        from_status: Set(outcome.from.into()),
        to_status: Set(outcome.to.into()),
        actor_id: Set(actor_id),
        created_at: Set(Utc::now().into()),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn db_err(e: sea_orm::DbErr) -> WorkflowError {
    WorkflowError::Database(e.to_string())
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
