//! Transaction routes: CRUD plus workflow transitions.
//!
//! Every handler gates on the `Transaction` resource type before touching
//! the database: `Read` for lookups, `Write` to create, `Edit` to change
//! fields or status, `Delete` to soft-delete.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::access::{Access, resources::TRANSACTION};
use crate::error::{error_body, error_response};
use atrium_core::authz::Action;
use atrium_core::transaction::TransactionType;
use atrium_core::workflow::{TransactionStatus, WorkflowError};
use atrium_db::entities::transactions;
use atrium_db::repositories::{
    CreateTransactionInput, TransactionFilter, TransactionRepository, UpdateTransactionInput,
};
use atrium_shared::AppError;
use atrium_shared::types::{Currency, PageRequest, PageResponse};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{id}/transitions", get(list_transitions))
        .route(
            "/transactions/{id}/transitions/{name}",
            post(apply_transition),
        )
        .route("/transactions/{id}/history", get(get_history))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by status (`draft`, `in_production`, ...).
    pub status: Option<String>,
    /// Filter by transaction type.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Filter by assignee.
    pub assignee_id: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (max 100).
    pub per_page: Option<u32>,
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Title.
    pub title: String,
    /// Transaction type, `order` when omitted.
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
    /// Customer company.
    pub customer_id: Option<Uuid>,
    /// Responsible user.
    pub assignee_id: Option<Uuid>,
    /// Net amount.
    #[serde(default)]
    pub net_total: Decimal,
    /// Tax amount.
    #[serde(default)]
    pub tax_total: Decimal,
    /// Currency, EUR when omitted.
    #[serde(default)]
    pub currency: Currency,
}

/// Request body for updating a transaction.
///
/// For `customer_id` and `assignee_id`, an explicit `null` clears the
/// reference while an absent field leaves it alone.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    /// New title.
    pub title: Option<String>,
    /// New customer.
    #[serde(default, deserialize_with = "present")]
    pub customer_id: Option<Option<Uuid>>,
    /// New assignee.
    #[serde(default, deserialize_with = "present")]
    pub assignee_id: Option<Option<Uuid>>,
    /// New net amount.
    pub net_total: Option<Decimal>,
    /// New tax amount.
    pub tax_total: Option<Decimal>,
    /// New currency.
    pub currency: Option<Currency>,
    /// Version the client last read.
    pub version: Option<i32>,
}

/// Maps a present field (even `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Human-readable number, e.g. `TX-2026-000042`.
    pub number: String,
    /// Title.
    pub title: String,
    /// Transaction type.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Workflow status.
    pub status: TransactionStatus,
    /// Customer company.
    pub customer_id: Option<Uuid>,
    /// Responsible user.
    pub assignee_id: Option<Uuid>,
    /// Net amount.
    pub net_total: Decimal,
    /// Tax amount.
    pub tax_total: Decimal,
    /// Net plus tax.
    pub gross_total: Decimal,
    /// Currency code.
    pub currency: String,
    /// Optimistic-lock version.
    pub version: i32,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(m: transactions::Model) -> Self {
        Self {
            id: m.id,
            number: m.number,
            title: m.title,
            transaction_type: m.transaction_type.into(),
            status: m.status.into(),
            customer_id: m.customer_id,
            assignee_id: m.assignee_id,
            net_total: m.net_total,
            tax_total: m.tax_total,
            gross_total: m.gross_total,
            currency: m.currency,
            version: m.version,
            created_at: m.created_at.to_rfc3339(),
            updated_at: m.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactions` - List live transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    access: Access,
    Query(query): Query<ListTransactionsQuery>,
) -> Response {
    if let Err(response) = access.require(Action::Read, TRANSACTION) {
        return response;
    }

    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match TransactionStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return error_response(&AppError::Validation(format!("Unknown status: {raw}")));
            }
        },
    };
    let transaction_type = match query.transaction_type.as_deref() {
        None => None,
        Some(raw) => match TransactionType::parse(raw) {
            Some(kind) => Some(kind),
            None => {
                return error_response(&AppError::Validation(format!(
                    "Unknown transaction type: {raw}"
                )));
            }
        },
    };

    let filter = TransactionFilter {
        status,
        transaction_type,
        customer_id: query.customer_id,
        assignee_id: query.assignee_id,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }
    .normalized();

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.list(&filter, &page).await {
        Ok((rows, total)) => {
            let items = rows.into_iter().map(TransactionResponse::from).collect();
            Json(PageResponse::new(items, page.page, page.per_page, total)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/transactions` - Create a draft.
async fn create_transaction(
    State(state): State<AppState>,
    access: Access,
    Json(payload): Json<CreateTransactionRequest>,
) -> Response {
    if let Err(response) = access.require(Action::Write, TRANSACTION) {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());
    let input = CreateTransactionInput {
        title: payload.title,
        transaction_type: payload.transaction_type,
        customer_id: payload.customer_id,
        assignee_id: payload.assignee_id,
        net_total: payload.net_total,
        tax_total: payload.tax_total,
        currency: payload.currency,
        created_by: Some(access.user_id()),
    };

    match repo.create(input).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(TransactionResponse::from(created)),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/transactions/{id}` - Get a single transaction.
async fn get_transaction(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = access.require(Action::Read, TRANSACTION) {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(model) => Json(TransactionResponse::from(model)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PATCH `/transactions/{id}` - Edit fields while the status allows it.
async fn update_transaction(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> Response {
    if let Err(response) = access.require(Action::Edit, TRANSACTION) {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());
    let input = UpdateTransactionInput {
        title: payload.title,
        customer_id: payload.customer_id,
        assignee_id: payload.assignee_id,
        net_total: payload.net_total,
        tax_total: payload.tax_total,
        currency: payload.currency,
        expected_version: payload.version,
    };

    match repo.update(id, input).await {
        Ok(model) => Json(TransactionResponse::from(model)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE `/transactions/{id}` - Soft delete.
async fn delete_transaction(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = access.require(Action::Delete, TRANSACTION) {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.soft_delete(id).await {
        Ok(()) => {
            info!(transaction_id = %id, user_id = %access.user_id(), "Transaction deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/transactions/{id}/transitions` - Every transition with availability.
async fn list_transitions(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = access.require(Action::Read, TRANSACTION) {
        return response;
    }

    match state.workflow.transition_states(id).await {
        Ok((model, transitions)) => Json(json!({
            "transaction_id": model.id,
            "status": TransactionStatus::from(model.status),
            "version": model.version,
            "transitions": transitions,
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/transactions/{id}/transitions/{name}` - Apply a workflow transition.
///
/// A rejected or lost transition answers with the transitions enabled from
/// the status the transaction is in now.
async fn apply_transition(
    State(state): State<AppState>,
    access: Access,
    Path((id, name)): Path<(Uuid, String)>,
) -> Response {
    if let Err(response) = access.require(Action::Edit, TRANSACTION) {
        return response;
    }

    match state
        .workflow
        .apply_transition(id, &name, Some(access.user_id()))
        .await
    {
        Ok(model) => Json(TransactionResponse::from(model)).into_response(),
        Err(e @ (WorkflowError::InvalidTransition { .. }
        | WorkflowError::ConcurrentModification { .. })) => {
            transition_rejected(&state, id, &e).await
        }
        Err(e) => error_response(&e),
    }
}

async fn transition_rejected(state: &AppState, id: Uuid, err: &WorkflowError) -> Response {
    let enabled: Vec<&'static str> = match state.workflow.enabled_transitions(id).await {
        Ok(transitions) => transitions.iter().map(|t| t.name()).collect(),
        Err(e) => {
            warn!(transaction_id = %id, error = %e, "Could not reload enabled transitions");
            Vec::new()
        }
    };

    let mut body = error_body(err);
    body["enabled_transitions"] = json!(enabled);
    if let WorkflowError::InvalidTransition {
        transition,
        status,
        blockers,
    } = err
    {
        body["transition"] = json!(transition.name());
        body["status"] = json!(status);
        body["blockers"] = json!(blockers);
    }

    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

/// GET `/transactions/{id}/history` - Applied transitions, oldest first.
async fn get_history(
    State(state): State<AppState>,
    access: Access,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = access.require(Action::Read, TRANSACTION) {
        return response;
    }

    match state.workflow.history(id).await {
        Ok(rows) => Json(json!({ "history": rows })).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
#[path = "transactions_tests.rs"]
mod tests;
