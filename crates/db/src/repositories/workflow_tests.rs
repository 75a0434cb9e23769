//! Tests for the workflow repository against a mock connection.
//!
//! The mock replays queued results in order, which lets a test script the
//! interleaving of two writers that read the same row.

use super::*;
use atrium_core::workflow::TransactionStatus as Status;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use crate::entities::sea_orm_active_enums::TransactionType;

fn row(id: Uuid, status: TransactionStatus, version: i32) -> transactions::Model {
    let now = Utc::now().into();
    transactions::Model {
        id,
        number: "TX-2026-000042".to_string(),
        title: "Trade fair booth".to_string(),
        transaction_type: TransactionType::Order,
        status,
        customer_id: None,
        assignee_id: None,
        net_total: dec!(500),
        tax_total: dec!(40.5),
        gross_total: dec!(540.5),
        currency: "EUR".to_string(),
        version,
        created_by: None,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn repo(db: DatabaseConnection) -> WorkflowRepository {
    WorkflowRepository::new(db, WorkflowEngine::default())
}

#[tokio::test]
async fn test_apply_quote_from_draft() {
    let id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(id, TransactionStatus::Draft, 1)]])
        .append_exec_results([exec(1), exec(1)])
        .append_query_results([vec![row(id, TransactionStatus::Quoted, 2)]])
        .into_connection();

    let updated = repo(db)
        .apply_transition(id, "quote", Some(Uuid::now_v7()))
        .await
        .unwrap();

    assert_eq!(updated.status, TransactionStatus::Quoted);
    assert_eq!(updated.version, 2);
}

#[tokio::test]
async fn test_unknown_transition_skips_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let err = repo(db)
        .apply_transition(Uuid::now_v7(), "approve", None)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::UnknownTransition(name) if name == "approve"));
}

#[tokio::test]
async fn test_invalid_transition_never_writes() {
    let id = Uuid::now_v7();
    // No exec results queued: any write would fail the test with a mock error.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(id, TransactionStatus::Draft, 1)]])
        .into_connection();

    let err = repo(db)
        .apply_transition(id, "mark_paid", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::InvalidTransition {
            transition: Transition::MarkPaid,
            status: Status::Draft,
            ..
        }
    ));
}

#[tokio::test]
async fn test_missing_transaction() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<transactions::Model>::new()])
        .into_connection();

    let id = Uuid::now_v7();
    let err = repo(db).apply_transition(id, "quote", None).await.unwrap_err();
    assert!(matches!(err, WorkflowError::TransactionNotFound(missing) if missing == id));
}

#[tokio::test]
async fn test_mark_paid_and_cancel_from_invoiced() {
    let id = Uuid::now_v7();
    // Both requests read the row while it is invoiced at version 6.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(id, TransactionStatus::Invoiced, 6)]])
        .append_exec_results([exec(1), exec(1)])
        .append_query_results([vec![row(id, TransactionStatus::Paid, 7)]])
        .append_query_results([vec![row(id, TransactionStatus::Invoiced, 6)]])
        .into_connection();
    let repo = repo(db);

    let paid = repo.apply_transition(id, "mark_paid", None).await.unwrap();
    assert_eq!(paid.status, TransactionStatus::Paid);

    let err = repo.apply_transition(id, "cancel", None).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_second_writer_from_same_state_loses() {
    let id = Uuid::now_v7();
    // deliver and cancel are both valid from in_production. The first write
    // matches; the second finds status/version moved and updates zero rows.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(id, TransactionStatus::InProduction, 4)]])
        .append_exec_results([exec(1), exec(1)])
        .append_query_results([vec![row(id, TransactionStatus::Delivered, 5)]])
        .append_query_results([vec![row(id, TransactionStatus::InProduction, 4)]])
        .append_exec_results([exec(0)])
        .into_connection();
    let repo = repo(db);

    let delivered = repo.apply_transition(id, "deliver", None).await.unwrap();
    assert_eq!(delivered.status, TransactionStatus::Delivered);

    let err = repo.apply_transition(id, "cancel", None).await.unwrap_err();
    match err {
        WorkflowError::ConcurrentModification {
            transaction_id,
            expected,
        } => {
            assert_eq!(transaction_id, id);
            assert_eq!(expected, Status::InProduction);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_transition_states() {
    let id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(id, TransactionStatus::Delivered, 5)]])
        .into_connection();

    let (model, states) = repo(db).transition_states(id).await.unwrap();

    assert_eq!(model.id, id);
    let enabled: Vec<_> = states
        .iter()
        .filter(|s| s.enabled)
        .map(|s| s.transition)
        .collect();
    assert_eq!(enabled, vec![Transition::Invoice]);
}

#[tokio::test]
async fn test_history_ordered() {
    let id = Uuid::now_v7();
    let entry = |transition: &str, from, to| transaction_status_history::Model {
        id: Uuid::now_v7(),
        transaction_id: id,
        transition: transition.to_string(),
        from_status: from,
        to_status: to,
        actor_id: None,
        created_at: Utc::now().into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row(id, TransactionStatus::Ordered, 3)]])
        .append_query_results([vec![
            entry("quote", TransactionStatus::Draft, TransactionStatus::Quoted),
            entry("order", TransactionStatus::Quoted, TransactionStatus::Ordered),
        ]])
        .into_connection();

    let history = repo(db).history(id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].transition, "quote");
    assert_eq!(history[1].to_status, TransactionStatus::Ordered);
}
