//! Tests for the transaction repository against a mock connection.

use super::*;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use std::collections::BTreeMap;

fn row(status: TransactionStatus, version: i32) -> transactions::Model {
    let now = Utc::now().into();
    transactions::Model {
        id: Uuid::now_v7(),
        number: "TX-2026-000001".to_string(),
        title: "Website relaunch".to_string(),
        transaction_type: TransactionType::Project,
        status,
        customer_id: None,
        assignee_id: None,
        net_total: dec!(1000),
        tax_total: dec!(81),
        gross_total: dec!(1081),
        currency: "CHF".to_string(),
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

fn input() -> CreateTransactionInput {
    CreateTransactionInput {
        title: "Website relaunch".to_string(),
        transaction_type: transaction::TransactionType::Project,
        customer_id: None,
        assignee_id: None,
        net_total: dec!(1000),
        tax_total: dec!(81),
        currency: Currency::Chf,
        created_by: None,
    }
}

#[tokio::test]
async fn test_create_starts_as_draft_version_one() {
    let created = row(TransactionStatus::Draft, 1);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<transactions::Model>::new()])
        .append_query_results([vec![created.clone()]])
        .into_connection();

    let model = TransactionRepository::new(db).create(input()).await.unwrap();

    assert_eq!(model.status, TransactionStatus::Draft);
    assert_eq!(model.version, 1);
    assert_eq!(model.gross_total, model.net_total + model.tax_total);
}

#[tokio::test]
async fn test_create_numbers_past_six_digits() {
    let last = transactions::Model {
        number: format!("TX-{}-999999", Utc::now().year()),
        ..row(TransactionStatus::Paid, 7)
    };
    let created = row(TransactionStatus::Draft, 1);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![last]])
        .append_query_results([vec![created]])
        .into_connection();

    TransactionRepository::new(db.clone())
        .create(input())
        .await
        .unwrap();

    let log = db.into_transaction_log();
    let lookup = format!("{:?}", log[0]);
    assert!(lookup.contains("CHAR_LENGTH"), "{lookup}");
    let insert = format!("{:?}", log[1]);
    assert!(insert.contains("-1000000"), "{insert}");
}

#[tokio::test]
async fn test_create_rejects_negative_amounts() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let mut bad = input();
    bad.tax_total = dec!(-1);

    let err = TransactionRepository::new(db).create(bad).await.unwrap_err();
    assert!(matches!(err, TransactionError::Validation(_)));
}

#[tokio::test]
async fn test_create_rejects_amounts_past_column_range() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let mut huge = input();
    huge.net_total = Decimal::MAX;
    huge.tax_total = dec!(1);

    let err = TransactionRepository::new(db).create(huge).await.unwrap_err();
    assert!(matches!(err, TransactionError::Validation(msg) if msg.contains("exceed")));
}

#[tokio::test]
async fn test_create_unknown_customer() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<companies::Model>::new()])
        .into_connection();
    let customer = Uuid::now_v7();
    let mut with_customer = input();
    with_customer.customer_id = Some(customer);

    let err = TransactionRepository::new(db)
        .create(with_customer)
        .await
        .unwrap_err();
    assert!(matches!(err, TransactionError::CustomerNotFound(id) if id == customer));
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<transactions::Model>::new()])
        .into_connection();

    let id = Uuid::now_v7();
    let err = TransactionRepository::new(db).get(id).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_update_closed_after_production_starts() {
    let current = row(TransactionStatus::InProduction, 4);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![current.clone()]])
        .into_connection();

    let err = TransactionRepository::new(db)
        .update(
            current.id,
            UpdateTransactionInput {
                net_total: Some(dec!(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TransactionError::NotEditable {
            status: workflow::TransactionStatus::InProduction,
            ..
        }
    ));
}

#[tokio::test]
async fn test_update_rejects_gross_overflow() {
    let current = row(TransactionStatus::Quoted, 2);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![current.clone()]])
        .into_connection();

    // Tax stays at 81, so the sum passes the column maximum.
    let err = TransactionRepository::new(db)
        .update(
            current.id,
            UpdateTransactionInput {
                net_total: Some(transaction::MAX_AMOUNT),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TransactionError::Validation(_)));
}

#[tokio::test]
async fn test_update_rejects_stale_version() {
    let current = row(TransactionStatus::Quoted, 3);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![current.clone()]])
        .into_connection();

    let err = TransactionRepository::new(db)
        .update(
            current.id,
            UpdateTransactionInput {
                title: Some("Renamed".to_string()),
                expected_version: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn test_update_lost_race() {
    let current = row(TransactionStatus::Draft, 1);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![current.clone()]])
        .append_exec_results([exec(0)])
        .into_connection();

    let err = TransactionRepository::new(db)
        .update(
            current.id,
            UpdateTransactionInput {
                tax_total: Some(dec!(0)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TransactionError::ConcurrentModification(id) if id == current.id));
}

#[tokio::test]
async fn test_update_applies_and_reloads() {
    let current = row(TransactionStatus::Ordered, 2);
    let updated = transactions::Model {
        net_total: dec!(2000),
        gross_total: dec!(2081),
        version: 3,
        ..current.clone()
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![current.clone()]])
        .append_exec_results([exec(1)])
        .append_query_results([vec![updated]])
        .into_connection();

    let model = TransactionRepository::new(db)
        .update(
            current.id,
            UpdateTransactionInput {
                net_total: Some(dec!(2000)),
                expected_version: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(model.version, 3);
    assert_eq!(model.gross_total, dec!(2081));
}

#[tokio::test]
async fn test_soft_delete_twice() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1), exec(0)])
        .into_connection();
    let repo = TransactionRepository::new(db);
    let id = Uuid::now_v7();

    repo.soft_delete(id).await.unwrap();
    let err = repo.soft_delete(id).await.unwrap_err();
    assert!(matches!(err, TransactionError::NotFound(missing) if missing == id));
}

#[tokio::test]
async fn test_list_returns_total() {
    let count = BTreeMap::from([("num_items", Value::BigInt(Some(3)))]);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count]])
        .append_query_results([vec![
            row(TransactionStatus::Draft, 1),
            row(TransactionStatus::Draft, 1),
        ]])
        .into_connection();

    let filter = TransactionFilter {
        status: Some(workflow::TransactionStatus::Draft),
        ..Default::default()
    };
    let page = PageRequest {
        page: 1,
        per_page: 2,
    };
    let (items, total) = TransactionRepository::new(db)
        .list(&filter, &page)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(total, 3);
}
