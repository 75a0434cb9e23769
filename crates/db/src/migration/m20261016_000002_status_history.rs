//! Status history migration.
//!
//! One row per applied workflow transition, written in the same database
//! transaction as the status update.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(STATUS_HISTORY_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS transaction_status_history CASCADE;")
            .await?;
        Ok(())
    }
}

const STATUS_HISTORY_SQL: &str = r"
CREATE TABLE transaction_status_history (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    transition VARCHAR(50) NOT NULL,
    from_status transaction_status NOT NULL,
    to_status transaction_status NOT NULL,
    actor_id UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_status_history_transaction
    ON transaction_status_history(transaction_id, created_at);
";
