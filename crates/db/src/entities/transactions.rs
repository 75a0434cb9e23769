//! `SeaORM` Entity for transactions table.

use atrium_core::transaction::Transaction;
use atrium_shared::types::{CompanyId, Currency, TransactionId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{TransactionStatus, TransactionType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub title: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub customer_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub net_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub tax_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub gross_total: Decimal,
    pub currency: String,
    pub version: i32,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CustomerId",
        to = "super::companies::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssigneeId",
        to = "super::users::Column::Id"
    )]
    Assignee,
    #[sea_orm(has_many = "super::transaction_status_history::Entity")]
    StatusHistory,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::transaction_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the workflow's domain type.
    ///
    /// # Errors
    ///
    /// Returns `DbErr::Type` if the stored currency code is unknown.
    pub fn to_domain(&self) -> Result<Transaction, DbErr> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: String| DbErr::Type(format!("transaction {}: {e}", self.id)))?;

        Ok(Transaction {
            id: TransactionId::from_uuid(self.id),
            number: self.number.clone(),
            title: self.title.clone(),
            transaction_type: self.transaction_type.into(),
            status: self.status.into(),
            customer_id: self.customer_id.map(CompanyId::from_uuid),
            assignee_id: self.assignee_id.map(UserId::from_uuid),
            net_total: self.net_total,
            tax_total: self.tax_total,
            gross_total: self.gross_total,
            currency,
            version: self.version,
        })
    }

    /// True once soft-deleted.
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
