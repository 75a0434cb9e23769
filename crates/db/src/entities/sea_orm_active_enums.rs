//! Postgres enum types and their mapping to core types.

use atrium_core::{transaction, workflow};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `transaction_status` enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "quoted")]
    Quoted,
    #[sea_orm(string_value = "ordered")]
    Ordered,
    #[sea_orm(string_value = "in_production")]
    InProduction,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "invoiced")]
    Invoiced,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// `transaction_type` enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "quote")]
    Quote,
    #[sea_orm(string_value = "order")]
    Order,
    #[sea_orm(string_value = "service")]
    Service,
    #[sea_orm(string_value = "retainer")]
    Retainer,
    #[sea_orm(string_value = "project")]
    Project,
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<TransactionStatus> for workflow::TransactionStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Draft => Self::Draft,
            TransactionStatus::Quoted => Self::Quoted,
            TransactionStatus::Ordered => Self::Ordered,
            TransactionStatus::InProduction => Self::InProduction,
            TransactionStatus::Delivered => Self::Delivered,
            TransactionStatus::Invoiced => Self::Invoiced,
            TransactionStatus::Paid => Self::Paid,
            TransactionStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<workflow::TransactionStatus> for TransactionStatus {
    fn from(status: workflow::TransactionStatus) -> Self {
        use workflow::TransactionStatus as Core;
        match status {
            Core::Draft => Self::Draft,
            Core::Quoted => Self::Quoted,
            Core::Ordered => Self::Ordered,
            Core::InProduction => Self::InProduction,
            Core::Delivered => Self::Delivered,
            Core::Invoiced => Self::Invoiced,
            Core::Paid => Self::Paid,
            Core::Cancelled => Self::Cancelled,
        }
    }
}

impl From<TransactionType> for transaction::TransactionType {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Quote => Self::Quote,
            TransactionType::Order => Self::Order,
            TransactionType::Service => Self::Service,
            TransactionType::Retainer => Self::Retainer,
            TransactionType::Project => Self::Project,
            TransactionType::Other => Self::Other,
        }
    }
}

impl From<transaction::TransactionType> for TransactionType {
    fn from(kind: transaction::TransactionType) -> Self {
        use transaction::TransactionType as Core;
        match kind {
            Core::Quote => Self::Quote,
            Core::Order => Self::Order,
            Core::Service => Self::Service,
            Core::Retainer => Self::Retainer,
            Core::Project => Self::Project,
            Core::Other => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_matches_wire_names() {
        for status in TransactionStatus::iter() {
            let core: workflow::TransactionStatus = status.into();
            assert_eq!(status.to_value(), core.as_str());
            assert_eq!(TransactionStatus::from(core), status);
        }
    }

    #[test]
    fn test_type_mapping_matches_wire_names() {
        for kind in TransactionType::iter() {
            let core: transaction::TransactionType = kind.into();
            assert_eq!(kind.to_value(), core.as_str());
            assert_eq!(TransactionType::from(core), kind);
        }
    }
}
