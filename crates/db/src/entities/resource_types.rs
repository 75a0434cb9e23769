//! `SeaORM` Entity for resource_types table.

use atrium_core::authz::ResourceType;
use atrium_shared::types::ResourceTypeId;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "resource_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(unique)]
    pub name: String,
    pub icon: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::permission_grants::Entity")]
    PermissionGrants,
}

impl Related<super::permission_grants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PermissionGrants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ResourceType {
    fn from(model: Model) -> Self {
        Self {
            id: ResourceTypeId::from_uuid(model.id),
            code: model.code,
            name: model.name,
            icon: model.icon,
        }
    }
}
