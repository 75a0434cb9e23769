//! `SeaORM` Entity for permission_grants table.
//!
//! At most one row per (group, resource type).

use atrium_core::authz::PermissionGrant;
use atrium_shared::types::{GroupId, ResourceTypeId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "permission_grants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub resource_type_id: Uuid,
    pub can_read: bool,
    pub can_write: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id"
    )]
    Groups,
    #[sea_orm(
        belongs_to = "super::resource_types::Entity",
        from = "Column::ResourceTypeId",
        to = "super::resource_types::Column::Id"
    )]
    ResourceTypes,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::resource_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ResourceTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for PermissionGrant {
    fn from(model: &Model) -> Self {
        Self {
            group_id: GroupId::from_uuid(model.group_id),
            resource_type_id: ResourceTypeId::from_uuid(model.resource_type_id),
            can_read: model.can_read,
            can_write: model.can_write,
        }
    }
}
