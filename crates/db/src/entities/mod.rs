//! `SeaORM` entity definitions.

pub mod companies;
pub mod groups;
pub mod permission_grants;
pub mod resource_types;
pub mod sea_orm_active_enums;
pub mod transaction_status_history;
pub mod transactions;
pub mod user_groups;
pub mod users;

use sea_orm::prelude::Json;
use std::collections::BTreeSet;

/// Reads a JSON array of role strings. Anything else yields no roles.
pub fn roles_from_json(value: &Json) -> BTreeSet<String> {
    value
        .as_array()
        .map(|roles| {
            roles
                .iter()
                .filter_map(|r| r.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Serializes roles as a sorted JSON array.
pub fn roles_to_json<I, S>(roles: I) -> Json
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let set: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
    Json::Array(set.into_iter().map(Json::String).collect())
}
