//! Property-based tests for the authorization engine.

use std::collections::BTreeSet;

use proptest::prelude::*;

use atrium_shared::types::{GroupId, ResourceTypeId, UserId};

use super::catalog::{GrantTable, ResourceCatalog};
use super::engine::AuthorizationEngine;
use super::types::{Action, GroupMembership, PermissionGrant, Principal, ResourceType};

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Read),
        Just(Action::Write),
        Just(Action::Edit),
        Just(Action::Delete),
    ]
}

/// Role names that never collide with the admin role.
fn arb_roles() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("ROLE_[A-Z]{1,8}", 0..4)
        .prop_map(|roles| roles.into_iter().filter(|r| r != "ROLE_ADMIN").collect())
}

fn arb_catalog() -> impl Strategy<Value = Vec<ResourceType>> {
    proptest::collection::btree_set("[A-Z][a-z]{2,10}", 1..6).prop_map(|codes| {
        codes
            .into_iter()
            .map(|code| ResourceType {
                id: ResourceTypeId::new(),
                name: format!("{code} records"),
                code,
                icon: None,
            })
            .collect()
    })
}

fn membership(id: GroupId, roles: BTreeSet<String>) -> GroupMembership {
    GroupMembership {
        id,
        name: format!("group-{id}"),
        roles,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Admins are allowed every action on every known resource type.
    #[test]
    fn prop_admin_allowed_everything(
        types in arb_catalog(),
        roles in arb_roles(),
        action in arb_action(),
        pick in any::<prop::sample::Index>(),
    ) {
        let engine = AuthorizationEngine::default();
        let resource = pick.get(&types).clone();
        let catalog = ResourceCatalog::new(types);
        let mut all_roles = roles;
        all_roles.insert("ROLE_ADMIN".to_string());
        let admin = Principal::new(UserId::new(), "admin@atrium.dev", all_roles);

        prop_assert!(engine.authorize(Some(&admin), action, (&resource).into(), &catalog, &GrantTable::default()));
        prop_assert!(engine.authorize(Some(&admin), action, resource.code.as_str().into(), &catalog, &GrantTable::default()));
        prop_assert!(engine.authorize(Some(&admin), action, resource.name.as_str().into(), &catalog, &GrantTable::default()));
    }

    /// Non-admins without groups are denied everything, whatever grants exist.
    #[test]
    fn prop_groupless_principal_denied(
        types in arb_catalog(),
        roles in arb_roles(),
        action in arb_action(),
        pick in any::<prop::sample::Index>(),
    ) {
        let engine = AuthorizationEngine::default();
        let resource = pick.get(&types).clone();
        let grants = GrantTable::new(types.iter().map(|t| PermissionGrant {
            group_id: GroupId::new(),
            resource_type_id: t.id,
            can_read: true,
            can_write: true,
        }));
        let catalog = ResourceCatalog::new(types);
        let principal = Principal::new(UserId::new(), "p@atrium.dev", roles);

        prop_assert!(!engine.authorize(Some(&principal), action, (&resource).into(), &catalog, &grants));
    }

    /// A read-only grant allows Read and nothing else.
    #[test]
    fn prop_read_only_grant(
        types in arb_catalog(),
        group_roles in arb_roles(),
        action in arb_action(),
        pick in any::<prop::sample::Index>(),
    ) {
        let engine = AuthorizationEngine::default();
        let resource = pick.get(&types).clone();
        let group = GroupId::new();
        let grants = GrantTable::new([PermissionGrant {
            group_id: group,
            resource_type_id: resource.id,
            can_read: true,
            can_write: false,
        }]);
        let catalog = ResourceCatalog::new(types);
        let principal = Principal::new(UserId::new(), "p@atrium.dev", Vec::new())
            .with_group(membership(group, group_roles));

        let allowed = engine.authorize(Some(&principal), action, resource.code.as_str().into(), &catalog, &grants);
        prop_assert_eq!(allowed, action == Action::Read);
    }

    /// One permitting group among many is enough.
    #[test]
    fn prop_any_group_suffices(
        types in arb_catalog(),
        extra_groups in 0usize..5,
        action in arb_action(),
        pick in any::<prop::sample::Index>(),
    ) {
        let engine = AuthorizationEngine::default();
        let resource = pick.get(&types).clone();
        let granting = GroupId::new();
        let grants = GrantTable::new([PermissionGrant {
            group_id: granting,
            resource_type_id: resource.id,
            can_read: true,
            can_write: true,
        }]);
        let catalog = ResourceCatalog::new(types);
        let mut principal = Principal::new(UserId::new(), "p@atrium.dev", Vec::new());
        for _ in 0..extra_groups {
            principal = principal.with_group(membership(GroupId::new(), BTreeSet::new()));
        }
        principal = principal.with_group(membership(granting, BTreeSet::new()));

        prop_assert!(engine.authorize(Some(&principal), action, (&resource).into(), &catalog, &grants));
    }

    /// Deciding twice over unchanged data gives the same answer.
    #[test]
    fn prop_decide_is_idempotent(
        types in arb_catalog(),
        can_read in any::<bool>(),
        can_write in any::<bool>(),
        action in arb_action(),
        reference in "[A-Za-z]{1,12}",
    ) {
        let engine = AuthorizationEngine::default();
        let group = GroupId::new();
        let grants = GrantTable::new(types.iter().map(|t| PermissionGrant {
            group_id: group,
            resource_type_id: t.id,
            can_read,
            can_write,
        }));
        let catalog = ResourceCatalog::new(types);
        let principal = Principal::new(UserId::new(), "p@atrium.dev", Vec::new())
            .with_group(membership(group, BTreeSet::new()));

        let first = engine.decide(Some(&principal), action, reference.as_str().into(), &catalog, &grants);
        let second = engine.decide(Some(&principal), action, reference.as_str().into(), &catalog, &grants);
        prop_assert_eq!(first, second);
    }
}
