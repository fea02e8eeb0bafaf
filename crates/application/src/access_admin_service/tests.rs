use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use chrono::{Duration, Utc};
use tenura_core::{AppError, DomainId};
use tenura_domain::{PermissionRegistry, Role, UserId};

use crate::test_support::{FakeAccessStore, FakeDirectory};
use crate::{InviteRecord, PermissionGrant, PolicyStore, RoleAssignmentRepository};

use super::AccessAdminService;

struct Fixture {
    store: Arc<FakeAccessStore>,
    directory: Arc<FakeDirectory>,
    service: AccessAdminService,
}

async fn fixture() -> Fixture {
    let store = Arc::new(FakeAccessStore::default());
    let directory = Arc::new(FakeDirectory::default());
    let policies = match PolicyStore::load(store.clone()).await {
        Ok(policies) => policies,
        Err(error) => panic!("failed to load policy store: {error}"),
    };
    let service = AccessAdminService::new(
        Arc::new(PermissionRegistry::standard()),
        policies,
        store.clone(),
        store.clone(),
        directory.clone(),
    );

    Fixture {
        store,
        directory,
        service,
    }
}

async fn owners(fixture: &Fixture, domain_id: DomainId) -> BTreeSet<UserId> {
    fixture
        .store
        .users_with_role(domain_id, Role::Owner)
        .await
        .unwrap_or_default()
}

#[tokio::test]
async fn unknown_permission_is_rejected_before_storage() {
    let fixture = fixture().await;
    fixture.store.set_unavailable(true);

    let result = fixture
        .service
        .add_policy_for_role(Role::Owner, DomainId::new(), "UnknownResource", "read")
        .await;

    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("permission not exist")));
}

#[tokio::test]
async fn one_invalid_pair_rejects_whole_batch() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();

    let result = fixture
        .service
        .add_policies_for_role(
            Role::Moderator,
            domain_id,
            &[
                PermissionGrant::new("Events", "read"),
                PermissionGrant::new("Events", "invite"),
            ],
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(
        fixture
            .service
            .policies_for_role(Role::Moderator, domain_id)
            .await
            .is_empty()
    );
}

#[tokio::test]
async fn policy_round_trip_through_facade() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let grants = [
        PermissionGrant::new("Jobs", "create"),
        PermissionGrant::new("Jobs", "delete"),
    ];

    assert!(matches!(
        fixture
            .service
            .add_policies_for_role(Role::Moderator, domain_id, &grants)
            .await,
        Ok(true)
    ));
    assert!(matches!(
        fixture
            .service
            .add_policy_for_role(Role::Moderator, domain_id, "Jobs", "create")
            .await,
        Ok(false)
    ));
    assert!(matches!(
        fixture
            .service
            .roles_granted(domain_id, "Jobs", "delete")
            .await,
        Ok(roles) if roles == BTreeSet::from([Role::Moderator])
    ));
    assert!(matches!(
        fixture
            .service
            .delete_policies_for_role(Role::Moderator, domain_id, &grants)
            .await,
        Ok(true)
    ));
    assert!(matches!(
        fixture
            .service
            .delete_policy_for_role(Role::Moderator, domain_id, "Jobs", "create")
            .await,
        Ok(false)
    ));
}

#[tokio::test]
async fn add_role_for_unknown_user_is_not_applied() {
    let fixture = fixture().await;

    let result = fixture
        .service
        .add_role_for_user(UserId::new(), Role::Moderator, DomainId::new())
        .await;

    assert!(matches!(result, Ok(false)));
}

#[tokio::test]
async fn add_role_for_existing_member_is_not_applied() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let user_id = fixture.directory.add_user("Dana", "dana@x.com").await;

    assert!(matches!(
        fixture
            .service
            .add_role_for_user(user_id, Role::Moderator, domain_id)
            .await,
        Ok(true)
    ));
    assert!(matches!(
        fixture
            .service
            .add_role_for_user(user_id, Role::Owner, domain_id)
            .await,
        Ok(false)
    ));
    assert!(matches!(
        fixture.service.roles_of(user_id, domain_id).await,
        Ok(roles) if roles == vec![Role::Moderator]
    ));
}

#[tokio::test]
async fn sole_owner_cannot_be_removed() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let owner = fixture.directory.add_user("Alice", "alice@x.com").await;
    assert!(matches!(
        fixture
            .service
            .add_role_for_user(owner, Role::Owner, domain_id)
            .await,
        Ok(true)
    ));

    assert!(matches!(
        fixture.service.remove_member(owner, domain_id).await,
        Ok(false)
    ));
    assert_eq!(owners(&fixture, domain_id).await, BTreeSet::from([owner]));
    assert!(matches!(
        fixture.service.edit_role(owner, domain_id, "moderator").await,
        Ok(false)
    ));
    assert!(matches!(
        fixture.service.can_remove_or_demote(domain_id, owner).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn co_owner_can_be_demoted() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let first = fixture.directory.add_user("Alice", "alice@x.com").await;
    let second = fixture.directory.add_user("Bea", "bea@x.com").await;
    for owner in [first, second] {
        assert!(matches!(
            fixture
                .service
                .add_role_for_user(owner, Role::Owner, domain_id)
                .await,
            Ok(true)
        ));
    }

    assert!(matches!(
        fixture.service.edit_role(first, domain_id, "moderator").await,
        Ok(true)
    ));
    assert_eq!(owners(&fixture, domain_id).await, BTreeSet::from([second]));
}

#[tokio::test]
async fn unknown_role_name_is_not_applied() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let user_id = fixture.directory.add_user("Dana", "dana@x.com").await;
    assert!(matches!(
        fixture
            .service
            .add_role_for_user(user_id, Role::Moderator, domain_id)
            .await,
        Ok(true)
    ));

    assert!(matches!(
        fixture.service.edit_role(user_id, domain_id, "admin").await,
        Ok(false)
    ));
    assert!(matches!(
        fixture.service.edit_role(UserId::new(), domain_id, "owner").await,
        Ok(false)
    ));
}

#[tokio::test]
async fn list_members_orders_owners_first() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let moderator = fixture.directory.add_user("Aaron", "aaron@x.com").await;
    let owner = fixture.directory.add_user("Zoe", "zoe@x.com").await;
    let ghost = UserId::new();
    assert!(matches!(
        fixture
            .service
            .add_role_for_user(moderator, Role::Moderator, domain_id)
            .await,
        Ok(true)
    ));
    assert!(matches!(
        fixture
            .service
            .add_role_for_user(owner, Role::Owner, domain_id)
            .await,
        Ok(true)
    ));
    assert!(matches!(
        fixture
            .store
            .assign_role(ghost, domain_id, Role::Moderator)
            .await,
        Ok(true)
    ));

    let members = fixture
        .service
        .list_members(domain_id)
        .await
        .unwrap_or_default();

    assert_eq!(members.len(), 3);
    assert_eq!(members[0].user_id, owner);
    assert_eq!(members[0].email.as_deref(), Some("zoe@x.com"));
    assert_eq!(members[1].user_id, ghost);
    assert_eq!(members[1].display_name, None);
    assert_eq!(members[2].display_name.as_deref(), Some("Aaron"));
}

#[tokio::test]
async fn initialize_domain_seeds_owner_and_defaults() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let owner = fixture.directory.add_user("Alice", "alice@x.com").await;

    assert!(matches!(
        fixture.service.initialize_domain(domain_id, owner).await,
        Ok(true)
    ));
    assert!(matches!(
        fixture.service.initialize_domain(domain_id, owner).await,
        Ok(false)
    ));
    assert_eq!(owners(&fixture, domain_id).await, BTreeSet::from([owner]));
    assert!(
        fixture
            .service
            .policies_for_role(Role::Owner, domain_id)
            .await
            .contains_key("Policies")
    );
    assert!(matches!(
        fixture.service.domains_of(owner).await,
        Ok(domains) if domains == BTreeSet::from([domain_id])
    ));
    assert!(matches!(
        fixture
            .service
            .initialize_domain(DomainId::new(), UserId::new())
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn purge_domain_removes_everything() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let owner = fixture.directory.add_user("Alice", "alice@x.com").await;
    assert!(matches!(
        fixture.service.initialize_domain(domain_id, owner).await,
        Ok(true)
    ));

    assert!(matches!(fixture.service.purge_domain(domain_id).await, Ok(true)));
    assert!(owners(&fixture, domain_id).await.is_empty());
    assert!(
        fixture
            .service
            .policies_for_role(Role::Owner, domain_id)
            .await
            .is_empty()
    );
    assert!(matches!(fixture.service.purge_domain(domain_id).await, Ok(false)));
}

#[tokio::test]
async fn rerunning_interrupted_purge_finishes_it() {
    let fixture = fixture().await;
    let domain_id = DomainId::new();
    let owner = fixture.directory.add_user("Alice", "alice@x.com").await;
    let invitee = fixture.directory.add_user("Bob", "bob@x.com").await;
    assert!(matches!(
        fixture.service.initialize_domain(domain_id, owner).await,
        Ok(true)
    ));
    let issued_at = Utc::now();
    fixture
        .store
        .insert_invite(InviteRecord {
            token_hash: "pending".to_owned(),
            inviter_user_id: owner,
            invited_user_id: invitee,
            domain_id,
            issued_at,
            expires_at: issued_at + Duration::days(7),
        })
        .await;

    fixture.store.set_failing_invite_deletes(true);
    assert!(matches!(
        fixture.service.purge_domain(domain_id).await,
        Err(AppError::Internal(_))
    ));
    assert!(owners(&fixture, domain_id).await.is_empty());
    assert_eq!(fixture.store.invite_count().await, 1);

    fixture.store.set_failing_invite_deletes(false);
    assert!(matches!(fixture.service.purge_domain(domain_id).await, Ok(true)));
    assert_eq!(fixture.store.invite_count().await, 0);
    assert!(
        fixture
            .service
            .policies_for_role(Role::Owner, domain_id)
            .await
            .is_empty()
    );
}

#[derive(Debug, Clone)]
enum MembershipOp {
    Add(usize, Role),
    Edit(usize, Role),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = MembershipOp> {
    let role = prop_oneof![Just(Role::Owner), Just(Role::Moderator)];
    prop_oneof![
        (0_usize..3, role.clone()).prop_map(|(user, role)| MembershipOp::Add(user, role)),
        (0_usize..3, role).prop_map(|(user, role)| MembershipOp::Edit(user, role)),
        (0_usize..3).prop_map(MembershipOp::Remove),
    ]
}

proptest! {
    #[test]
    fn membership_sequences_keep_invariants(
        ops in proptest::collection::vec(op_strategy(), 1..24),
    ) {
        let runtime = match tokio::runtime::Builder::new_current_thread().build() {
            Ok(runtime) => runtime,
            Err(error) => panic!("failed to build test runtime: {error}"),
        };

        let violations = runtime.block_on(async {
            let fixture = fixture().await;
            let domain_id = DomainId::new();
            let mut users = Vec::new();
            for index in 0..3 {
                users.push(
                    fixture
                        .directory
                        .add_user(&format!("User {index}"), &format!("user{index}@x.com"))
                        .await,
                );
            }

            let mut violations = Vec::new();
            for op in ops {
                let had_owner = !owners(&fixture, domain_id).await.is_empty();
                let result = match op.clone() {
                    MembershipOp::Add(user, role) => {
                        fixture.service.add_role_for_user(users[user], role, domain_id).await
                    }
                    MembershipOp::Edit(user, role) => {
                        fixture
                            .service
                            .edit_role(users[user], domain_id, role.as_str())
                            .await
                    }
                    MembershipOp::Remove(user) => {
                        fixture.service.remove_member(users[user], domain_id).await
                    }
                };
                if result.is_err() {
                    violations.push(format!("{op:?} failed"));
                }

                if had_owner && owners(&fixture, domain_id).await.is_empty() {
                    violations.push(format!("{op:?} left the domain without owners"));
                }
                for user in &users {
                    let roles = fixture.service.roles_of(*user, domain_id).await.unwrap_or_default();
                    if roles.len() > 1 {
                        violations.push(format!("{op:?} left {user} with {} roles", roles.len()));
                    }
                }
            }

            violations
        });

        prop_assert!(violations.is_empty(), "{violations:?}");
    }
}
