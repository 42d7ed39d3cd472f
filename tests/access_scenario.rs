use std::collections::BTreeMap;

use anyhow::{Context, Result};

use back_office::authz::{
    self, Action, DefaultPolicyEvaluator, Module, PermissionError, PolicyEvaluator, Principal, Role,
};
use back_office::models::user::AdminUser;
use back_office::repository::{InMemoryUserRepository, UserRepository};

#[tokio::test]
async fn granting_write_on_products_through_the_repository() -> Result<()> {
    let repo = InMemoryUserRepository::new();
    let evaluator = DefaultPolicyEvaluator::new();

    let root = AdminUser::new("Root", "root@example.com", Role::SuperAdmin);
    let mut clerk = AdminUser::new("Clerk", "clerk@example.com", Role::Admin);
    authz::update_permissions(&mut clerk, &BTreeMap::from([(Module::Products, vec![Action::Read])]))?;

    repo.insert(&root, "hash").await?;
    repo.insert(&clerk, "hash").await?;

    let users = repo.load().await?;
    assert_eq!(users.len(), 2);
    let stored = repo.get(clerk.id).await?.context("clerk stored")?;
    let principal = Principal::from(&stored);
    assert!(evaluator.can_read(Some(&principal), Module::Products));
    assert!(!evaluator.can_write(Some(&principal), Module::Products));

    let mut editing = stored;
    authz::update_permissions(
        &mut editing,
        &BTreeMap::from([(Module::Products, vec![Action::Read, Action::Write])]),
    )?;
    repo.save(&editing).await?;

    let reloaded = repo.get(clerk.id).await?.context("clerk stored")?;
    let principal = Principal::from(&reloaded);
    assert!(evaluator.can_write(Some(&principal), Module::Products));
    assert!(!evaluator.can_delete(Some(&principal), Module::Products));
    assert!(!evaluator.can_read(Some(&principal), Module::Vendors));

    let root_principal = Principal::from(&root);
    for module in Module::ALL {
        for action in Action::ALL {
            assert!(evaluator.is_allowed(Some(&root_principal), module, action));
        }
    }

    Ok(())
}

#[tokio::test]
async fn sole_super_admin_survives_deletion_attempts() -> Result<()> {
    let repo = InMemoryUserRepository::new();
    let first = AdminUser::new("First", "first@example.com", Role::SuperAdmin);
    repo.insert(&first, "hash").await?;

    let users = repo.load().await?;
    assert_eq!(
        authz::ensure_deletable(&users, first.id),
        Err(PermissionError::LastSuperAdminDeletion)
    );

    let second = AdminUser::new("Second", "second@example.com", Role::SuperAdmin);
    repo.insert(&second, "hash").await?;

    let users = repo.load().await?;
    authz::ensure_deletable(&users, first.id)?;
    repo.delete(first.id).await?;

    let users = repo.load().await?;
    assert_eq!(
        authz::ensure_deletable(&users, second.id),
        Err(PermissionError::LastSuperAdminDeletion)
    );

    Ok(())
}

#[tokio::test]
async fn super_admin_map_is_left_untouched() -> Result<()> {
    let repo = InMemoryUserRepository::new();
    let mut root = AdminUser::new("Root", "root@example.com", Role::SuperAdmin);
    repo.insert(&root, "hash").await?;
    let before = root.permissions.clone();

    let result = authz::toggle_permission(&mut root, Module::Deals, Action::Read);
    assert_eq!(result, Err(PermissionError::ImmutableSuperAdmin));
    assert_eq!(root.permissions, before);

    let stored = repo.get(root.id).await?.context("root stored")?;
    assert_eq!(stored.permissions, before);

    Ok(())
}
