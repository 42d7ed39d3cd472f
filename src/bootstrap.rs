use anyhow::Context;

use crate::authz::Role;
use crate::errors::AppResult;
use crate::models::user::AdminUser;
use crate::repository::UserRepository;
use crate::utils::{hash_password, normalize_email, require_name};

/// Create a super admin account with the given credentials.
pub async fn create_super_admin(
    users: &dyn UserRepository,
    name: &str,
    email: &str,
    password: &str,
) -> AppResult<AdminUser> {
    let user = AdminUser::new(require_name(name)?, normalize_email(email)?, Role::SuperAdmin);
    let password_hash = hash_password(password)?;
    users.insert(&user, &password_hash).await?;

    tracing::info!(user_id = %user.id, email = %user.email, "super admin created");
    Ok(user)
}

/// Seed the first super admin from `BOOTSTRAP_ADMIN_*` when the repository
/// holds no accounts yet. Returns the created account, if any.
pub async fn seed_from_env(users: &dyn UserRepository) -> anyhow::Result<Option<AdminUser>> {
    if !users.load().await?.is_empty() {
        return Ok(None);
    }

    let Ok(password) = std::env::var("BOOTSTRAP_ADMIN_PASSWORD") else {
        tracing::warn!(
            "no admin accounts exist and BOOTSTRAP_ADMIN_PASSWORD is not set; \
             create one with `back-office-cli create-super-admin`"
        );
        return Ok(None);
    };
    let name = std::env::var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Super Admin".to_string());
    let email = std::env::var("BOOTSTRAP_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());

    let user = create_super_admin(users, &name, &email, &password)
        .await
        .context("failed to seed bootstrap super admin")?;
    Ok(Some(user))
}
