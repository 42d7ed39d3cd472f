use chrono::Utc;
use uuid::Uuid;

use super::permission_map::{ActionSet, PermissionMap};
use super::registry::{Action, Module, Role};
use crate::models::user::{AdminUser, RequestedPermissions, UserStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    #[error("super admin permissions cannot be modified")]
    ImmutableSuperAdmin,
    #[error("cannot delete the last super admin")]
    LastSuperAdminDeletion,
    #[error("cannot demote or deactivate the last super admin")]
    LastSuperAdminDemotion,
}

/// Replace `target`'s permission map with `requested`.
///
/// Every registry module is written: modules missing from the request end up
/// with no grants. `write`/`delete` without `read` get `read` added. The
/// caller persists the updated user.
pub fn update_permissions(
    target: &mut AdminUser,
    requested: &RequestedPermissions,
) -> Result<PermissionMap, PermissionError> {
    if target.role.is_super_admin() {
        tracing::warn!(user_id = %target.id, "rejected permission edit on super admin");
        return Err(PermissionError::ImmutableSuperAdmin);
    }

    let applied: PermissionMap = Module::ALL
        .into_iter()
        .map(|module| {
            let actions = requested
                .get(&module)
                .map(|actions| ActionSet::from_actions(actions.iter().copied()))
                .unwrap_or_default();
            (module, actions)
        })
        .collect();

    target.permissions = applied.clone();
    target.updated_at = Utc::now();

    tracing::info!(user_id = %target.id, "permissions replaced");
    Ok(applied)
}

/// Flip a single checkbox of the permission editor and apply the result
/// through [`update_permissions`].
pub fn toggle_permission(
    target: &mut AdminUser,
    module: Module,
    action: Action,
) -> Result<PermissionMap, PermissionError> {
    let requested: RequestedPermissions = Module::ALL
        .into_iter()
        .map(|m| {
            let current = target.permissions.get(m);
            let next = if m == module { current.toggle(action) } else { current };
            (m, next.actions().collect())
        })
        .collect();

    update_permissions(target, &requested)
}

/// Reject deleting `target_id` when it would leave no active super admin.
pub fn ensure_deletable(users: &[AdminUser], target_id: Uuid) -> Result<(), PermissionError> {
    let Some(target) = users.iter().find(|user| user.id == target_id) else {
        return Ok(());
    };

    if target.role.is_super_admin() && !other_active_super_admin(users, target_id) {
        return Err(PermissionError::LastSuperAdminDeletion);
    }

    Ok(())
}

/// Reject a profile edit that would take away the last active super admin.
pub fn ensure_super_admin_retained(
    users: &[AdminUser],
    target_id: Uuid,
    new_role: Role,
    new_status: UserStatus,
) -> Result<(), PermissionError> {
    let Some(target) = users.iter().find(|user| user.id == target_id) else {
        return Ok(());
    };

    let loses_super_admin = target.is_active_super_admin()
        && (!new_role.is_super_admin() || !new_status.is_active());

    if loses_super_admin && !other_active_super_admin(users, target_id) {
        return Err(PermissionError::LastSuperAdminDemotion);
    }

    Ok(())
}

fn other_active_super_admin(users: &[AdminUser], excluding: Uuid) -> bool {
    users
        .iter()
        .any(|user| user.id != excluding && user.is_active_super_admin())
}
