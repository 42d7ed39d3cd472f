use uuid::Uuid;

use super::permission_map::PermissionMap;
use super::registry::Role;
use crate::models::user::AdminUser;

/// Principal represents the authenticated admin as seen by the evaluator:
/// identity, role and the permission map stored on the account.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
    pub permissions: PermissionMap,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self {
            user_id,
            role,
            permissions: PermissionMap::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: PermissionMap) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }
}

impl From<&AdminUser> for Principal {
    fn from(user: &AdminUser) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            permissions: user.permissions.clone(),
        }
    }
}
