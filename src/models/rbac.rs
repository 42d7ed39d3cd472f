use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{default_permissions, Action, Module, PermissionMap, Role};

// =============================================================================
// EFFECTIVE PERMISSIONS (computed)
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct EffectivePermissions {
    pub user_id: Uuid,
    pub role: Role,
    /// Role overrides applied: a super admin always sees full grants here.
    #[schema(value_type = Object)]
    pub permissions: PermissionMap,
}

// =============================================================================
// NAVIGATION
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct NavigationItem {
    pub module: Module,
    #[schema(example = "Combo Offers")]
    pub label: &'static str,
}

impl From<Module> for NavigationItem {
    fn from(module: Module) -> Self {
        Self {
            module,
            label: module.label(),
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleDefaults {
    pub role: Role,
    #[schema(value_type = Object)]
    pub default_permissions: PermissionMap,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionRegistry {
    pub modules: Vec<NavigationItem>,
    pub actions: Vec<Action>,
    pub roles: Vec<RoleDefaults>,
}

impl PermissionRegistry {
    pub fn current() -> Self {
        Self {
            modules: Module::ALL.into_iter().map(NavigationItem::from).collect(),
            actions: Action::ALL.to_vec(),
            roles: Role::ALL
                .into_iter()
                .map(|role| RoleDefaults {
                    role,
                    default_permissions: default_permissions(role),
                })
                .collect(),
        }
    }
}
