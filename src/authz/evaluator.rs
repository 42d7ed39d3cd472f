use super::permission_map::{ActionSet, PermissionMap};
use super::principal::Principal;
use super::registry::{Action, Module};

/// Policy evaluator trait; every screen and handler asks through it.
///
/// Only [`PolicyEvaluator::is_allowed`] carries policy. The `can_*` helpers
/// and the derived views are defined on top of it and must not be
/// overridden with their own rules.
pub trait PolicyEvaluator: Send + Sync {
    /// Decide whether `principal` may perform `action` on `module`.
    /// An absent principal is never allowed.
    fn is_allowed(&self, principal: Option<&Principal>, module: Module, action: Action) -> bool;

    fn can_read(&self, principal: Option<&Principal>, module: Module) -> bool {
        self.is_allowed(principal, module, Action::Read)
    }

    fn can_write(&self, principal: Option<&Principal>, module: Module) -> bool {
        self.is_allowed(principal, module, Action::Write)
    }

    fn can_delete(&self, principal: Option<&Principal>, module: Module) -> bool {
        self.is_allowed(principal, module, Action::Delete)
    }

    /// String-keyed check for callers holding raw names. Unknown module or
    /// action names are denied.
    fn is_allowed_named(&self, principal: Option<&Principal>, module: &str, action: &str) -> bool {
        match (module.parse::<Module>(), action.parse::<Action>()) {
            (Ok(module), Ok(action)) => self.is_allowed(principal, module, action),
            _ => {
                tracing::debug!(module = %module, action = %action, "unknown permission name denied");
                false
            }
        }
    }

    /// What the principal can actually do, with role overrides applied.
    fn effective_permissions(&self, principal: Option<&Principal>) -> PermissionMap {
        Module::ALL
            .into_iter()
            .map(|module| {
                let granted = Action::ALL
                    .into_iter()
                    .filter(|action| self.is_allowed(principal, module, *action));
                (module, ActionSet::from_actions(granted))
            })
            .collect()
    }

    /// Modules shown in the console navigation, in registry order.
    fn visible_modules(&self, principal: Option<&Principal>) -> Vec<Module> {
        Module::ALL
            .into_iter()
            .filter(|module| self.can_read(principal, *module))
            .collect()
    }
}

/// Default policy evaluator
///
/// Evaluation order:
/// 1. no principal -> deny
/// 2. super_admin role -> allow, stored map ignored
/// 3. stored permission map lookup (absent module -> deny)
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicyEvaluator;

impl DefaultPolicyEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyEvaluator for DefaultPolicyEvaluator {
    fn is_allowed(&self, principal: Option<&Principal>, module: Module, action: Action) -> bool {
        let Some(principal) = principal else {
            tracing::debug!(module = %module, action = %action, "no session, permission denied");
            return false;
        };

        if principal.is_super_admin() {
            tracing::debug!(
                user_id = %principal.user_id,
                module = %module,
                action = %action,
                "super_admin bypass"
            );
            return true;
        }

        let allowed = principal.permissions.grants(module, action);
        tracing::debug!(
            user_id = %principal.user_id,
            module = %module,
            action = %action,
            allowed,
            "permission evaluated"
        );
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::registry::{default_permissions, Role};
    use uuid::Uuid;

    fn admin_with(entries: &[(Module, ActionSet)]) -> Principal {
        Principal::new(Uuid::new_v4(), Role::Admin)
            .with_permissions(entries.iter().copied().collect())
    }

    #[test]
    fn test_super_admin_bypasses_empty_map() {
        let evaluator = DefaultPolicyEvaluator::new();
        let principal = Principal::new(Uuid::new_v4(), Role::SuperAdmin);

        for module in Module::ALL {
            for action in Action::ALL {
                assert!(evaluator.is_allowed(Some(&principal), module, action));
            }
        }
    }

    #[test]
    fn test_super_admin_ignores_stale_map() {
        let evaluator = DefaultPolicyEvaluator::new();
        let principal = Principal::new(Uuid::new_v4(), Role::SuperAdmin)
            .with_permissions(default_permissions(Role::Admin));

        assert!(evaluator.can_delete(Some(&principal), Module::AdminUsers));
        assert_eq!(evaluator.effective_permissions(Some(&principal)), default_permissions(Role::SuperAdmin));
    }

    #[test]
    fn test_absent_principal_denied_everywhere() {
        let evaluator = DefaultPolicyEvaluator::new();

        for module in Module::ALL {
            for action in Action::ALL {
                assert!(!evaluator.is_allowed(None, module, action));
            }
        }
        assert!(evaluator.visible_modules(None).is_empty());
    }

    #[test]
    fn test_map_lookup_for_admin() {
        let evaluator = DefaultPolicyEvaluator::new();
        let principal = admin_with(&[(Module::Products, ActionSet::READ_WRITE)]);

        assert!(evaluator.can_read(Some(&principal), Module::Products));
        assert!(evaluator.can_write(Some(&principal), Module::Products));
        assert!(!evaluator.can_delete(Some(&principal), Module::Products));
        assert!(!evaluator.can_read(Some(&principal), Module::Categories));
    }

    #[test]
    fn test_unknown_names_fail_closed() {
        let evaluator = DefaultPolicyEvaluator::new();
        let principal = Principal::new(Uuid::new_v4(), Role::SuperAdmin);

        assert!(evaluator.is_allowed_named(Some(&principal), "products", "write"));
        assert!(!evaluator.is_allowed_named(Some(&principal), "warehouses", "read"));
        assert!(!evaluator.is_allowed_named(Some(&principal), "products", "publish"));
        assert!(!evaluator.is_allowed_named(None, "products", "read"));
    }

    #[test]
    fn test_visible_modules_follow_read_grants() {
        let evaluator = DefaultPolicyEvaluator::new();
        let principal = admin_with(&[
            (Module::AdminUsers, ActionSet::READ),
            (Module::Dashboard, ActionSet::READ),
            (Module::Deals, ActionSet::EMPTY),
        ]);

        assert_eq!(
            evaluator.visible_modules(Some(&principal)),
            vec![Module::Dashboard, Module::AdminUsers]
        );
    }
}
