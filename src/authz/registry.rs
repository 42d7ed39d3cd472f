//! Permission registry: the closed sets of modules, actions and roles the
//! console understands, plus the role-derived default grants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::permission_map::{ActionSet, PermissionMap};

/// A protectable area of the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Dashboard,
    Products,
    Categories,
    Vendors,
    Offers,
    ComboOffers,
    Deals,
    AdminUsers,
}

impl Module {
    /// Every module, in navigation order.
    pub const ALL: [Module; 8] = [
        Module::Dashboard,
        Module::Products,
        Module::Categories,
        Module::Vendors,
        Module::Offers,
        Module::ComboOffers,
        Module::Deals,
        Module::AdminUsers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::Products => "products",
            Module::Categories => "categories",
            Module::Vendors => "vendors",
            Module::Offers => "offers",
            Module::ComboOffers => "combo_offers",
            Module::Deals => "deals",
            Module::AdminUsers => "admin_users",
        }
    }

    /// Human readable label used by the console menu.
    pub fn label(&self) -> &'static str {
        match self {
            Module::Dashboard => "Dashboard",
            Module::Products => "Products",
            Module::Categories => "Categories",
            Module::Vendors => "Vendors",
            Module::Offers => "Offers",
            Module::ComboOffers => "Combo Offers",
            Module::Deals => "Deals",
            Module::AdminUsers => "Admin Users",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|module| module.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// An operation on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Write,
    Delete,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Read, Action::Write, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Account role. `SuperAdmin` is authoritative: its stored map is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::SuperAdmin, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

/// Grants a freshly created account receives.
///
/// `SuperAdmin` gets every action on every module, `Admin` gets read-only
/// access everywhere.
pub fn default_permissions(role: Role) -> PermissionMap {
    let grant = match role {
        Role::SuperAdmin => ActionSet::FULL,
        Role::Admin => ActionSet::READ,
    };

    Module::ALL.into_iter().map(|module| (module, grant)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_defaults_are_read_only_everywhere() {
        let map = default_permissions(Role::Admin);
        for module in Module::ALL {
            let set = map.get(module);
            assert!(set.contains(Action::Read), "{module} should be readable");
            assert!(!set.contains(Action::Write), "{module} should not be writable");
            assert!(!set.contains(Action::Delete), "{module} should not be deletable");
        }
        assert_eq!(map.len(), Module::ALL.len());
    }

    #[test]
    fn super_admin_defaults_grant_everything() {
        let map = default_permissions(Role::SuperAdmin);
        for module in Module::ALL {
            assert_eq!(map.get(module), ActionSet::FULL);
        }
    }

    #[test]
    fn names_parse_back() {
        for module in Module::ALL {
            assert_eq!(module.as_str().parse::<Module>(), Ok(module));
        }
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
        assert_eq!("super_admin".parse::<Role>(), Ok(Role::SuperAdmin));
        assert!("vendor_portal".parse::<Module>().is_err());
        assert!("publish".parse::<Action>().is_err());
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn serde_names_match_as_str() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_value(Module::ComboOffers)?, "combo_offers");
        assert_eq!(serde_json::to_value(Role::SuperAdmin)?, "super_admin");
        let action: Action = serde_json::from_value(serde_json::json!("delete"))?;
        assert_eq!(action, Action::Delete);
        Ok(())
    }
}
