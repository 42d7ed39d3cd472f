//! Authorization module - access control model for the back office
//!
//! This module implements:
//! - the permission registry (modules, actions, roles, default grants)
//! - the policy evaluator with super admin bypass
//! - the permission store mutator that keeps stored maps valid
//!
//! Everything here is synchronous and storage agnostic; persistence goes
//! through [`crate::repository::UserRepository`].

mod evaluator;
mod mutator;
mod permission_map;
mod principal;
mod registry;

pub use evaluator::{DefaultPolicyEvaluator, PolicyEvaluator};
pub use mutator::{
    ensure_deletable, ensure_super_admin_retained, toggle_permission, update_permissions,
    PermissionError,
};
pub use permission_map::{ActionSet, PermissionMap};
pub use principal::Principal;
pub use registry::{default_permissions, Action, Module, Role, UnknownName};
