use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{default_permissions, Action, ActionSet, Module, PermissionMap, Role};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, UserStatus::Active)
    }
}

/// An admin account of the back office console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    #[schema(value_type = Object, example = json!({"products": ["read", "write"], "deals": []}))]
    pub permissions: PermissionMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    /// New account carrying the role's default grants.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role,
            status: UserStatus::Active,
            permissions: default_permissions(role),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active_super_admin(&self) -> bool {
        self.role.is_super_admin() && self.status.is_active()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAdminUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub permissions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAdminUser> for AdminUser {
    type Error = AppError;

    fn try_from(value: DbAdminUser) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|err| AppError::internal(format!("invalid admin user id {}: {err}", value.id)))?;
        let role: Role = value
            .role
            .parse()
            .map_err(|err| AppError::internal(format!("admin user {id}: {err}")))?;
        let status = match value.status.as_str() {
            "active" => UserStatus::Active,
            "inactive" => UserStatus::Inactive,
            other => return Err(AppError::internal(format!("admin user {id}: unknown status {other}"))),
        };

        // Records written before permissions existed get the role defaults.
        let permissions = match value.permissions.as_deref().map(str::trim) {
            None | Some("") | Some("null") => default_permissions(role),
            Some(raw) => decode_permissions(id, raw)?,
        };

        Ok(AdminUser {
            id,
            name: value.name,
            email: value.email,
            role,
            status,
            permissions,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

// Keys are decoded as strings first so a failing path names the module.
fn decode_permissions(id: Uuid, raw: &str) -> Result<PermissionMap, AppError> {
    let mut de = serde_json::Deserializer::from_str(raw);
    let entries: BTreeMap<String, ActionSet> = serde_path_to_error::deserialize(&mut de)
        .map_err(|err| {
            AppError::internal(format!(
                "admin user {id}: invalid permissions at {}: {}",
                err.path(),
                err.inner()
            ))
        })?;

    entries
        .into_iter()
        .map(|(key, actions)| {
            let module: Module = key.parse().map_err(|err| {
                AppError::internal(format!("admin user {id}: invalid permissions at {key}: {err}"))
            })?;
            Ok((module, actions))
        })
        .collect()
}

/// Requested grants as submitted by the permission editor, before
/// normalisation. Modules left out are revoked.
pub type RequestedPermissions = BTreeMap<Module, Vec<Action>>;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminUserCreateRequest {
    #[schema(example = "Grace Hopper")]
    pub name: String,
    #[schema(example = "grace@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ss")]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_status")]
    pub status: UserStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdminUserUpdateRequest {
    #[schema(example = "Grace Hopper")]
    pub name: Option<String>,
    #[schema(example = "grace@example.com")]
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    /// Leave empty to keep the current password.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PermissionsUpdateRequest {
    #[schema(value_type = Object, example = json!({"products": ["read", "write"], "categories": ["read"]}))]
    pub permissions: RequestedPermissions,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PermissionToggleRequest {
    pub module: Module,
    pub action: Action,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@example.com")]
    pub email: String,
    #[schema(example = "admin123")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: AdminUser,
}

fn default_role() -> Role {
    Role::Admin
}

fn default_status() -> UserStatus {
    UserStatus::Active
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_row(permissions: Option<&str>) -> DbAdminUser {
        let now = Utc::now();
        DbAdminUser {
            id: Uuid::new_v4().to_string(),
            name: "Legacy".to_string(),
            email: "legacy@example.com".to_string(),
            role: "admin".to_string(),
            status: "active".to_string(),
            permissions: permissions.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn missing_permissions_backfill_role_defaults() -> anyhow::Result<()> {
        let user = AdminUser::try_from(db_row(None))?;
        assert_eq!(user.permissions, default_permissions(Role::Admin));

        let user = AdminUser::try_from(db_row(Some("")))?;
        assert_eq!(user.permissions, default_permissions(Role::Admin));
        Ok(())
    }

    #[test]
    fn stored_permissions_are_normalised_on_load() -> anyhow::Result<()> {
        let user = AdminUser::try_from(db_row(Some(r#"{"offers":["write"]}"#)))?;
        assert_eq!(user.permissions.get(Module::Offers), ActionSet::READ_WRITE);
        assert!(user.permissions.get(Module::Deals).is_empty());
        Ok(())
    }

    #[test]
    fn corrupt_permissions_report_the_path() {
        let err = AdminUser::try_from(db_row(Some(r#"{"offers":["approve"]}"#)))
            .expect_err("unknown action must not load");
        assert!(err.to_string().contains("offers"), "{err}");

        let err = AdminUser::try_from(db_row(Some(r#"{"warehouse":["read"]}"#)))
            .expect_err("unknown module must not load");
        assert!(err.to_string().contains("warehouse"), "{err}");
    }

    #[test]
    fn password_never_serialised() -> anyhow::Result<()> {
        let user = AdminUser::new("Ada", "ada@example.com", Role::Admin);
        let value = serde_json::to_value(&user)?;
        assert!(value.get("password").is_none());
        assert_eq!(value["role"], "admin");
        assert_eq!(value["status"], "active");
        Ok(())
    }
}
