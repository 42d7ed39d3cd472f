//! Admin user management routes
//!
//! Accounts are listed, created, edited and deleted here, and their
//! permission maps are edited through the permission store mutator. Every
//! handler is gated on the `admin_users` module.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{self, Action, Module, Role};
use crate::errors::{AppError, AppResult};
use crate::jwt::AuthUser;
use crate::models::user::{
    AdminUser, AdminUserCreateRequest, AdminUserUpdateRequest, PermissionToggleRequest,
    PermissionsUpdateRequest,
};
use crate::utils::{hash_password, normalize_email, require_name};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AdminUserQuery {
    /// Case-insensitive match on name, email or role.
    pub q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/admin-users",
    tag = "Admin Users",
    params(AdminUserQuery),
    responses(
        (status = 200, description = "Admin accounts", body = Vec<AdminUser>),
        (status = 403, description = "admin_users read not granted")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_admin_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AdminUserQuery>,
) -> AppResult<Json<Vec<AdminUser>>> {
    auth.require(state.evaluator.as_ref(), Module::AdminUsers, Action::Read)?;

    let users = state.users.load().await?;
    let needle = query.q.as_deref().map(str::trim).unwrap_or_default().to_lowercase();
    if needle.is_empty() {
        return Ok(Json(users));
    }

    let filtered = users
        .into_iter()
        .filter(|user| {
            user.name.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
                || user.role.as_str().contains(&needle)
        })
        .collect();

    Ok(Json(filtered))
}

#[utoipa::path(
    post,
    path = "/admin-users",
    tag = "Admin Users",
    request_body = AdminUserCreateRequest,
    responses(
        (status = 201, description = "Admin created with role defaults", body = AdminUser),
        (status = 403, description = "admin_users write not granted"),
        (status = 409, description = "Email already exists")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_admin_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AdminUserCreateRequest>,
) -> AppResult<(StatusCode, Json<AdminUser>)> {
    auth.require(state.evaluator.as_ref(), Module::AdminUsers, Action::Write)?;
    ensure_may_assign_role(&auth, payload.role)?;

    let name = require_name(&payload.name)?;
    let email = normalize_email(&payload.email)?;
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::conflict("email already exists"));
    }
    let password_hash = hash_password(&payload.password)?;

    let user = AdminUser::new(name, email, payload.role).with_status(payload.status);
    state.users.insert(&user, &password_hash).await?;

    tracing::info!(
        actor_id = %auth.user_id(),
        user_id = %user.id,
        role = %user.role,
        "admin user created"
    );

    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/admin-users/{id}",
    tag = "Admin Users",
    params(("id" = Uuid, Path, description = "Admin user ID")),
    responses(
        (status = 200, description = "Admin account", body = AdminUser),
        (status = 404, description = "Admin user not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_admin_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AdminUser>> {
    auth.require(state.evaluator.as_ref(), Module::AdminUsers, Action::Read)?;
    Ok(Json(fetch_admin_user(&state, id).await?))
}

#[utoipa::path(
    put,
    path = "/admin-users/{id}",
    tag = "Admin Users",
    params(("id" = Uuid, Path, description = "Admin user ID")),
    request_body = AdminUserUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = AdminUser),
        (status = 404, description = "Admin user not found"),
        (status = 409, description = "Email taken, or last super admin would be lost")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_admin_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUserUpdateRequest>,
) -> AppResult<Json<AdminUser>> {
    auth.require(state.evaluator.as_ref(), Module::AdminUsers, Action::Write)?;

    let users = state.users.load().await?;
    let mut user = users
        .iter()
        .find(|user| user.id == id)
        .cloned()
        .ok_or_else(|| AppError::not_found("admin user not found"))?;

    if user.role.is_super_admin() {
        ensure_may_assign_role(&auth, user.role)?;
    }

    let new_role = payload.role.unwrap_or(user.role);
    let new_status = payload.status.unwrap_or(user.status);
    ensure_may_assign_role(&auth, new_role)?;
    authz::ensure_super_admin_retained(&users, id, new_role, new_status)?;

    if let Some(name) = payload.name.as_deref() {
        user.name = require_name(name)?;
    }
    if let Some(email) = payload.email.as_deref() {
        let email = normalize_email(email)?;
        let taken = users.iter().any(|other| other.id != id && other.email == email);
        if taken {
            return Err(AppError::conflict("email already exists"));
        }
        user.email = email;
    }
    // Permissions otherwise only change through the editor. A demoted super
    // admin would keep full grants, so it falls back to the admin defaults.
    if user.role.is_super_admin() && !new_role.is_super_admin() {
        user.permissions = authz::default_permissions(new_role);
    }
    user.role = new_role;
    user.status = new_status;
    user.updated_at = Utc::now();

    let new_password = payload.password.as_deref().filter(|password| !password.is_empty());
    let password_hash = new_password.map(hash_password).transpose()?;

    state.users.save(&user).await?;
    if let Some(password_hash) = password_hash {
        state.users.set_password(id, &password_hash).await?;
    }

    tracing::info!(actor_id = %auth.user_id(), user_id = %id, "admin user updated");
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/admin-users/{id}",
    tag = "Admin Users",
    params(("id" = Uuid, Path, description = "Admin user ID")),
    responses(
        (status = 204, description = "Admin user deleted"),
        (status = 403, description = "admin_users delete not granted, or target is a super admin"),
        (status = 404, description = "Admin user not found"),
        (status = 409, description = "Last super admin cannot be deleted")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_admin_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    auth.require(state.evaluator.as_ref(), Module::AdminUsers, Action::Delete)?;

    let users = state.users.load().await?;
    let target = users
        .iter()
        .find(|user| user.id == id)
        .ok_or_else(|| AppError::not_found("admin user not found"))?;
    ensure_may_assign_role(&auth, target.role)?;
    authz::ensure_deletable(&users, id)?;

    state.users.delete(id).await?;

    tracing::info!(actor_id = %auth.user_id(), user_id = %id, "admin user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/admin-users/{id}/permissions",
    tag = "Admin Users",
    params(("id" = Uuid, Path, description = "Admin user ID")),
    request_body = PermissionsUpdateRequest,
    responses(
        (status = 200, description = "Permissions replaced", body = AdminUser),
        (status = 403, description = "Target is a super admin, or admin_users write not granted"),
        (status = 404, description = "Admin user not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_admin_user_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PermissionsUpdateRequest>,
) -> AppResult<Json<AdminUser>> {
    auth.require(state.evaluator.as_ref(), Module::AdminUsers, Action::Write)?;

    let mut user = fetch_admin_user(&state, id).await?;
    authz::update_permissions(&mut user, &payload.permissions)?;
    state.users.save(&user).await?;

    tracing::info!(actor_id = %auth.user_id(), user_id = %id, "admin user permissions saved");
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/admin-users/{id}/permissions/toggle",
    tag = "Admin Users",
    params(("id" = Uuid, Path, description = "Admin user ID")),
    request_body = PermissionToggleRequest,
    responses(
        (status = 200, description = "Permission toggled", body = AdminUser),
        (status = 403, description = "Target is a super admin, or admin_users write not granted"),
        (status = 404, description = "Admin user not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn toggle_admin_user_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PermissionToggleRequest>,
) -> AppResult<Json<AdminUser>> {
    auth.require(state.evaluator.as_ref(), Module::AdminUsers, Action::Write)?;

    let mut user = fetch_admin_user(&state, id).await?;
    authz::toggle_permission(&mut user, payload.module, payload.action)?;
    state.users.save(&user).await?;

    tracing::info!(
        actor_id = %auth.user_id(),
        user_id = %id,
        module = %payload.module,
        action = %payload.action,
        "admin user permission toggled"
    );
    Ok(Json(user))
}

async fn fetch_admin_user(state: &AppState, id: Uuid) -> AppResult<AdminUser> {
    state
        .users
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("admin user not found"))
}

/// Only super admins may hand out, or touch accounts holding, the super admin role.
fn ensure_may_assign_role(auth: &AuthUser, role: Role) -> AppResult<()> {
    if role.is_super_admin() && !auth.principal.is_super_admin() {
        return Err(AppError::forbidden("only a super admin can manage super admin accounts"));
    }
    Ok(())
}
