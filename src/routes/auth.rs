use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::jwt::AuthUser;
use crate::models::rbac::{EffectivePermissions, NavigationItem};
use crate::models::user::{AdminUser, AuthResponse, LoginRequest};
use crate::utils::{normalize_email, verify_password};

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    message: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is inactive")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&payload.email)?;

    let (user, password_hash) = state
        .users
        .credentials(&email)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid admin credentials"))?;

    if !verify_password(&payload.password, &password_hash)? {
        tracing::info!(email = %email, "login rejected: wrong password");
        return Err(AppError::unauthorized("invalid admin credentials"));
    }

    if !user.status.is_active() {
        tracing::info!(user_id = %user.id, "login rejected: inactive account");
        return Err(AppError::forbidden("your account is inactive, please contact a super admin"));
    }

    let token = state.jwt.encode(user.id)?;
    tracing::info!(user_id = %user.id, role = %user.role, "admin logged in");

    Ok(Json(AuthResponse { token, user }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Current admin", body = AdminUser)),
    security(("bearerAuth" = []))
)]
pub async fn me(auth: AuthUser) -> AppResult<Json<AdminUser>> {
    Ok(Json(auth.user))
}

#[utoipa::path(
    get,
    path = "/auth/me/permissions",
    tag = "Auth",
    responses((status = 200, description = "Effective permissions of the current admin", body = EffectivePermissions)),
    security(("bearerAuth" = []))
)]
pub async fn my_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<EffectivePermissions>> {
    let permissions = state.evaluator.effective_permissions(Some(&auth.principal));

    Ok(Json(EffectivePermissions {
        user_id: auth.user.id,
        role: auth.user.role,
        permissions,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me/navigation",
    tag = "Auth",
    responses((status = 200, description = "Console sections the current admin may open", body = Vec<NavigationItem>)),
    security(("bearerAuth" = []))
)]
pub async fn my_navigation(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<NavigationItem>>> {
    let items = state
        .evaluator
        .visible_modules(Some(&auth.principal))
        .into_iter()
        .map(NavigationItem::from)
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout acknowledged", body = MessageResponse)),
    security(("bearerAuth" = []))
)]
pub async fn logout(auth: AuthUser) -> AppResult<Json<MessageResponse>> {
    tracing::info!(user_id = %auth.user_id(), "admin logged out");
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}
