use axum::Json;

use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::rbac::PermissionRegistry;

/// Modules, actions and role defaults the permission editor renders.
#[utoipa::path(
    get,
    path = "/permissions/registry",
    tag = "Permissions",
    responses((status = 200, description = "Permission registry", body = PermissionRegistry)),
    security(("bearerAuth" = []))
)]
pub async fn permission_registry(_auth: AuthUser) -> AppResult<Json<PermissionRegistry>> {
    Ok(Json(PermissionRegistry::current()))
}
