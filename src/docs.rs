use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{authz, models, routes};

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::health::health,
		routes::auth::login,
		routes::auth::me,
		routes::auth::my_permissions,
		routes::auth::my_navigation,
		routes::auth::logout,
		routes::registry::permission_registry,
		routes::admin_users::list_admin_users,
		routes::admin_users::create_admin_user,
		routes::admin_users::get_admin_user,
		routes::admin_users::update_admin_user,
		routes::admin_users::delete_admin_user,
		routes::admin_users::update_admin_user_permissions,
		routes::admin_users::toggle_admin_user_permission
	),
	components(
		schemas(
			authz::Module,
			authz::Action,
			authz::Role,
			models::user::UserStatus,
			models::user::AdminUser,
			models::user::AdminUserCreateRequest,
			models::user::AdminUserUpdateRequest,
			models::user::PermissionsUpdateRequest,
			models::user::PermissionToggleRequest,
			models::user::LoginRequest,
			models::user::AuthResponse,
			models::rbac::EffectivePermissions,
			models::rbac::NavigationItem,
			models::rbac::RoleDefaults,
			models::rbac::PermissionRegistry,
			routes::auth::MessageResponse,
			routes::health::HealthResponse
		)
	),
	tags(
		(name = "Auth", description = "Login and current session"),
		(name = "Admin Users", description = "Admin account and permission management"),
		(name = "Permissions", description = "Permission registry"),
		(name = "Health", description = "Liveness")
	)
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = serde_json::to_value(ApiDoc::openapi())?;

	ensure_security_components(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(serde_json::from_value(doc)?)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> anyhow::Result<Router> {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true)
		.persist_authorization(true);

	let doc_json = Arc::new(serde_json::to_value(&doc)?);

	let json_route = {
		let doc_json = Arc::clone(&doc_json);
		get(move || {
			let doc_json = Arc::clone(&doc_json);
			async move { Json((*doc_json).clone()) }
		})
	};

	Ok(Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config)))
}

fn ensure_security_components(doc: &mut Value) {
	let Some(root) = doc.as_object_mut() else { return; };

	let components = root
		.entry("components")
		.or_insert_with(|| Value::Object(Map::new()));
	let Some(components) = components.as_object_mut() else { return; };

	let schemes = components
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()));
	let Some(schemes) = schemes.as_object_mut() else { return; };

	schemes.entry("bearerAuth").or_insert_with(|| {
		json!({
			"type": "http",
			"scheme": "bearer",
			"bearerFormat": "JWT"
		})
	});
}

fn ensure_servers(doc: &mut Value, port: u16) {
	let tls_enabled = std::env::var("TLS_CERT_PATH").is_ok() && std::env::var("TLS_KEY_PATH").is_ok();
	let scheme = if tls_enabled { "https" } else { "http" };
	let server_url = format!("{}://localhost:{}", scheme, port);

	match doc.get_mut("servers") {
		Some(Value::Array(arr)) => {
			let has = arr.iter().any(|v| v.get("url").and_then(Value::as_str) == Some(server_url.as_str()));
			if !has {
				arr.push(json!({ "url": server_url }));
			}
		}
		_ => {
			doc["servers"] = json!([{ "url": server_url }]);
		}
	}
}
