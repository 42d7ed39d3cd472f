use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::{DefaultPolicyEvaluator, PolicyEvaluator};
use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::repository::{SqliteUserRepository, UserRepository};
use crate::routes::{admin_users, auth, health, registry};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub jwt: Arc<JwtConfig>,
    pub evaluator: Arc<dyn PolicyEvaluator>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtConfig) -> Self {
        Self {
            users,
            jwt: Arc::new(jwt),
            evaluator: Arc::new(DefaultPolicyEvaluator::new()),
        }
    }
}

/// Router backed by the SQLite repository, configured from the environment.
pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let users: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool));
    Ok(create_router(AppState::new(users, jwt_config)))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/me/permissions", get(auth::my_permissions))
        .route("/me/navigation", get(auth::my_navigation))
        .route("/logout", post(auth::logout));

    let admin_user_routes = Router::new()
        .route("/", get(admin_users::list_admin_users).post(admin_users::create_admin_user))
        .route(
            "/:id",
            get(admin_users::get_admin_user)
                .put(admin_users::update_admin_user)
                .delete(admin_users::delete_admin_user),
        )
        .route("/:id/permissions", axum::routing::put(admin_users::update_admin_user_permissions))
        .route("/:id/permissions/toggle", post(admin_users::toggle_admin_user_permission));

    Router::new()
        .route("/api/health", get(health::health))
        .route("/permissions/registry", get(registry::permission_registry))
        .nest("/auth", auth_routes)
        .nest("/admin-users", admin_user_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
