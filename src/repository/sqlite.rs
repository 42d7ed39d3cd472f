use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use super::UserRepository;
use crate::errors::{AppError, AppResult};
use crate::models::user::{AdminUser, DbAdminUser};

const USER_COLUMNS: &str =
    "id, name, email, role, status, permissions, created_at, updated_at";

#[derive(Debug, FromRow)]
struct DbCredentials {
    #[sqlx(flatten)]
    user: DbAdminUser,
    password_hash: String,
}

/// Admin accounts in the `admin_users` table. Permission maps are stored as
/// JSON text.
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn permissions_json(user: &AdminUser) -> AppResult<String> {
    serde_json::to_string(&user.permissions)
        .map_err(|err| AppError::internal(format!("failed to encode permissions: {err}")))
}

fn map_write_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::conflict("email already in use")
        }
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn load(&self) -> AppResult<Vec<AdminUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users ORDER BY created_at, id");
        let rows = sqlx::query_as::<_, DbAdminUser>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AdminUser::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<AdminUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE id = ?");
        let row = sqlx::query_as::<_, DbAdminUser>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AdminUser::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminUser>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE email = ?");
        let row = sqlx::query_as::<_, DbAdminUser>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AdminUser::try_from).transpose()
    }

    async fn credentials(&self, email: &str) -> AppResult<Option<(AdminUser, String)>> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM admin_users WHERE email = ?");
        let row = sqlx::query_as::<_, DbCredentials>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some((AdminUser::try_from(row.user)?, row.password_hash))),
            None => Ok(None),
        }
    }

    async fn insert(&self, user: &AdminUser, password_hash: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO admin_users (id, name, email, password_hash, role, status, permissions, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(permissions_json(user)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn save(&self, user: &AdminUser) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE admin_users SET name = ?, email = ?, role = ?, status = ?, permissions = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(permissions_json(user)?)
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("admin user not found"));
        }

        Ok(())
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE admin_users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("admin user not found"));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM admin_users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("admin user not found"));
        }

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
