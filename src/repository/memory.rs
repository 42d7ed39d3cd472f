//! In-memory user repository.
//!
//! Not durable: all accounts are lost when the process exits. Writes take
//! the lock for the whole operation, so each call is atomic within one
//! process.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserRepository;
use crate::errors::{AppError, AppResult};
use crate::models::user::AdminUser;

#[derive(Debug, Clone)]
struct StoredUser {
    user: AdminUser,
    password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<StoredUser>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn load(&self) -> AppResult<Vec<AdminUser>> {
        let users = self.users.read().await;
        let mut loaded: Vec<AdminUser> = users.iter().map(|stored| stored.user.clone()).collect();
        loaded.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(loaded)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<AdminUser>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|s| s.user.id == id).map(|s| s.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminUser>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|s| s.user.email == email).map(|s| s.user.clone()))
    }

    async fn credentials(&self, email: &str) -> AppResult<Option<(AdminUser, String)>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|s| s.user.email == email)
            .map(|s| (s.user.clone(), s.password_hash.clone())))
    }

    async fn insert(&self, user: &AdminUser, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|s| s.user.email == user.email) {
            return Err(AppError::conflict("email already in use"));
        }
        if users.iter().any(|s| s.user.id == user.id) {
            return Err(AppError::conflict("admin user already exists"));
        }

        users.push(StoredUser {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        Ok(())
    }

    async fn save(&self, user: &AdminUser) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|s| s.user.id != user.id && s.user.email == user.email) {
            return Err(AppError::conflict("email already in use"));
        }

        let stored = users
            .iter_mut()
            .find(|s| s.user.id == user.id)
            .ok_or_else(|| AppError::not_found("admin user not found"))?;
        stored.user = user.clone();
        Ok(())
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|s| s.user.id == id)
            .ok_or_else(|| AppError::not_found("admin user not found"))?;
        stored.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|s| s.user.id != id);
        if users.len() == before {
            return Err(AppError::not_found("admin user not found"));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
