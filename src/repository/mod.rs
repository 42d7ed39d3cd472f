//! User repository: persistence boundary for admin accounts.
//!
//! Handlers and the CLI only talk to [`UserRepository`]; the access control
//! core never touches storage. Two backends exist:
//! - [`SqliteUserRepository`] for the running service (sqlx, embedded migrations)
//! - [`InMemoryUserRepository`] for tests and throwaway local runs
//!
//! Writes are single-record and last-write-wins; no cross-record transactions
//! are provided.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::user::AdminUser;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryUserRepository;
pub use sqlite::SqliteUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All accounts ordered by creation time.
    async fn load(&self) -> AppResult<Vec<AdminUser>>;
    async fn get(&self, id: Uuid) -> AppResult<Option<AdminUser>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminUser>>;
    /// Account plus its password hash, for login.
    async fn credentials(&self, email: &str) -> AppResult<Option<(AdminUser, String)>>;
    /// Store a new account. Fails with a conflict when the email is taken.
    async fn insert(&self, user: &AdminUser, password_hash: &str) -> AppResult<()>;
    /// Overwrite an existing account (everything except the password).
    async fn save(&self, user: &AdminUser) -> AppResult<()>;
    async fn set_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    /// Liveness probe for the backing store.
    async fn ping(&self) -> AppResult<()>;
}
