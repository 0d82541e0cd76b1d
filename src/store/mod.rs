/// Persistence interfaces
///
/// Handlers and the auth core only see these traits. `PgStore` backs the
/// running service, `InMemoryStore` backs the test suites.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Chirp, RefreshToken, SortOrder, User};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DatabaseError::UniqueConstraintViolation` on a taken email.
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with `DatabaseError::NotFound` if the user is gone.
    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, AppError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert_refresh_token(&self, record: &RefreshToken) -> Result<(), AppError>;

    async fn find_refresh_token(&self, digest: &str) -> Result<Option<RefreshToken>, AppError>;

    /// Marks the token revoked at `at` unless it already is, and returns the
    /// stored record. `None` if no such token exists.
    async fn revoke_refresh_token(
        &self,
        digest: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<RefreshToken>, AppError>;

    /// Revokes every unrevoked token of a user, returning how many changed.
    async fn revoke_user_refresh_tokens(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError>;

    async fn list_chirps(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<Chirp>, AppError>;

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>, AppError>;

    /// Returns `false` if there was nothing to delete.
    async fn delete_chirp(&self, id: Uuid) -> Result<bool, AppError>;
}

/// The set of stores handed to the HTTP layer
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub chirps: Arc<dyn ChirpStore>,
}

impl Stores {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            chirps: store,
        }
    }

    /// Shares an existing in-memory store, so tests can inspect it directly.
    pub fn from_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            chirps: store,
        }
    }
}
