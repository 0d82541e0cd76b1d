use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenStore, UserStore};
use crate::error::{AppError, DatabaseError};
use crate::models::{Chirp, RefreshToken, SortOrder, User};

/// Process-local store. Each table sits behind its own mutex, which gives the
/// same per-row atomicity the Postgres store relies on.
#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    refresh_tokens: Mutex<HashMap<String, RefreshToken>>,
    // insertion order doubles as creation order
    chirps: Mutex<Vec<Chirp>>,
}

fn lock<T>(table: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    table
        .lock()
        .map_err(|_| AppError::Internal("in-memory store lock poisoned".to_string()))
}

fn duplicate_email() -> AppError {
    AppError::Database(DatabaseError::UniqueConstraintViolation(
        "Email already registered".to_string(),
    ))
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email) {
            return Err(duplicate_email());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = lock(&self.users)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, AppError> {
        let mut users = lock(&self.users)?;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(duplicate_email());
        }

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::Database(DatabaseError::NotFound("User not found".to_string())))?;
        user.email = email.to_string();
        user.hashed_password = hashed_password.to_string();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn insert_refresh_token(&self, record: &RefreshToken) -> Result<(), AppError> {
        let mut tokens = lock(&self.refresh_tokens)?;
        if tokens.contains_key(&record.token) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Refresh token already stored".to_string(),
            )));
        }
        tokens.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find_refresh_token(&self, digest: &str) -> Result<Option<RefreshToken>, AppError> {
        let tokens = lock(&self.refresh_tokens)?;
        Ok(tokens.get(digest).cloned())
    }

    async fn revoke_refresh_token(
        &self,
        digest: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<RefreshToken>, AppError> {
        let mut tokens = lock(&self.refresh_tokens)?;
        Ok(tokens.get_mut(digest).map(|record| {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(at);
                record.updated_at = at;
            }
            record.clone()
        }))
    }

    async fn revoke_user_refresh_tokens(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut tokens = lock(&self.refresh_tokens)?;
        let mut revoked = 0;
        for record in tokens
            .values_mut()
            .filter(|r| r.user_id == user_id && r.revoked_at.is_none())
        {
            record.revoked_at = Some(at);
            record.updated_at = at;
            revoked += 1;
        }
        Ok(revoked)
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError> {
        if !lock(&self.users)?.contains_key(&user_id) {
            // mirrors the chirps.user_id foreign key
            return Err(AppError::Database(DatabaseError::UnexpectedError(
                "chirp author does not exist".to_string(),
            )));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        lock(&self.chirps)?.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(
        &self,
        author_id: Option<Uuid>,
        order: SortOrder,
    ) -> Result<Vec<Chirp>, AppError> {
        let chirps = lock(&self.chirps)?;
        let mut listed: Vec<Chirp> = chirps
            .iter()
            .filter(|c| author_id.map_or(true, |author| c.user_id == author))
            .cloned()
            .collect();

        // stable sort keeps insertion order among equal timestamps
        listed.sort_by_key(|c| c.created_at);
        if order == SortOrder::Desc {
            listed.reverse();
        }
        Ok(listed)
    }

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>, AppError> {
        let chirps = lock(&self.chirps)?;
        Ok(chirps.iter().find(|c| c.id == id).cloned())
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, AppError> {
        let mut chirps = lock(&self.chirps)?;
        let before = chirps.len();
        chirps.retain(|c| c.id != id);
        Ok(chirps.len() != before)
    }
}
