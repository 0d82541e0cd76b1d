/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 random bytes, hex-encoded, handed to the client once
/// - stored only as a SHA-256 digest
/// - valid for a fixed lifetime unless revoked
/// - exchanged for session tokens without being rotated

use chrono::{Duration, Utc};
use rand::{thread_rng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::jwt::issue_session_token;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};
use crate::models::RefreshToken;
use crate::store::RefreshTokenStore;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new cryptographically secure refresh token (64 hex characters)
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest under which a token is stored and looked up
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Mint and persist a refresh token for `user_id`
///
/// Returns the plaintext token together with the stored record.
///
/// # Errors
/// Returns error if the store rejects the insert
pub async fn issue_refresh_token(
    store: &dyn RefreshTokenStore,
    user_id: Uuid,
    ttl: Duration,
) -> Result<(String, RefreshToken), AppError> {
    let token = generate_refresh_token();
    let now = Utc::now();
    let record = RefreshToken {
        token: hash_token(&token),
        user_id,
        created_at: now,
        updated_at: now,
        expires_at: now + ttl,
        revoked_at: None,
    };

    store.insert_refresh_token(&record).await?;
    tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token issued");

    Ok((token, record))
}

/// Exchange a refresh token for a fresh session token
///
/// The session token lives for the configured access token TTL. The refresh
/// token itself is left untouched.
///
/// # Errors
/// - `AuthError::NotFound` if the token was never issued
/// - `AuthError::Revoked` if it has been revoked
/// - `AuthError::Expired` if it is past its expiry
pub async fn exchange_refresh_token(
    store: &dyn RefreshTokenStore,
    token: &str,
    settings: &AuthSettings,
) -> Result<String, AppError> {
    let record = store
        .find_refresh_token(&hash_token(token))
        .await?
        .ok_or_else(|| {
            tracing::warn!("Refresh token not found");
            AuthError::NotFound
        })?;

    if let Err(e) = record.ensure_usable(Utc::now()) {
        tracing::warn!(user_id = %record.user_id, error = %e, "Unusable refresh token presented");
        return Err(e.into());
    }

    let session_token =
        issue_session_token(record.user_id, &settings.secret, settings.access_token_ttl())?;
    Ok(session_token)
}

/// Revoke a single refresh token
///
/// Revoking an already revoked token succeeds and keeps the original
/// revocation time.
///
/// # Errors
/// Returns `AuthError::NotFound` if no such token exists
pub async fn revoke_refresh_token(store: &dyn RefreshTokenStore, token: &str) -> Result<(), AppError> {
    let record = store
        .revoke_refresh_token(&hash_token(token), Utc::now())
        .await?
        .ok_or(AuthError::NotFound)?;

    tracing::info!(user_id = %record.user_id, "Refresh token revoked");
    Ok(())
}

/// Revoke all refresh tokens for a user
pub async fn revoke_all_user_tokens(
    store: &dyn RefreshTokenStore,
    user_id: Uuid,
) -> Result<(), AppError> {
    let revoked = store.revoke_user_refresh_tokens(user_id, Utc::now()).await?;

    tracing::info!(user_id = %user_id, revoked = revoked, "All refresh tokens revoked for user");
    Ok(())
}
