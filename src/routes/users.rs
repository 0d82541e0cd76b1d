/// Account Routes
///
/// Registration and credential changes.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, revoke_all_user_tokens, AuthenticatedUser};
use crate::error::AppError;
use crate::models::User;
use crate::store::{RefreshTokenStore, UserStore};
use crate::validators::{is_valid_email, is_valid_password};

/// Credentials for registration and updates
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
        }
    }
}

/// Checks and hashes credentials, returning the normalized email and the hash.
fn prepare_credentials(form: &CredentialsRequest) -> Result<(String, String), AppError> {
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let hashed_password = hash_password(&form.password)?;
    Ok((email, hashed_password))
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let (email, hashed_password) = prepare_credentials(&form)?;
    let user = users.create_user(&email, &hashed_password).await?;

    tracing::info!(user_id = %user.id, "User registered successfully");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// PUT /api/users
///
/// Replaces email and password of the authenticated user. Outstanding refresh
/// tokens are revoked; live session tokens run out on their own.
///
/// # Errors
/// - 400: invalid email or password
/// - 401: missing or invalid session token
/// - 404: the token's user no longer exists
/// - 409: email taken by another user
pub async fn update_user(
    user: AuthenticatedUser,
    form: web::Json<CredentialsRequest>,
    users: web::Data<dyn UserStore>,
    refresh_tokens: web::Data<dyn RefreshTokenStore>,
) -> Result<HttpResponse, AppError> {
    let (email, hashed_password) = prepare_credentials(&form)?;
    let updated = users
        .update_user(user.user_id, &email, &hashed_password)
        .await?;

    revoke_all_user_tokens(refresh_tokens.get_ref(), updated.id).await?;

    tracing::info!(user_id = %updated.id, "User credentials updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
