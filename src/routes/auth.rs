/// Authentication Routes
///
/// Login, session refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    exchange_refresh_token, extract_bearer_token, issue_refresh_token, issue_session_token,
    revoke_refresh_token, session_ttl, verify_dummy_password, verify_password,
};
use crate::configuration::AuthSettings;
use crate::error::AppError;
use crate::routes::users::UserResponse;
use crate::store::{RefreshTokenStore, UserStore};
use crate::validators::is_valid_email;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested session lifetime, clamped to the configured maximum
    pub expires_in_seconds: Option<i64>,
}

/// User plus freshly minted tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 400: malformed email
/// - 401: unknown email or wrong password, same body and same bcrypt work
pub async fn login(
    form: web::Json<LoginRequest>,
    users: web::Data<dyn UserStore>,
    refresh_tokens: web::Data<dyn RefreshTokenStore>,
    settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let user = match users.find_user_by_email(&email).await? {
        Some(user) => user,
        None => return Err(verify_dummy_password(&form.password).into()),
    };
    verify_password(&form.password, &user.hashed_password)?;

    let ttl = session_ttl(form.expires_in_seconds, settings.access_token_ttl_seconds);
    let token = issue_session_token(user.id, &settings.secret, ttl)?;
    let (refresh_token, _) =
        issue_refresh_token(refresh_tokens.get_ref(), user.id, settings.refresh_token_ttl()).await?;

    tracing::info!(user_id = %user.id, ttl_seconds = ttl.num_seconds(), "User logged in successfully");

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: user.into(),
        token,
        refresh_token,
    }))
}

/// POST /api/refresh
///
/// Expects `Authorization: Bearer <refresh token>`.
///
/// # Errors
/// - 401: missing header, unknown, revoked or expired refresh token
pub async fn refresh(
    req: HttpRequest,
    refresh_tokens: web::Data<dyn RefreshTokenStore>,
    settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let presented = extract_bearer_token(req.headers())?;
    let token = exchange_refresh_token(refresh_tokens.get_ref(), presented, &settings).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Expects `Authorization: Bearer <refresh token>`. Revoking twice is fine.
///
/// # Errors
/// - 401: missing header or unknown refresh token
pub async fn revoke(
    req: HttpRequest,
    refresh_tokens: web::Data<dyn RefreshTokenStore>,
) -> Result<HttpResponse, AppError> {
    let presented = extract_bearer_token(req.headers())?;
    revoke_refresh_token(refresh_tokens.get_ref(), presented).await?;

    Ok(HttpResponse::NoContent().finish())
}
