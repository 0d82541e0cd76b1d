/// Authenticated-user extractor
///
/// Handlers that take an `AuthenticatedUser` argument only run once the
/// request carries a valid session token.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::auth::{extract_bearer_token, validate_session_token};
use crate::configuration::AuthSettings;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let settings = req
        .app_data::<web::Data<AuthSettings>>()
        .ok_or_else(|| AppError::Internal("auth settings are not registered".to_string()))?;

    let token = extract_bearer_token(req.headers())?;
    let user_id = validate_session_token(token, &settings.secret)?;

    tracing::debug!(user_id = %user_id, "Session token validated");
    Ok(AuthenticatedUser { user_id })
}
