use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

/// Read the token out of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Anything other than a bearer
/// credential is rejected instead of being handed back verbatim.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?
        .trim();

    if value.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                Err(AuthError::MalformedHeader)
            } else {
                Ok(token)
            }
        }
        _ => Err(AuthError::MalformedHeader),
    }
}
