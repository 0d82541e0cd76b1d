/// Session token issuance and validation
///
/// Session tokens are stateless HS256 JWTs; nothing about them is persisted.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::auth::claims::{Claims, TOKEN_ISSUER};
use crate::error::AuthError;

/// Longest session a client may ask for at login
pub const MAX_SESSION_TTL_SECONDS: i64 = 3600;

const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Clamp a client-requested session lifetime into `(0, max]`.
///
/// Missing, non-positive or too large requests all fall back to `max`.
pub fn session_ttl(requested_seconds: Option<i64>, max_seconds: i64) -> Duration {
    match requested_seconds {
        Some(seconds) if seconds > 0 && seconds <= max_seconds => Duration::seconds(seconds),
        _ => Duration::seconds(max_seconds),
    }
}

/// Mint a session token for `user_id`, valid for `ttl` from now
///
/// # Errors
/// Returns `AuthError::TokenSigning` if encoding fails
pub fn issue_session_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    encode_claims(&Claims::new(user_id, Utc::now(), ttl), secret)
}

pub(crate) fn encode_claims(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenSigning(e.to_string()))
}

/// Validate a session token and return its subject
///
/// Any HMAC algorithm is accepted; tokens signed with anything else are
/// rejected before the signature is checked. User existence is not checked.
///
/// # Errors
/// - `AuthError::Signature` for a non-HMAC algorithm
/// - `AuthError::Expired` once `exp` has passed
/// - `AuthError::Malformed` for unparsable tokens or a non-UUID subject
/// - `AuthError::InvalidToken` for every other rejection
pub fn validate_session_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    ensure_hmac_algorithm(token)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = HMAC_ALGORITHMS.to_vec();
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("JWT validation error: {}", e);
            classify(e.kind())
        })?;

    claims.user_id()
}

/// Checks the header's `alg` before any claim is looked at.
fn ensure_hmac_algorithm(token: &str) -> Result<(), AuthError> {
    match decode_header(token) {
        Ok(header) if HMAC_ALGORITHMS.contains(&header.alg) => Ok(()),
        Ok(header) => {
            tracing::debug!("Rejected token signed with {:?}", header.alg);
            Err(AuthError::Signature)
        }
        // the header decoded but did not fit `Header`: `alg` is missing or
        // names something jsonwebtoken has no variant for, such as `none`
        Err(e) if matches!(e.kind(), ErrorKind::Json(_)) => {
            tracing::debug!("Rejected token header: {}", e);
            Err(AuthError::Signature)
        }
        Err(e) => Err(classify(e.kind())),
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => AuthError::Signature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidToken => AuthError::Malformed("not a JWT".to_string()),
        ErrorKind::Base64(e) => AuthError::Malformed(e.to_string()),
        ErrorKind::Json(e) => AuthError::Malformed(e.to_string()),
        ErrorKind::Utf8(e) => AuthError::Malformed(e.to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::Malformed(format!("missing claim `{}`", claim))
        }
        _ => AuthError::InvalidToken,
    }
}
