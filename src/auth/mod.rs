/// Authentication module
///
/// Password hashing, session token issuance/validation, bearer header parsing
/// and the refresh token lifecycle.

mod bearer;
mod claims;
mod extractor;
mod jwt;
mod password;
mod refresh_token;

pub use bearer::extract_bearer_token;
pub use claims::{Claims, TOKEN_ISSUER};
pub use extractor::AuthenticatedUser;
pub use jwt::{issue_session_token, session_ttl, validate_session_token, MAX_SESSION_TTL_SECONDS};
pub use password::{hash_password, verify_dummy_password, verify_password};
pub use refresh_token::{
    exchange_refresh_token, generate_refresh_token, issue_refresh_token, revoke_all_user_tokens,
    revoke_refresh_token,
};
