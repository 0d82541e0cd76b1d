/// Password Hashing and Verification
///
/// bcrypt at the library's default cost; plaintext never leaves this module.

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::AuthError;

lazy_static! {
    /// Stand-in hash checked when the account does not exist
    static ref DUMMY_HASH: Option<String> = hash("chirpy-dummy-password", DEFAULT_COST).ok();
}

/// Hash a password using bcrypt
///
/// # Errors
/// Returns `AuthError::Hashing` if bcrypt fails internally
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash(password, DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against its hash
///
/// A malformed hash is reported the same way as a wrong password.
///
/// # Errors
/// Returns `AuthError::PasswordMismatch` if the password does not match
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    match verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::PasswordMismatch),
        Err(e) => {
            tracing::warn!("Stored password hash could not be used: {}", e);
            Err(AuthError::PasswordMismatch)
        }
    }
}

/// Spend the same bcrypt work as `verify_password` without an account
///
/// Keeps a login for an unknown email as slow as one with a wrong password.
pub fn verify_dummy_password(password: &str) -> AuthError {
    if let Some(dummy) = DUMMY_HASH.as_deref() {
        let _ = verify(password, dummy);
    }
    AuthError::PasswordMismatch
}
