//! Account credentials: the password policy and Argon2id hashes.
//!
//! Stored hashes are PHC strings, so parameters and salt live inside them and
//! older hashes keep verifying after the defaults change.

use std::sync::LazyLock;

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;

use crate::error::CoreError;

/// Shortest password accepted at registration, reset, or change.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash checked when a login names no account, so that path costs one
/// Argon2 verification like a wrong password does.
static UNKNOWN_ACCOUNT_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("a4l-no-such-account").ok());

/// Reject passwords the account forms would refuse.
///
/// Length is counted in characters. A password made only of whitespace is
/// refused whatever its length.
pub fn check_password_policy(password: &str) -> Result<(), CoreError> {
    if password.trim().is_empty() {
        return Err(CoreError::Validation("password is required".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

fn new_salt() -> Result<SaltString, password_hash::Error> {
    let mut bytes = [0u8; password_hash::Salt::RECOMMENDED_LENGTH];
    rand::rng().fill(&mut bytes[..]);
    SaltString::encode_b64(&bytes)
}

/// Argon2id hash of `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    new_salt()
        .and_then(|salt| {
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
}

/// Check `password` against a stored hash.
///
/// A mismatch is `Ok(false)`. Only an unreadable stored hash is an error.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, CoreError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| CoreError::Internal(format!("stored password hash is invalid: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Internal(format!("password verification failed: {e}"))),
    }
}

/// Spend one verification on a throwaway hash. Always `false`.
pub fn verify_unknown_account(password: &str) -> bool {
    if let Some(hash) = UNKNOWN_ACCOUNT_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
