//! Confirmation tokens, verification codes, and confirmation links.
//!
//! Confirmation tokens are opaque random strings; only their SHA-256 hash is
//! stored so a database leak does not expose pending requests.

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::account::ChangeKind;

/// Length of a confirmation token (alphanumeric characters).
pub const CONFIRMATION_TOKEN_LENGTH: usize = 32;

/// Generate a random alphanumeric confirmation token.
pub fn generate_confirmation_token() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(CONFIRMATION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Compute the SHA-256 hex digest of a confirmation token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a six-digit numeric verification code (`100000..=999999`).
pub fn generate_verification_code() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

/// Build `{base_url}/account/confirm-{email|password}?token={token}`.
///
/// Tokens are alphanumeric, so no query escaping is required.
pub fn confirmation_link(base_url: &str, kind: ChangeKind, token: &str) -> String {
    format!(
        "{}/account/{}?token={token}",
        base_url.trim_end_matches('/'),
        kind.confirm_path()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_alphanumeric_and_long_enough() {
        let token = generate_confirmation_token();
        assert_eq!(token.len(), CONFIRMATION_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_differ_between_calls() {
        assert_ne!(generate_confirmation_token(), generate_confirmation_token());
    }

    #[test]
    fn token_hash_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(hash, hash_token("abc"));
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn verification_code_has_six_digits() {
        for _ in 0..50 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(!code.starts_with('0'));
        }
    }

    #[test]
    fn link_strips_trailing_slash() {
        let link = confirmation_link("https://cars.example/", ChangeKind::Password, "T0k3n");
        assert_eq!(link, "https://cars.example/account/confirm-password?token=T0k3n");
    }
}
