//! Session tokens.
//!
//! A session token only identifies an account. The role it records is a
//! snapshot for clients; the session extractor reloads the principal on
//! every request, so role changes and deletions apply before expiry.

use a4l_core::principal::Principal;
use a4l_core::types::DbId;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default session lifetime: one day.
const DEFAULT_SESSION_EXPIRY_MINS: i64 = 1440;

/// Claims signed into a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account id.
    pub sub: DbId,
    /// Role name when the token was issued.
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
    /// Random id, distinct for every token issued.
    pub jti: String,
}

/// Signing secret and lifetime of session tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub session_expiry_mins: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required) and `JWT_ACCESS_EXPIRY_MINS` (default
    /// 1440).
    ///
    /// # Panics
    ///
    /// When the secret is missing or empty, or the lifetime is not an integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let session_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .map(|v| v.parse().expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64"))
            .unwrap_or(DEFAULT_SESSION_EXPIRY_MINS);

        Self {
            secret,
            session_expiry_mins,
        }
    }

    /// Session lifetime in seconds.
    pub fn expires_in(&self) -> i64 {
        self.session_expiry_mins * 60
    }
}

/// Sign a session token for `principal`.
pub fn issue_session_token(
    principal: &Principal,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: principal.account_id,
        role: principal.role.clone(),
        exp: iat + config.expires_in(),
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check the signature and expiry of `token` and return its claims.
pub fn decode_session_token(
    token: &str,
    config: &JwtConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use a4l_core::capability::CapabilityFlags;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            session_expiry_mins: 60,
        }
    }

    fn principal(role: Option<&str>) -> Principal {
        Principal {
            account_id: 42,
            username: "alice".into(),
            role: role.map(str::to_string),
            capabilities: CapabilityFlags::NONE,
        }
    }

    #[test]
    fn issued_token_decodes_to_the_account() {
        let config = config("session-secret-long-enough-for-hmac");
        let token = issue_session_token(&principal(Some("admin")), &config).unwrap();

        let claims = decode_session_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn account_without_role_gets_no_role_claim() {
        let config = config("session-secret-long-enough-for-hmac");
        let token = issue_session_token(&principal(None), &config).unwrap();

        assert!(decode_session_token(&token, &config).unwrap().role.is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config("session-secret-long-enough-for-hmac");
        // Past the 60 second default leeway.
        let iat = Utc::now().timestamp() - 600;
        let claims = SessionClaims {
            sub: 1,
            role: None,
            exp: iat + 300,
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(decode_session_token(&token, &config).is_err());
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = issue_session_token(&principal(None), &config("secret-alpha")).unwrap();

        assert!(decode_session_token(&token, &config("secret-bravo")).is_err());
    }

    #[test]
    fn every_token_has_its_own_id() {
        let config = config("session-secret-long-enough-for-hmac");
        let p = principal(None);
        let a = issue_session_token(&p, &config).unwrap();
        let b = issue_session_token(&p, &config).unwrap();

        assert_ne!(
            decode_session_token(&a, &config).unwrap().jti,
            decode_session_token(&b, &config).unwrap().jti,
        );
    }
}
