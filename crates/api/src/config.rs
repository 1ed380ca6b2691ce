use crate::auth::jwt::JwtConfig;
use crate::notifications::email::EmailConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public origin used in confirmation links and post-confirmation redirects.
    pub public_base_url: String,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// SMTP delivery; `None` logs notifications instead of sending them.
    pub email: Option<EmailConfig>,
    /// Superadmin account to create at startup if absent.
    pub bootstrap_superadmin: Option<SuperadminSeed>,
}

/// Credentials for the startup superadmin account.
#[derive(Clone)]
pub struct SuperadminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SuperadminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperadminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl SuperadminSeed {
    /// All three `BOOTSTRAP_SUPERADMIN_*` variables must be set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            username: std::env::var("BOOTSTRAP_SUPERADMIN_USERNAME").ok()?,
            email: std::env::var("BOOTSTRAP_SUPERADMIN_EMAIL").ok()?,
            password: std::env::var("BOOTSTRAP_SUPERADMIN_PASSWORD").ok()?,
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:3000`    |
    ///
    /// See [`JwtConfig::from_env`], [`EmailConfig::from_env`] and
    /// [`SuperadminSeed::from_env`] for the remaining variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            jwt: JwtConfig::from_env(),
            email: EmailConfig::from_env(),
            bootstrap_superadmin: SuperadminSeed::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superadmin_seed_debug_hides_password() {
        let seed = SuperadminSeed {
            username: "root".into(),
            email: "root@example.com".into(),
            password: "hunter22".into(),
        };
        let rendered = format!("{seed:?}");
        assert!(rendered.contains("root@example.com"));
        assert!(!rendered.contains("hunter22"));
    }
}
