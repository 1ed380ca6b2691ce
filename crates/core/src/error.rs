use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Already taken: {0}")]
    DuplicateName(String),

    #[error("Entity not found: {entity} {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("System role '{0}' cannot be modified or deleted")]
    SystemRoleImmutable(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account has not been verified")]
    UnverifiedAccount,

    #[error("Forbidden: {0}")]
    Authorization(String),

    #[error("Confirmation token not found")]
    TokenNotFound,

    #[error("Confirmation token has expired")]
    TokenExpired,

    #[error("Invalid request state: {0}")]
    InvalidRequestState(String),

    #[error("Maximum verification attempts reached ({0}). Request a new code.")]
    AttemptsExceeded(i32),

    #[error("Invalid verification code, {remaining} attempt(s) left")]
    InvalidCode { remaining: i32 },

    #[error("Verification code expired. Request a new code.")]
    CodeExpired,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Notification could not be delivered: {0}")]
    Notification(String),

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable key.
    pub fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => CoreError::DuplicateName(what),
            StoreError::MissingReference(what) => {
                CoreError::Validation(format!("referenced {what} does not exist"))
            }
            StoreError::Backend(msg) => CoreError::Store(msg),
        }
    }
}
