use auth::PasswordError;
use auth::RoleError;
use auth::TokenError;
use thiserror::Error;

use crate::credential::models::ReasonCode;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must not be empty")]
    Empty,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error for all authentication and password operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Caller-attributable rejections
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Incorrect password")]
    BadPassword,

    #[error("Current password is incorrect")]
    BadOldPassword,

    #[error("Password too short: minimum {min} characters, got {actual}")]
    WeakPassword { min: usize, actual: usize },

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    // Infrastructure errors
    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Credential of {0} was modified concurrently")]
    StaleCredential(String),

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Reason code for errors caused by the caller's input.
    ///
    /// Returns `None` for infrastructure failures, which are the system's fault and
    /// propagate instead of becoming a rejected outcome.
    pub fn rejection_reason(&self) -> Option<ReasonCode> {
        match self {
            AuthError::UnknownUser(_) => Some(ReasonCode::UnknownUser),
            AuthError::BadPassword => Some(ReasonCode::BadPassword),
            AuthError::BadOldPassword => Some(ReasonCode::BadOldPassword),
            AuthError::WeakPassword { .. } => Some(ReasonCode::WeakPassword),
            AuthError::UsernameTaken(_) => Some(ReasonCode::UsernameTaken),
            AuthError::InvalidUsername(_)
            | AuthError::InvalidRole(_)
            | AuthError::Password(_)
            | AuthError::Token(_)
            | AuthError::StaleCredential(_)
            | AuthError::StoreUnavailable(_)
            | AuthError::Unknown(_) => None,
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
