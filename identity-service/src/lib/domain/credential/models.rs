use std::fmt;

use auth::AuthenticatorError;
pub use auth::Role;
use chrono::DateTime;
use chrono::Utc;

use crate::credential::errors::AuthError;
use crate::credential::errors::UsernameError;

/// Stored login credential of a user.
///
/// `password_hash` is an opaque hash string and is never shown in `Debug` output.
#[derive(Clone)]
pub struct Credential {
    pub id: UserId,
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
    pub full_name: String,
    pub first_login_pending: bool,
    /// Time of the last write; `CredentialStore::save` treats it as the row version
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("full_name", &self.full_name)
            .field("first_login_pending", &self.first_login_pending)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Credential to insert; the store assigns the id and marks the first login as pending.
#[derive(Clone)]
pub struct NewCredential {
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
    pub full_name: String,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Surrounding whitespace is trimmed; the result must be 1-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Empty` - Username is empty or whitespace only
    /// * `TooLong` - Username longer than 50 characters
    pub fn new(username: impl Into<String>) -> Result<Self, UsernameError> {
        let username = username.into().trim().to_string();
        let length = username.chars().count();

        if length == 0 {
            Err(UsernameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(username))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Password acceptance rule applied when a password is set.
///
/// Only the length is checked, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl PasswordPolicy {
    pub const DEFAULT_MIN_LENGTH: usize = 6;

    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// # Errors
    /// * `WeakPassword` - Password shorter than the minimum length
    pub fn check(&self, password: &str) -> Result<(), AuthError> {
        let actual = password.chars().count();
        if actual < self.min_length {
            return Err(AuthError::WeakPassword {
                min: self.min_length,
                actual,
            });
        }
        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_LENGTH)
    }
}

/// Command to log in with a username and plaintext password
#[derive(Debug)]
pub struct LoginCommand {
    pub username: Username,
    pub password: String,
}

/// Command to replace a provisional password on first login
#[derive(Debug)]
pub struct ChangeInitialPasswordCommand {
    pub username: Username,
    pub new_password: String,
}

/// Command to change the password of an already authenticated user
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub username: Username,
    pub old_password: String,
    pub new_password: String,
}

/// Command to create an account with a provisional password
#[derive(Debug)]
pub struct ProvisionCredentialCommand {
    pub username: Username,
    pub full_name: String,
    pub role: Role,
    pub initial_password: String,
}

/// Machine-readable result of an authentication or password operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    LoggedIn,
    PasswordChanged,
    AccountProvisioned,
    UnknownUser,
    BadPassword,
    BadOldPassword,
    WeakPassword,
    UsernameTaken,
    MissingToken,
    InvalidToken,
    TokenExpired,
    StoreUnavailable,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::LoggedIn => "LOGGED_IN",
            ReasonCode::PasswordChanged => "PASSWORD_CHANGED",
            ReasonCode::AccountProvisioned => "ACCOUNT_PROVISIONED",
            ReasonCode::UnknownUser => "UNKNOWN_USER",
            ReasonCode::BadPassword => "BAD_PASSWORD",
            ReasonCode::BadOldPassword => "BAD_OLD_PASSWORD",
            ReasonCode::WeakPassword => "WEAK_PASSWORD",
            ReasonCode::UsernameTaken => "USERNAME_TAKEN",
            ReasonCode::MissingToken => "MISSING_TOKEN",
            ReasonCode::InvalidToken => "INVALID_TOKEN",
            ReasonCode::TokenExpired => "TOKEN_EXPIRED",
            ReasonCode::StoreUnavailable => "STORE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&AuthenticatorError> for ReasonCode {
    fn from(err: &AuthenticatorError) -> Self {
        match err {
            AuthenticatorError::MissingToken => ReasonCode::MissingToken,
            AuthenticatorError::InvalidToken(_) => ReasonCode::InvalidToken,
            AuthenticatorError::TokenExpired => ReasonCode::TokenExpired,
        }
    }
}

/// Public view of a credential returned after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySummary {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub first_login_pending: bool,
}

impl From<&Credential> for IdentitySummary {
    fn from(credential: &Credential) -> Self {
        Self {
            user_id: credential.id,
            username: credential.username.as_str().to_string(),
            role: credential.role,
            full_name: credential.full_name.clone(),
            first_login_pending: credential.first_login_pending,
        }
    }
}

/// Result of an authentication or password-change attempt.
///
/// Created per call and handed to the boundary for serialization; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub succeeded: bool,
    pub reason: ReasonCode,
    pub message: String,
    pub token: Option<String>,
    pub identity: Option<IdentitySummary>,
}

impl AuthOutcome {
    pub fn success(reason: ReasonCode, message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            reason,
            message: message.into(),
            token: None,
            identity: None,
        }
    }

    pub fn logged_in(token: String, identity: IdentitySummary) -> Self {
        Self {
            token: Some(token),
            identity: Some(identity),
            ..Self::success(ReasonCode::LoggedIn, "Login successful")
        }
    }

    pub fn rejected(reason: ReasonCode, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            reason,
            message: message.into(),
            token: None,
            identity: None,
        }
    }
}
