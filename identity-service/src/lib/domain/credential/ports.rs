use async_trait::async_trait;

use crate::credential::errors::AuthError;
use crate::credential::models::AuthOutcome;
use crate::credential::models::ChangeInitialPasswordCommand;
use crate::credential::models::ChangePasswordCommand;
use crate::credential::models::Credential;
use crate::credential::models::LoginCommand;
use crate::credential::models::NewCredential;
use crate::credential::models::ProvisionCredentialCommand;
use crate::credential::models::Username;

/// Port for authentication domain service operations.
///
/// Rejections caused by the caller come back as `Ok` outcomes with `succeeded == false`.
/// `Err` is reserved for infrastructure failures.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify a username/password pair and issue a session token.
    ///
    /// # Arguments
    /// * `command` - Username and plaintext password
    ///
    /// # Returns
    /// Outcome carrying the token and identity summary on success,
    /// or `UnknownUser` / `BadPassword`
    ///
    /// # Errors
    /// * `StoreUnavailable` - Credential store failed
    /// * `Token` - Token signing failed
    async fn login(&self, command: LoginCommand) -> Result<AuthOutcome, AuthError>;

    /// Replace a provisional password and clear the first-login flag.
    ///
    /// No token is issued; the caller logs in again with the new password.
    ///
    /// # Arguments
    /// * `command` - Username and new plaintext password
    ///
    /// # Returns
    /// Outcome `PasswordChanged`, or `WeakPassword` / `UnknownUser`
    ///
    /// # Errors
    /// * `StoreUnavailable` - Credential store failed
    /// * `StaleCredential` - A concurrent change to the same credential won
    /// * `Password` - Password hashing failed
    async fn change_initial_password(
        &self,
        command: ChangeInitialPasswordCommand,
    ) -> Result<AuthOutcome, AuthError>;

    /// Change the password of a user who already holds a valid token.
    ///
    /// Token validation is the boundary's job; this only re-verifies the old password.
    ///
    /// # Arguments
    /// * `command` - Authenticated username, old and new plaintext passwords
    ///
    /// # Returns
    /// Outcome `PasswordChanged`, or `UnknownUser` / `BadOldPassword` / `WeakPassword`
    ///
    /// # Errors
    /// * `StoreUnavailable` - Credential store failed
    /// * `StaleCredential` - A concurrent change to the same credential won
    /// * `Password` - Password hashing failed
    async fn change_password(
        &self,
        command: ChangePasswordCommand,
    ) -> Result<AuthOutcome, AuthError>;

    /// Create an account whose provisional password must be changed on first login.
    ///
    /// # Arguments
    /// * `command` - Username, display name, role and provisional password
    ///
    /// # Returns
    /// Outcome `AccountProvisioned`, or `WeakPassword` / `UsernameTaken`
    ///
    /// # Errors
    /// * `StoreUnavailable` - Credential store failed
    /// * `Password` - Password hashing failed
    async fn provision(
        &self,
        command: ProvisionCredentialCommand,
    ) -> Result<AuthOutcome, AuthError>;
}

/// Persistence operations for credentials.
///
/// Implementations own consistency: concurrent saves for the same user are
/// serialized through the `updated_at` version.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve credential by username.
    ///
    /// # Arguments
    /// * `username` - Username to search for
    ///
    /// # Returns
    /// Optional credential (None if not found)
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store operation failed
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<Credential>, AuthError>;

    /// Persist changes to an existing credential.
    ///
    /// The write only applies while the stored `updated_at` still equals the one
    /// carried by `credential`, so of two saves from the same read only the first wins.
    ///
    /// # Arguments
    /// * `credential` - Credential with updated fields, identified by its id
    ///
    /// # Returns
    /// Saved credential with its new `updated_at`
    ///
    /// # Errors
    /// * `UnknownUser` - Credential was removed since it was read
    /// * `StaleCredential` - Credential was written by someone else since it was read
    /// * `StoreUnavailable` - Store operation failed
    async fn save(&self, credential: Credential) -> Result<Credential, AuthError>;

    /// Insert a new credential with its first login pending.
    ///
    /// # Arguments
    /// * `credential` - Credential to create
    ///
    /// # Returns
    /// Created credential with its assigned id
    ///
    /// # Errors
    /// * `UsernameTaken` - Username is already registered
    /// * `StoreUnavailable` - Store operation failed
    async fn create(&self, credential: NewCredential) -> Result<Credential, AuthError>;
}
