use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::TokenCodec;
use chrono::Utc;

use crate::credential::errors::AuthError;
use crate::credential::models::AuthOutcome;
use crate::credential::models::ChangeInitialPasswordCommand;
use crate::credential::models::ChangePasswordCommand;
use crate::credential::models::Credential;
use crate::credential::models::IdentitySummary;
use crate::credential::models::LoginCommand;
use crate::credential::models::NewCredential;
use crate::credential::models::PasswordPolicy;
use crate::credential::models::ProvisionCredentialCommand;
use crate::credential::models::ReasonCode;
use crate::credential::models::Username;
use crate::credential::ports::AuthServicePort;
use crate::credential::ports::CredentialStore;

/// Domain service implementation for login and password operations.
///
/// Holds no per-session state: every call reads the credential store, and issued tokens
/// are not remembered.
pub struct AuthenticationService<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    password_hasher: PasswordHasher,
    token_codec: Arc<TokenCodec>,
    password_policy: PasswordPolicy,
}

impl<CS> AuthenticationService<CS>
where
    CS: CredentialStore,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `password_hasher` - Hasher used for new passwords and verification
    /// * `token_codec` - Codec signing issued session tokens
    /// * `password_policy` - Rule applied whenever a password is set
    pub fn new(
        store: Arc<CS>,
        password_hasher: PasswordHasher,
        token_codec: Arc<TokenCodec>,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            store,
            password_hasher,
            token_codec,
            password_policy,
        }
    }

    async fn try_login(&self, command: LoginCommand) -> Result<AuthOutcome, AuthError> {
        let credential = self.find_credential(&command.username).await?;

        if !self
            .verify_password(&command.password, &credential.password_hash)
            .await?
        {
            return Err(AuthError::BadPassword);
        }

        let token = self.token_codec.issue(
            credential.username.as_str(),
            credential.role,
            credential.id.0,
            Utc::now(),
        )?;

        tracing::info!(
            username = %credential.username,
            user_id = %credential.id,
            role = %credential.role,
            first_login_pending = credential.first_login_pending,
            "User logged in"
        );

        Ok(AuthOutcome::logged_in(
            token.value,
            IdentitySummary::from(&credential),
        ))
    }

    async fn try_change_initial_password(
        &self,
        command: ChangeInitialPasswordCommand,
    ) -> Result<AuthOutcome, AuthError> {
        self.password_policy.check(&command.new_password)?;

        let mut credential = self.find_credential(&command.username).await?;
        credential.password_hash = self.hash_password(&command.new_password).await?;
        credential.first_login_pending = false;

        let saved = self.store.save(credential).await?;
        tracing::info!(username = %saved.username, "Initial password changed");

        Ok(AuthOutcome::success(
            ReasonCode::PasswordChanged,
            "Password changed, please log in again",
        ))
    }

    async fn try_change_password(
        &self,
        command: ChangePasswordCommand,
    ) -> Result<AuthOutcome, AuthError> {
        let mut credential = self.find_credential(&command.username).await?;

        if !self
            .verify_password(&command.old_password, &credential.password_hash)
            .await?
        {
            return Err(AuthError::BadOldPassword);
        }

        self.password_policy.check(&command.new_password)?;

        credential.password_hash = self.hash_password(&command.new_password).await?;

        let saved = self.store.save(credential).await?;
        tracing::info!(username = %saved.username, "Password changed");

        Ok(AuthOutcome::success(
            ReasonCode::PasswordChanged,
            "Password changed successfully",
        ))
    }

    async fn try_provision(
        &self,
        command: ProvisionCredentialCommand,
    ) -> Result<AuthOutcome, AuthError> {
        self.password_policy.check(&command.initial_password)?;

        let password_hash = self.hash_password(&command.initial_password).await?;
        let created = self
            .store
            .create(NewCredential {
                username: command.username,
                password_hash,
                role: command.role,
                full_name: command.full_name,
            })
            .await?;

        tracing::info!(
            username = %created.username,
            user_id = %created.id,
            role = %created.role,
            "Account provisioned"
        );

        Ok(AuthOutcome::success(
            ReasonCode::AccountProvisioned,
            format!("Account {} provisioned", created.username),
        ))
    }

    async fn find_credential(&self, username: &Username) -> Result<Credential, AuthError> {
        self.store
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))
    }

    // Argon2 blocks for tens of milliseconds; keep it off the async workers.
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Unknown(format!("Hashing task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.password_hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Unknown(format!("Verification task failed: {}", e)))
    }
}

/// Turn caller-attributable errors into rejected outcomes; keep infrastructure errors.
fn fold_rejection(
    operation: &'static str,
    result: Result<AuthOutcome, AuthError>,
) -> Result<AuthOutcome, AuthError> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(err) => match err.rejection_reason() {
            Some(reason) => {
                tracing::info!(operation, reason = %reason, "Request rejected");
                Ok(AuthOutcome::rejected(reason, err.to_string()))
            }
            None => {
                tracing::error!(operation, error = %err, "Request failed");
                Err(err)
            }
        },
    }
}

#[async_trait]
impl<CS> AuthServicePort for AuthenticationService<CS>
where
    CS: CredentialStore,
{
    async fn login(&self, command: LoginCommand) -> Result<AuthOutcome, AuthError> {
        fold_rejection("login", self.try_login(command).await)
    }

    async fn change_initial_password(
        &self,
        command: ChangeInitialPasswordCommand,
    ) -> Result<AuthOutcome, AuthError> {
        fold_rejection(
            "change_initial_password",
            self.try_change_initial_password(command).await,
        )
    }

    async fn change_password(
        &self,
        command: ChangePasswordCommand,
    ) -> Result<AuthOutcome, AuthError> {
        fold_rejection("change_password", self.try_change_password(command).await)
    }

    async fn provision(
        &self,
        command: ProvisionCredentialCommand,
    ) -> Result<AuthOutcome, AuthError> {
        fold_rejection("provision", self.try_provision(command).await)
    }
}
