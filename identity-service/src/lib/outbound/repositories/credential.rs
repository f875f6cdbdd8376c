use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::credential::errors::AuthError;
use crate::credential::models::Credential;
use crate::credential::models::NewCredential;
use crate::credential::models::Role;
use crate::credential::models::UserId;
use crate::credential::models::Username;
use crate::credential::ports::CredentialStore;

const CREDENTIAL_COLUMNS: &str =
    "id, username, password_hash, role, full_name, is_first_login, updated_at";

/// PostgreSQL-backed credential store over the `users` table.
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
    full_name: String,
    is_first_login: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = AuthError;

    // A row that fails validation is bad stored data, not bad caller input.
    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Credential {
            id: UserId(id),
            username: Username::new(row.username).map_err(|e| corrupt_row(id, e))?,
            password_hash: row.password_hash,
            role: row.role.parse::<Role>().map_err(|e| corrupt_row(id, e))?,
            full_name: row.full_name,
            first_login_pending: row.is_first_login,
            updated_at: row.updated_at,
        })
    }
}

fn corrupt_row(id: i64, err: impl std::fmt::Display) -> AuthError {
    AuthError::Unknown(format!("Corrupt credential row {}: {}", id, err))
}

fn store_error(e: sqlx::Error) -> AuthError {
    AuthError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Credential>, AuthError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            CREDENTIAL_COLUMNS
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(Credential::try_from).transpose()
    }

    async fn save(&self, credential: Credential) -> Result<Credential, AuthError> {
        // updated_at doubles as the row version and must strictly advance
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            r#"
            UPDATE users
            SET password_hash = $2, role = $3, full_name = $4, is_first_login = $5,
                updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1 AND updated_at = $6
            RETURNING {}
            "#,
            CREDENTIAL_COLUMNS
        ))
        .bind(credential.id.0)
        .bind(&credential.password_hash)
        .bind(credential.role.as_str())
        .bind(&credential.full_name)
        .bind(credential.first_login_pending)
        .bind(credential.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        if let Some(r) = row {
            return Credential::try_from(r);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(credential.id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        if exists {
            tracing::warn!(
                username = %credential.username,
                "Credential changed since it was read"
            );
            Err(AuthError::StaleCredential(credential.username.to_string()))
        } else {
            Err(AuthError::UnknownUser(credential.username.to_string()))
        }
    }

    async fn create(&self, credential: NewCredential) -> Result<Credential, AuthError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            r#"
            INSERT INTO users (username, password_hash, role, full_name, is_first_login)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING {}
            "#,
            CREDENTIAL_COLUMNS
        ))
        .bind(credential.username.as_str())
        .bind(&credential.password_hash)
        .bind(credential.role.as_str())
        .bind(&credential.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AuthError::UsernameTaken(credential.username.to_string());
                }
            }
            store_error(e)
        })?;

        Credential::try_from(row)
    }
}
