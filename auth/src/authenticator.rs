use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::jwt::Role;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;

const BEARER_PREFIX: &str = "Bearer ";

/// Validates inbound bearer tokens for protected operations.
///
/// Combines signature verification and the expiry check, and turns the result into the
/// identity the HTTP boundary attaches to the request.
#[derive(Clone)]
pub struct TokenAuthenticator {
    codec: Arc<TokenCodec>,
}

/// Identity extracted from a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedIdentity {
    pub username: String,
    pub role: Role,
    pub user_id: i64,
}

/// Bearer token rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthenticatorError {
    #[error("Missing or malformed bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Token is expired")]
    TokenExpired,
}

impl TokenAuthenticator {
    /// Create a new authenticator over a shared codec.
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Authenticate an `Authorization` header value.
    ///
    /// # Arguments
    /// * `header` - Raw header value, if the header was present
    /// * `now` - Current time used for the expiry check
    ///
    /// # Returns
    /// Identity claims of the token holder
    ///
    /// # Errors
    /// * `MissingToken` - Header absent or not of the form `Bearer <token>`
    /// * `InvalidToken` - Token malformed, tampered, or signed with another key or algorithm
    /// * `TokenExpired` - Token signature is valid but its lifetime has elapsed
    pub fn authenticate(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedIdentity, AuthenticatorError> {
        let token = header
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthenticatorError::MissingToken)?;

        let claims = self.codec.decode(token)?;

        if self.codec.is_expired(&claims, now) {
            return Err(AuthenticatorError::TokenExpired);
        }

        Ok(AuthenticatedIdentity {
            username: claims.sub,
            role: claims.role,
            user_id: claims.user_id,
        })
    }
}
