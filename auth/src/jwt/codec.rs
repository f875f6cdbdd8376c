use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::Role;
use super::errors::TokenError;

/// Minimum HS256 secret length (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

/// A freshly issued token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Compact `header.payload.signature` text
    pub value: String,
    pub claims: Claims,
}

/// Issues and decodes HS256-signed session tokens.
///
/// Decoding verifies the signature and the algorithm only. Expiry is a separate check
/// (`is_expired`) so callers can tell a tampered token from an expired one.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a new codec with a shared secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (at least 32 bytes)
    /// * `ttl` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `WeakSecret` - Secret is shorter than 256 bits
    /// * `InvalidTtl` - Lifetime is shorter than one second
    ///
    /// # Security Notes
    /// - Store secrets in environment variables or secure vaults, never in code
    /// - Rotating the secret invalidates every outstanding token
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(TokenError::WeakSecret {
                min: MIN_SECRET_BYTES,
                actual: secret.len(),
            });
        }

        if ttl.num_seconds() <= 0 {
            return Err(TokenError::InvalidTtl);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Lifetime of issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token.
    ///
    /// `now` is truncated to whole seconds (JWT NumericDate); the token expires `ttl` later.
    ///
    /// # Arguments
    /// * `subject` - Username
    /// * `role` - Role claim
    /// * `user_id` - Numeric user identifier
    /// * `now` - Issue time
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(
        &self,
        subject: &str,
        role: Role,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            user_id,
            iat,
            exp: iat + self.ttl.num_seconds(),
        };

        let value = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Ok(Token { value, claims })
    }

    /// Decode a token and verify its signature.
    ///
    /// # Arguments
    /// * `token` - Compact token text
    ///
    /// # Returns
    /// Decoded claims, whether or not they are expired
    ///
    /// # Errors
    /// * `InvalidSignature` - Tampered, or signed with a different key
    /// * `UnexpectedAlgorithm` - Header names an algorithm other than HS256
    /// * `Malformed` - Text does not parse as a token carrying the expected claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm,
                _ => TokenError::Malformed(e.to_string()),
            })
    }

    /// Check whether decoded claims have passed their expiry at `now`.
    pub fn is_expired(&self, claims: &Claims, now: DateTime<Utc>) -> bool {
        claims.is_expired(now)
    }
}
