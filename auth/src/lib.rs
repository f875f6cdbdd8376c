//! Authentication utilities library
//!
//! Provides the credential and session-token primitives used by the identity service:
//! - Password hashing (Argon2id, with BCrypt verification for migrated hashes)
//! - HS256 session token issuance and decoding
//! - Bearer token authentication for protected requests
//!
//! All operations are synchronous and hold no shared mutable state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Session Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{Role, TokenAuthenticator, TokenCodec};
//! use chrono::{Duration, Utc};
//!
//! let codec = Arc::new(
//!     TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap(),
//! );
//! let token = codec.issue("alice", Role::Student, 1, Utc::now()).unwrap();
//!
//! let authenticator = TokenAuthenticator::new(codec);
//! let header = format!("Bearer {}", token.value);
//! let identity = authenticator.authenticate(Some(&header), Utc::now()).unwrap();
//! assert_eq!(identity.username, "alice");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticatedIdentity;
pub use authenticator::AuthenticatorError;
pub use authenticator::TokenAuthenticator;
pub use jwt::Claims;
pub use jwt::Role;
pub use jwt::RoleError;
pub use jwt::Token;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use password::PasswordError;
pub use password::PasswordHasher;
