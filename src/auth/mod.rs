//! Credential verification core.
//!
//! Two pieces:
//!
//! - [`hasher`]: derives a per-user salt and an HMAC-SHA-512 keyed hash from
//!   a plaintext password, and verifies a plaintext against a stored
//!   (salt, hash) pair with a constant-time comparison.
//! - [`AuthService`]: the register/login orchestrator. It owns no state
//!   beyond its two collaborators and holds no locks; each call is a
//!   short-lived, independent operation.

pub mod error;
pub mod hasher;
pub mod service;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use service::{normalize_username, AuthResult, AuthService, LoginRequest, RegisterRequest};
pub use store::{CreateOutcome, NewUserRecord, PgUserStore, UserRecord, UserStore};
pub use token::{SessionTokenIssuer, TokenIssuer};
