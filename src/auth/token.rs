//! Token issuance collaborator.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

use super::{error::AuthError, store::UserRecord};

/// Number of random bytes behind each issued token.
const TOKEN_BYTES: usize = 32;

/// Issues the token handed back to a caller after registration or login.
///
/// The token is opaque to this crate; its internal structure is the issuer's
/// business.
pub trait TokenIssuer: Send + Sync {
    /// Produce a token for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenIssuance`] when a token cannot be produced.
    fn issue(&self, user: &UserRecord) -> Result<String, AuthError>;
}

/// Opaque session tokens: 32 OS-random bytes, base64url without padding.
///
/// The token carries no claims and encodes nothing about the user; callers
/// treat it as a bearer handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionTokenIssuer;

impl TokenIssuer for SessionTokenIssuer {
    fn issue(&self, _user: &UserRecord) -> Result<String, AuthError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| AuthError::TokenIssuance(err.into()))?;
        Ok(Base64UrlUnpadded::encode_string(&bytes))
    }
}
