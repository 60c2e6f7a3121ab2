use thiserror::Error;

/// Failure taxonomy for registration and login.
///
/// `InvalidUsername` and `InvalidPassword` stay distinct so operators can see
/// the real cause in logs; the HTTP layer presents both as the same 401 so a
/// caller cannot enumerate usernames.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Another user already holds this username (case-insensitively).
    #[error("username already exists")]
    DuplicateUsername,

    /// No credential stored under this username.
    #[error("unknown username")]
    InvalidUsername,

    /// The password did not verify against the stored hash.
    #[error("wrong password")]
    InvalidPassword,

    /// The user store failed; propagated as-is, never retried here.
    #[error("user store failure")]
    Persistence(#[source] anyhow::Error),

    /// The token issuer failed for otherwise valid input.
    #[error("token issuance failure")]
    TokenIssuance(#[source] anyhow::Error),

    /// The OS random source failed. Fatal for the operation; no recovery.
    #[error("entropy source failure")]
    EntropySource(#[source] anyhow::Error),
}
