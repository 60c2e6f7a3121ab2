//! Registration and login orchestration.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::{
    error::AuthError,
    hasher,
    store::{CreateOutcome, NewUserRecord, UserStore},
    token::TokenIssuer,
};

/// Registration input. Consumed once; the plaintext never outlives the call.
pub struct RegisterRequest {
    pub username: String,
    pub password: SecretString,
    pub display_name: String,
}

/// Login input. Consumed once.
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

/// What a successful register or login hands back to the caller. Not
/// persisted anywhere.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub username: String,
    pub display_name: String,
    pub token: String,
    pub photo_url: Option<String>,
}

/// Lowercased, trimmed form used for every lookup and for uniqueness.
///
/// The username is stored as typed for display; comparing on the normalized
/// form keeps register's uniqueness check and login's lookup consistent, so
/// whoever registers as "Alice" can log in as "alice".
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Orchestrates uniqueness checking, hashing, persistence, and token
/// issuance. Collaborators are passed in explicitly; the service holds no
/// other state and no locks.
pub struct AuthService<S, T> {
    store: S,
    tokens: T,
}

impl<S: UserStore, T: TokenIssuer> AuthService<S, T> {
    pub const fn new(store: S, tokens: T) -> Self {
        Self { store, tokens }
    }

    /// Register a new user and issue their first token.
    ///
    /// # Errors
    ///
    /// [`AuthError::DuplicateUsername`] when the username is already taken
    /// (case-insensitively), otherwise whatever the store, hasher, or token
    /// issuer surfaced. Nothing is retried.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResult, AuthError> {
        let normalized = normalize_username(&request.username);

        if self.store.find_by_username(&normalized).await?.is_some() {
            return Err(AuthError::DuplicateUsername);
        }

        let (salt, hash) = hasher::derive(request.password.expose_secret().as_bytes())?;

        // The store's unique index decides races between the check above and
        // this insert; the loser surfaces here as Duplicate.
        let outcome = self
            .store
            .create_user(NewUserRecord {
                username: request.username,
                display_name: request.display_name,
                password_hash: hash,
                password_salt: salt,
            })
            .await?;

        let user = match outcome {
            CreateOutcome::Created(user) => user,
            CreateOutcome::Duplicate => return Err(AuthError::DuplicateUsername),
        };

        let token = self.tokens.issue(&user)?;

        debug!(username = %user.username, "user registered");

        Ok(AuthResult {
            username: user.username,
            display_name: user.display_name,
            token,
            photo_url: None,
        })
    }

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidUsername`] when no credential exists,
    /// [`AuthError::InvalidPassword`] when the hash does not verify. The two
    /// stay distinct here; presentation decides how much to reveal.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResult, AuthError> {
        let normalized = normalize_username(&request.username);

        let user = self
            .store
            .find_by_username(&normalized)
            .await?
            .ok_or(AuthError::InvalidUsername)?;

        if !hasher::verify(
            request.password.expose_secret().as_bytes(),
            &user.password_salt,
            &user.password_hash,
        ) {
            return Err(AuthError::InvalidPassword);
        }

        let token = self.tokens.issue(&user)?;
        let photo_url = self.store.find_primary_photo(user.id).await?;

        debug!(username = %user.username, "login successful");

        Ok(AuthResult {
            username: user.username,
            display_name: user.display_name,
            token,
            photo_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::UserRecord;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// In-memory store with the same atomicity contract as the SQL store:
    /// the uniqueness check and the insert happen under one lock.
    #[derive(Default)]
    struct MemoryStore {
        users: Mutex<HashMap<String, UserRecord>>,
        photos: Mutex<HashMap<Uuid, String>>,
    }

    impl MemoryStore {
        fn set_primary_photo(&self, user_id: Uuid, url: &str) {
            if let Ok(mut photos) = self.photos.lock() {
                photos.insert(user_id, url.to_string());
            }
        }
    }

    #[async_trait]
    impl UserStore for &MemoryStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
            let users = self
                .users
                .lock()
                .map_err(|_| AuthError::Persistence(anyhow!("poisoned lock")))?;
            Ok(users.get(username).cloned())
        }

        async fn create_user(&self, new_user: NewUserRecord) -> Result<CreateOutcome, AuthError> {
            let mut users = self
                .users
                .lock()
                .map_err(|_| AuthError::Persistence(anyhow!("poisoned lock")))?;
            let key = normalize_username(&new_user.username);
            if users.contains_key(&key) {
                return Ok(CreateOutcome::Duplicate);
            }
            let user = UserRecord {
                id: Uuid::now_v7(),
                username: new_user.username,
                display_name: new_user.display_name,
                password_hash: new_user.password_hash,
                password_salt: new_user.password_salt,
            };
            users.insert(key, user.clone());
            Ok(CreateOutcome::Created(user))
        }

        async fn find_primary_photo(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
            let photos = self
                .photos
                .lock()
                .map_err(|_| AuthError::Persistence(anyhow!("poisoned lock")))?;
            Ok(photos.get(&user_id).cloned())
        }
    }

    struct StaticTokenIssuer;

    impl TokenIssuer for StaticTokenIssuer {
        fn issue(&self, _user: &UserRecord) -> Result<String, AuthError> {
            Ok("token-1".to_string())
        }
    }

    struct FailingTokenIssuer;

    impl TokenIssuer for FailingTokenIssuer {
        fn issue(&self, _user: &UserRecord) -> Result<String, AuthError> {
            Err(AuthError::TokenIssuance(anyhow!("signer offline")))
        }
    }

    fn register_request(username: &str, password: &str, display_name: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
            display_name: display_name.to_string(),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    #[tokio::test]
    async fn register_then_login_round_trips() -> Result<()> {
        let store = MemoryStore::default();
        let service = AuthService::new(&store, StaticTokenIssuer);

        let registered = service
            .register(register_request("alice", "correct horse", "Alice"))
            .await?;
        assert_eq!(registered.username, "alice");
        assert_eq!(registered.display_name, "Alice");
        assert!(!registered.token.is_empty());
        assert_eq!(registered.photo_url, None);

        let logged_in = service.login(login_request("alice", "correct horse")).await?;
        assert_eq!(logged_in.username, "alice");
        assert!(!logged_in.token.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username_case_insensitively() -> Result<()> {
        let store = MemoryStore::default();
        let service = AuthService::new(&store, StaticTokenIssuer);

        service
            .register(register_request("Alice", "correct horse", "Alice"))
            .await?;

        let err = service
            .register(register_request("alice", "other password", "Other Alice"))
            .await
            .expect_err("duplicate register should fail");
        assert!(matches!(err, AuthError::DuplicateUsername));

        // The losing register must not have created a second credential.
        let stored = (&store).find_by_username("alice").await?;
        assert_eq!(stored.map(|user| user.display_name), Some("Alice".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn login_is_case_insensitive_on_username() -> Result<()> {
        let store = MemoryStore::default();
        let service = AuthService::new(&store, StaticTokenIssuer);

        service
            .register(register_request("Alice", "correct horse", "Alice"))
            .await?;

        // Registered as "Alice", logging in as "alice" works: lookups run on
        // the normalized username, matching the uniqueness check.
        let result = service.login(login_request("alice", "correct horse")).await?;
        assert_eq!(result.username, "Alice");
        Ok(())
    }

    #[tokio::test]
    async fn surrounding_whitespace_never_splits_an_identity() -> Result<()> {
        let store = MemoryStore::default();
        let service = AuthService::new(&store, StaticTokenIssuer);

        service
            .register(register_request(" alice ", "correct horse", "Alice"))
            .await?;

        // A padded registration and a bare one share the uniqueness domain.
        let err = service
            .register(register_request("alice", "other password", "Impostor"))
            .await
            .expect_err("padded and bare usernames are the same identity");
        assert!(matches!(err, AuthError::DuplicateUsername));

        // And the padded registration stays reachable at login time.
        let result = service.login(login_request("alice", "correct horse")).await?;
        assert_eq!(result.username, " alice ");
        Ok(())
    }

    #[tokio::test]
    async fn login_distinguishes_unknown_user_from_wrong_password() -> Result<()> {
        let store = MemoryStore::default();
        let service = AuthService::new(&store, StaticTokenIssuer);

        service
            .register(register_request("alice", "correct horse", "Alice"))
            .await?;

        let err = service
            .login(login_request("nobody", "correct horse"))
            .await
            .expect_err("unknown user should fail");
        assert!(matches!(err, AuthError::InvalidUsername));

        let err = service
            .login(login_request("alice", "wrong password"))
            .await
            .expect_err("wrong password should fail");
        assert!(matches!(err, AuthError::InvalidPassword));
        Ok(())
    }

    #[tokio::test]
    async fn login_returns_primary_photo_when_set() -> Result<()> {
        let store = MemoryStore::default();
        let service = AuthService::new(&store, StaticTokenIssuer);

        service
            .register(register_request("alice", "correct horse", "Alice"))
            .await?;
        let user = (&store)
            .find_by_username("alice")
            .await?
            .ok_or_else(|| anyhow!("user should exist"))?;
        store.set_primary_photo(user.id, "https://cdn.credo.dev/alice.png");

        let result = service.login(login_request("alice", "correct horse")).await?;
        assert_eq!(
            result.photo_url.as_deref(),
            Some("https://cdn.credo.dev/alice.png")
        );
        Ok(())
    }

    #[tokio::test]
    async fn token_issuance_failure_is_surfaced_unchanged() -> Result<()> {
        let store = MemoryStore::default();
        let service = AuthService::new(&store, FailingTokenIssuer);

        let err = service
            .register(register_request("alice", "correct horse", "Alice"))
            .await
            .expect_err("issuer failure should propagate");
        assert!(matches!(err, AuthError::TokenIssuance(_)));
        Ok(())
    }

    #[tokio::test]
    async fn create_race_loser_gets_duplicate_username() -> Result<()> {
        // Force the CreateOutcome::Duplicate path directly: the existence
        // check passed for both callers, the store decided the race.
        struct RacingStore(MemoryStore);

        #[async_trait]
        impl UserStore for &RacingStore {
            async fn find_by_username(
                &self,
                _username: &str,
            ) -> Result<Option<UserRecord>, AuthError> {
                // Simulate the race: the other register commits after this
                // caller's existence check came back empty.
                Ok(None)
            }

            async fn create_user(
                &self,
                new_user: NewUserRecord,
            ) -> Result<CreateOutcome, AuthError> {
                (&self.0).create_user(new_user).await
            }

            async fn find_primary_photo(
                &self,
                user_id: Uuid,
            ) -> Result<Option<String>, AuthError> {
                (&self.0).find_primary_photo(user_id).await
            }
        }

        let store = RacingStore(MemoryStore::default());
        let service = AuthService::new(&store, StaticTokenIssuer);

        service
            .register(register_request("alice", "first password", "Alice"))
            .await?;
        let err = service
            .register(register_request("ALICE", "second password", "Impostor"))
            .await
            .expect_err("race loser should fail");
        assert!(matches!(err, AuthError::DuplicateUsername));
        Ok(())
    }

    #[test]
    fn normalize_username_trims_and_lowercases() {
        assert_eq!(normalize_username(" Alice "), "alice");
        assert_eq!(normalize_username("BOB"), "bob");
        assert_eq!(normalize_username("carol"), "carol");
    }
}
