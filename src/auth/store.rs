//! User credential storage.

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::error::AuthError;

/// A persisted credential plus the profile fields login hands back.
///
/// `password_hash` is always the keyed hash of the plaintext under
/// `password_salt`, fixed at creation time; neither is mutated afterwards.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}

/// Fields for a single atomic create. The id is assigned by the store.
#[derive(Debug)]
pub struct NewUserRecord {
    pub username: String,
    pub display_name: String,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}

/// Outcome of an atomic create attempt.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(UserRecord),
    Duplicate,
}

/// Storage collaborator for the auth service.
///
/// Uniqueness of the normalized username is the store's job: the
/// check-then-create window in register is closed here, not with locks. Two
/// concurrent creates for one username must yield one `Created` and one
/// `Duplicate`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-insensitive lookup; `username` arrives already normalized.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError>;

    /// Atomic create; a username collision is reported as `Duplicate`, any
    /// other failure as [`AuthError::Persistence`].
    async fn create_user(&self, new_user: NewUserRecord) -> Result<CreateOutcome, AuthError>;

    /// URL of the user's primary profile image, when one is set.
    async fn find_primary_photo(&self, user_id: Uuid) -> Result<Option<String>, AuthError>;
}

/// PostgreSQL-backed store. `sql/schema.sql` carries the schema, including
/// the unique index on `lower(username)` that backs `create_user`.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn persistence(err: sqlx::Error, what: &str) -> AuthError {
    AuthError::Persistence(anyhow!(err).context(what.to_string()))
}

// Lookup keys on the same trimmed, lowercased form as `normalize_username`
// and the unique index in sql/schema.sql; the bind arrives already
// normalized.
const FIND_BY_USERNAME_SQL: &str =
    "SELECT id, username, display_name, password_hash, password_salt \
     FROM users WHERE LOWER(BTRIM(username)) = $1";

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AuthError> {
        let query = FIND_BY_USERNAME_SQL;
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| persistence(err, "failed to look up user by username"))?;

        Ok(row.map(|row| UserRecord {
            id: row.get("id"),
            username: row.get("username"),
            display_name: row.get("display_name"),
            password_hash: row.get("password_hash"),
            password_salt: row.get("password_salt"),
        }))
    }

    async fn create_user(&self, new_user: NewUserRecord) -> Result<CreateOutcome, AuthError> {
        let query = r"
            INSERT INTO users (id, username, display_name, password_hash, password_salt)
            VALUES ($1, $2, $3, $4, $5)
        ";
        let id = Uuid::now_v7();
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(id)
            .bind(&new_user.username)
            .bind(&new_user.display_name)
            .bind(&new_user.password_hash)
            .bind(&new_user.password_salt)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(CreateOutcome::Created(UserRecord {
                id,
                username: new_user.username,
                display_name: new_user.display_name,
                password_hash: new_user.password_hash,
                password_salt: new_user.password_salt,
            })),
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Duplicate),
            Err(err) => Err(persistence(err, "failed to insert user")),
        }
    }

    async fn find_primary_photo(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
        let query = "SELECT url FROM photos WHERE user_id = $1 AND is_main LIMIT 1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| persistence(err, "failed to look up primary photo"))?;

        Ok(row.map(|row| row.get("url")))
    }
}
