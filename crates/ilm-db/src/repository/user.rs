//! # User and Session Repositories
//!
//! Maintainer accounts and their refresh-token sessions. Same write path as
//! the profile records, plus the lookups an auth layer needs.
//!
//! ## Session Lifecycle
//! ```text
//! login    → issue(user_id, ttl)            new row, random refresh token
//! refresh  → get_by_refresh_token(token)    caller checks is_expired(now)
//! logout   → delete(id) / delete_by_user_id(user_id)
//! cleanup  → delete_expired(now)
//! ```

use chrono::{DateTime, Duration, Utc};
use ilm_core::validation::{validate_id, validate_required};
use ilm_core::{User, UserPatch, UserSession};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::{create_record, delete_record, find_record, update_record};
use crate::error::DbResult;
use crate::queries;

// =============================================================================
// Users
// =============================================================================

/// Repository for maintainer accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user. The email must be unused.
    pub async fn create(&self, user: User) -> DbResult<User> {
        user.validate_new()?;
        create_record(&self.pool, user).await
    }

    /// Merges the provided fields into the stored user.
    pub async fn update(&self, patch: UserPatch) -> DbResult<User> {
        update_record(&self.pool, patch).await
    }

    /// Deletes a user and, through the store, all of their sessions.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        delete_record::<User>(&self.pool, id).await
    }

    /// Gets a user by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        find_record(&self.pool, id).await
    }

    /// Gets a user by email (exact match).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        validate_required("email", email)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

// =============================================================================
// Sessions
// =============================================================================

/// Repository for refresh-token sessions.
#[derive(Debug, Clone)]
pub struct UserSessionRepository {
    pool: SqlitePool,
}

impl UserSessionRepository {
    /// Creates a new UserSessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserSessionRepository { pool }
    }

    /// Inserts a session with a caller-supplied refresh token.
    pub async fn create(&self, session: UserSession) -> DbResult<UserSession> {
        session.validate_new()?;
        create_record(&self.pool, session).await
    }

    /// Opens a session for `user_id` with a fresh random refresh token,
    /// valid for `ttl` from now.
    pub async fn issue(&self, user_id: i64, ttl: Duration) -> DbResult<UserSession> {
        self.create(UserSession {
            user_id,
            refresh_token: Uuid::new_v4().simple().to_string(),
            expires_at: Utc::now() + ttl,
            ..Default::default()
        })
        .await
    }

    /// Gets a session by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<UserSession>> {
        find_record(&self.pool, id).await
    }

    /// Gets a session by its refresh token. Expired sessions are returned
    /// too; use [`UserSession::is_expired`].
    pub async fn get_by_refresh_token(&self, refresh_token: &str) -> DbResult<Option<UserSession>> {
        validate_required("refresh_token", refresh_token)?;

        let session = sqlx::query_as::<_, UserSession>(
            r#"
            SELECT id, user_id, refresh_token, expires_at, created_at, updated_at
            FROM user_sessions
            WHERE refresh_token = ?1
            "#,
        )
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets every session of a user, ordered by id.
    pub async fn get_by_user_id(&self, user_id: i64) -> DbResult<Vec<UserSession>> {
        validate_id("user_id", user_id)?;

        let mut conn = self.pool.acquire().await?;
        queries::select_where(&mut conn, "user_id", user_id).await
    }

    /// Deletes one session. `NotFound` when no row has this id.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        delete_record::<UserSession>(&self.pool, id).await
    }

    /// Deletes every session of a user. Returns the number removed; zero is
    /// not an error.
    pub async fn delete_by_user_id(&self, user_id: i64) -> DbResult<u64> {
        validate_id("user_id", user_id)?;

        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!(user_id, removed = result.rows_affected(), "Deleted user sessions");
        Ok(result.rows_affected())
    }

    /// Deletes every session that expired at or before `now`.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE julianday(expires_at) <= julianday(?1)")
                .bind(now)
                .execute(&self.pool)
                .await?;

        info!(removed = result.rows_affected(), "Deleted expired sessions");
        Ok(result.rows_affected())
    }
}
