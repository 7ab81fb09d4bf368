//! Database helpers for the credential store.
//!
//! Every lookup excludes soft-deleted users; a deleted account behaves
//! exactly like one that never existed.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Public identity fields of an active user.
#[derive(Debug, Clone)]
pub(crate) struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) created_at: DateTime<Utc>,
}

/// Fields needed to authenticate a login attempt.
pub(super) struct LoginRecord {
    pub(super) user: UserRecord,
    pub(super) password_hash: String,
}

/// Outcome when attempting to insert a new user row.
#[derive(Debug)]
pub(super) enum InsertUserOutcome {
    Created(UserRecord),
    Conflict,
}

/// Outcome when renaming a user.
#[derive(Debug)]
pub(crate) enum UpdateUsernameOutcome {
    Updated(UserRecord),
    Conflict,
    Missing,
}

fn user_from_row(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        created_at: row.get("created_at"),
    }
}

pub(super) async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
    let query = "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND deleted_at IS NULL) AS present";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to check email existence")?;
    Ok(row.get("present"))
}

pub(super) async fn username_exists(pool: &PgPool, username: &str) -> Result<bool> {
    let query =
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND deleted_at IS NULL) AS present";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(username)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to check username existence")?;
    Ok(row.get("present"))
}

/// Insert a user row; the unique indexes on email/username are the
/// authoritative backstop for the caller's check-then-insert sequence.
pub(super) async fn insert_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<InsertUserOutcome> {
    let query = r"
        INSERT INTO users (email, username, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, email, username, created_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertUserOutcome::Created(user_from_row(&row))),
        Err(err) if is_unique_violation(&err) => Ok(InsertUserOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// Look up login data by normalized email.
pub(super) async fn lookup_login_record(pool: &PgPool, email: &str) -> Result<Option<LoginRecord>> {
    let query = r"
        SELECT id, email, username, password_hash, created_at
        FROM users
        WHERE email = $1 AND deleted_at IS NULL
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup login record")?;

    Ok(row.map(|row| LoginRecord {
        password_hash: row.get("password_hash"),
        user: user_from_row(&row),
    }))
}

/// Resolve a user id to an active (not soft-deleted) account.
pub(crate) async fn lookup_active_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>> {
    let query = r"
        SELECT id, email, username, created_at
        FROM users
        WHERE id = $1 AND deleted_at IS NULL
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup active user")?;
    Ok(row.map(|row| user_from_row(&row)))
}

/// Rename a user, rejecting usernames held by anyone else.
pub(crate) async fn update_username(
    pool: &PgPool,
    user_id: Uuid,
    username: &str,
) -> Result<UpdateUsernameOutcome> {
    let query = "SELECT id FROM users WHERE username = $1 AND deleted_at IS NULL";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let holder = sqlx::query(query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to check username holder")?;

    if let Some(row) = holder {
        let holder_id: Uuid = row.get("id");
        if holder_id != user_id {
            return Ok(UpdateUsernameOutcome::Conflict);
        }
    }

    let query = r"
        UPDATE users
        SET username = $2, updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, email, username, created_at
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await;

    match row {
        Ok(Some(row)) => Ok(UpdateUsernameOutcome::Updated(user_from_row(&row))),
        Ok(None) => Ok(UpdateUsernameOutcome::Missing),
        Err(err) if is_unique_violation(&err) => Ok(UpdateUsernameOutcome::Conflict),
        Err(err) => Err(err).context("failed to update username"),
    }
}
