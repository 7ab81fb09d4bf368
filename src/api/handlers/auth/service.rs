//! Session orchestration: registration, authentication, and token rotation.

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::OnceLock;
use uuid::Uuid;

use super::password;
use super::state::AuthState;
use super::storage::{self, InsertUserOutcome, UserRecord};

/// Freshly issued access/refresh pair. The refresh half must only ever reach
/// the client through the auth cookie.
pub(super) struct TokenPair {
    pub(super) access: String,
    pub(super) refresh: String,
}

pub(super) enum RegisterOutcome {
    Created {
        user: UserRecord,
        tokens: TokenPair,
    },
    Conflict(&'static str),
}

static FALLBACK_HASH: OnceLock<String> = OnceLock::new();

/// Hash verified when the email is unknown, so unknown accounts cost the
/// same wall-clock time as a wrong password.
fn fallback_hash() -> &'static str {
    FALLBACK_HASH
        .get_or_init(|| password::hash_password("compiti-fallback-credential").unwrap_or_default())
}

/// Register a new user and issue the first token pair.
///
/// Email and username are checked with two sequential lookups before the
/// insert; the unique indexes remain the authoritative backstop, and a
/// constraint hit surfaces as a conflict like any other duplicate.
///
/// # Errors
/// Returns an error on storage or signing failures.
pub(super) async fn register(
    pool: &PgPool,
    state: &AuthState,
    email: &str,
    username: &str,
    password_plain: &str,
) -> Result<RegisterOutcome> {
    if storage::email_exists(pool, email).await? {
        return Ok(RegisterOutcome::Conflict("Email already registered"));
    }
    if storage::username_exists(pool, username).await? {
        return Ok(RegisterOutcome::Conflict("Username already taken"));
    }

    let password_hash = password::hash_password(password_plain)?;

    match storage::insert_user(pool, email, username, &password_hash).await? {
        InsertUserOutcome::Created(user) => {
            let tokens = issue_pair(state, user.id)?;
            Ok(RegisterOutcome::Created { user, tokens })
        }
        InsertUserOutcome::Conflict => Ok(RegisterOutcome::Conflict("Resource already exists")),
    }
}

/// Authenticate by email and password.
///
/// Returns `Ok(None)` for both unknown email and wrong password; the caller
/// maps that single outcome to one generic error so the two cases cannot be
/// told apart.
///
/// # Errors
/// Returns an error on storage or signing failures.
pub(super) async fn authenticate(
    pool: &PgPool,
    state: &AuthState,
    email: &str,
    password_plain: &str,
) -> Result<Option<(UserRecord, TokenPair)>> {
    let Some(record) = storage::lookup_login_record(pool, email).await? else {
        let _ = password::verify_password(password_plain, fallback_hash());
        return Ok(None);
    };

    if !password::verify_password(password_plain, &record.password_hash) {
        return Ok(None);
    }

    let tokens = issue_pair(state, record.user.id)?;
    Ok(Some((record.user, tokens)))
}

/// Issue a fresh pair for an existing session (token rotation).
///
/// Returns `Ok(None)` when the subject no longer resolves to an active user;
/// the superseded refresh token is not revoked, merely no longer returned.
///
/// # Errors
/// Returns an error on storage or signing failures.
pub(super) async fn rotate(
    pool: &PgPool,
    state: &AuthState,
    user_id: Uuid,
) -> Result<Option<TokenPair>> {
    let Some(user) = storage::lookup_active_user(pool, user_id).await? else {
        return Ok(None);
    };
    Ok(Some(issue_pair(state, user.id)?))
}

fn issue_pair(state: &AuthState, user_id: Uuid) -> Result<TokenPair> {
    let access = state
        .tokens()
        .issue_access(user_id)
        .context("failed to issue access token")?;
    let refresh = state
        .tokens()
        .issue_refresh(user_id)
        .context("failed to issue refresh token")?;
    Ok(TokenPair { access, refresh })
}
