//! # Compiti (Task API)
//!
//! `compiti` is a task-management backend with JWT authentication and strict
//! per-user isolation.
//!
//! ## Authentication
//!
//! Clients authenticate with email and password. A successful signup or login
//! returns a short-lived **access token** (bearer, JSON body) and sets a
//! longer-lived **refresh token** in an `HttpOnly` cookie scoped to the auth
//! path. Refreshing rotates the pair; the superseded refresh token is not
//! revoked and stays valid until its natural expiry.
//!
//! ## Ownership Isolation
//!
//! Every task read and write is scoped to `(id, owner, not deleted)`. A task
//! owned by another user is indistinguishable from a missing one: both return
//! `404 Not Found`, never `403 Forbidden`, to prevent resource enumeration.
//!
//! ## Soft Deletes
//!
//! Deleting a task stamps `deleted_at` instead of removing the row. All
//! accessors treat stamped rows as absent, including repeated deletes.

pub mod api;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
