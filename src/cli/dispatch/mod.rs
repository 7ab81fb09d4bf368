//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let cors_origin = matches
        .get_one::<String>("cors-origin")
        .cloned()
        .unwrap_or_else(|| "http://localhost:3000".to_string());

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        cors_origin,
        jwt_secret: auth_opts.jwt_secret,
        access_token_ttl_seconds: auth_opts.access_token_ttl_seconds,
        refresh_token_ttl_seconds: auth_opts.refresh_token_ttl_seconds,
        production: auth_opts.production,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn handler_builds_server_action() {
        temp_env::with_vars(
            [
                ("COMPITI_PORT", None::<&str>),
                ("COMPITI_CORS_ORIGIN", None::<&str>),
                ("COMPITI_ENVIRONMENT", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "compiti",
                    "--dsn",
                    "postgres://user@localhost:5432/compiti",
                    "--jwt-secret",
                    "0123456789abcdef0123456789abcdef",
                ]);
                let action = handler(&matches).expect("action");
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/compiti");
                assert_eq!(args.cors_origin, "http://localhost:3000");
                assert!(!args.production);
            },
        );
    }
}
