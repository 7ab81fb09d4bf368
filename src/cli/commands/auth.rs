//! Token and session arguments for the auth stack.

use anyhow::{Context, Result};
use clap::{Arg, Command, builder::PossibleValuesParser};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_ACCESS_TOKEN_TTL_MINUTES: &str = "access-token-ttl-minutes";
pub const ARG_REFRESH_TOKEN_TTL_DAYS: &str = "refresh-token-ttl-days";
pub const ARG_ENVIRONMENT: &str = "environment";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Symmetric secret used to sign access and refresh tokens (HS256)")
                .env("COMPITI_JWT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN_TTL_MINUTES)
                .long(ARG_ACCESS_TOKEN_TTL_MINUTES)
                .help("Access token lifetime in minutes")
                .default_value("15")
                .env("COMPITI_ACCESS_TOKEN_TTL_MINUTES")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_TOKEN_TTL_DAYS)
                .long(ARG_REFRESH_TOKEN_TTL_DAYS)
                .help("Refresh token lifetime in days")
                .default_value("7")
                .env("COMPITI_REFRESH_TOKEN_TTL_DAYS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment; production marks the refresh cookie Secure")
                .default_value("development")
                .env("COMPITI_ENVIRONMENT")
                .value_parser(PossibleValuesParser::new(["development", "production"])),
        )
}

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub production: bool,
}

impl Options {
    /// Collect auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if the required secret is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;

        let access_minutes = matches
            .get_one::<i64>(ARG_ACCESS_TOKEN_TTL_MINUTES)
            .copied()
            .unwrap_or(15);
        let refresh_days = matches
            .get_one::<i64>(ARG_REFRESH_TOKEN_TTL_DAYS)
            .copied()
            .unwrap_or(7);
        let production = matches
            .get_one::<String>(ARG_ENVIRONMENT)
            .is_some_and(|environment| environment == "production");

        Ok(Self {
            jwt_secret,
            access_token_ttl_seconds: access_minutes * 60,
            refresh_token_ttl_seconds: refresh_days * 24 * 60 * 60,
            production,
        })
    }
}
