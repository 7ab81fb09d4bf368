use crate::api::{self, handlers::auth::AuthConfig};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub production: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database pool cannot be created or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(SecretString::from(args.jwt_secret))
        .with_access_token_ttl_seconds(args.access_token_ttl_seconds)
        .with_refresh_token_ttl_seconds(args.refresh_token_ttl_seconds)
        .with_cookie_secure(args.production);

    api::new(args.port, args.dsn, args.cors_origin, auth_config).await
}
