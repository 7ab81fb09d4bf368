//! Auth configuration and shared state.

use secrecy::SecretString;

use super::token::TokenIssuer;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
    cookie_secure: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_access_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl_seconds = seconds;
        self
    }

    /// Mark the refresh cookie `Secure`; enabled for production deployments.
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    #[must_use]
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    pub(super) fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

pub struct AuthState {
    config: AuthConfig,
    tokens: TokenIssuer,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let tokens = TokenIssuer::new(
            config.jwt_secret(),
            config.access_token_ttl_seconds(),
            config.refresh_token_ttl_seconds(),
        );
        Self { config, tokens }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new(SecretString::from("secret"));

        assert_eq!(
            config.access_token_ttl_seconds(),
            DEFAULT_ACCESS_TOKEN_TTL_SECONDS
        );
        assert_eq!(
            config.refresh_token_ttl_seconds(),
            DEFAULT_REFRESH_TOKEN_TTL_SECONDS
        );
        assert!(!config.cookie_secure());

        let config = config
            .with_access_token_ttl_seconds(60)
            .with_refresh_token_ttl_seconds(120)
            .with_cookie_secure(true);

        assert_eq!(config.access_token_ttl_seconds(), 60);
        assert_eq!(config.refresh_token_ttl_seconds(), 120);
        assert!(config.cookie_secure());
    }

    #[test]
    fn debug_redacts_secret() {
        let config = AuthConfig::new(SecretString::from("super-secret"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn auth_state_wires_issuer_from_config() {
        let state = AuthState::new(
            AuthConfig::new(SecretString::from("secret")).with_access_token_ttl_seconds(60),
        );
        let user_id = uuid::Uuid::new_v4();
        let token = state.tokens().issue_access(user_id).expect("issue");
        let verified = state
            .tokens()
            .verify(&token, super::super::token::TokenKind::Access)
            .expect("verify");
        assert_eq!(verified.user_id, user_id);
    }
}
