//! Signed, time-bounded access and refresh tokens.
//!
//! Tokens are stateless HS256 JWTs: the subject is the user id, the `type`
//! claim discriminates access from refresh, and refresh tokens additionally
//! carry a random `jti` so a future revocation mechanism could key off it.
//! Nothing is persisted server-side.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("unexpected token type")]
    TypeMismatch,
    #[error("missing or invalid subject claim")]
    Subject,
    #[error("token signing failed")]
    Signing,
}

/// A decoded token whose signature, expiry, type, and subject all checked out.
#[derive(Debug, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: Uuid,
    pub claims: Claims,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::seconds(access_ttl_seconds),
            refresh_ttl: Duration::seconds(refresh_ttl_seconds),
        }
    }

    /// Issue a short-lived access token for `user_id`.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if claim encoding fails.
    pub fn issue_access(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenKind::Access, self.access_ttl, None)
    }

    /// Issue a refresh token for `user_id` with a fresh random `jti`.
    ///
    /// The `jti` is not checked against any store; rotation supersedes but
    /// does not invalidate previously issued refresh tokens.
    ///
    /// # Errors
    /// Returns `TokenError::Signing` if claim encoding fails.
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(
            user_id,
            TokenKind::Refresh,
            self.refresh_ttl,
            Some(Uuid::new_v4().to_string()),
        )
    }

    fn issue(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        ttl: Duration,
        jti: Option<String>,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            kind,
            jti,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }

    /// Decode and validate a token of the expected kind.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `TokenError::Invalid` for malformed tokens or bad signatures,
    /// - `TokenError::Expired` when `exp` has elapsed (wall-clock UTC, no
    ///   leeway),
    /// - `TokenError::TypeMismatch` when the `type` claim is not `expected`,
    /// - `TokenError::Subject` when the subject does not parse as a user id.
    ///
    /// Callers must treat every variant identically (generic 401) so the
    /// failure mode cannot be used as an oracle.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<VerifiedToken, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let decoded =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
                match err.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        let claims = decoded.claims;
        if claims.kind != expected {
            return Err(TokenError::TypeMismatch);
        }

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Subject)?;

        Ok(VerifiedToken { user_id, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            &SecretString::from("test-secret-key-0123456789abcdef"),
            15 * 60,
            7 * 24 * 60 * 60,
        )
    }

    #[test]
    fn access_round_trip_preserves_subject() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let token = issuer.issue_access(user_id).expect("issue");

        let verified = issuer.verify(&token, TokenKind::Access).expect("verify");
        assert_eq!(verified.user_id, user_id);
        assert_eq!(verified.claims.kind, TokenKind::Access);
        assert_eq!(verified.claims.jti, None);
        assert!(verified.claims.exp > verified.claims.iat);
    }

    #[test]
    fn refresh_round_trip_carries_jti() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let token = issuer.issue_refresh(user_id).expect("issue");

        let verified = issuer.verify(&token, TokenKind::Refresh).expect("verify");
        assert_eq!(verified.user_id, user_id);
        let jti = verified.claims.jti.expect("jti");
        assert!(Uuid::parse_str(&jti).is_ok());
    }

    #[test]
    fn refresh_jti_is_unique_per_issue() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let first = issuer.issue_refresh(user_id).expect("issue");
        let second = issuer.issue_refresh(user_id).expect("issue");
        assert_ne!(first, second);
    }

    #[test]
    fn type_mismatch_in_both_directions() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();

        let access = issuer.issue_access(user_id).expect("issue");
        assert_eq!(
            issuer.verify(&access, TokenKind::Refresh),
            Err(TokenError::TypeMismatch)
        );

        let refresh = issuer.issue_refresh(user_id).expect("issue");
        assert_eq!(
            issuer.verify(&refresh, TokenKind::Access),
            Err(TokenError::TypeMismatch)
        );
    }

    #[test]
    fn expired_token_rejected() {
        let expired_issuer = TokenIssuer::new(
            &SecretString::from("test-secret-key-0123456789abcdef"),
            -60,
            -60,
        );
        let token = expired_issuer
            .issue_access(Uuid::new_v4())
            .expect("issue");
        assert_eq!(
            expired_issuer.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn garbage_and_tampered_tokens_rejected() {
        let issuer = issuer();
        assert_eq!(
            issuer.verify("not.a.jwt", TokenKind::Access),
            Err(TokenError::Invalid)
        );

        let mut token = issuer.issue_access(Uuid::new_v4()).expect("issue");
        token.push('x');
        assert_eq!(
            issuer.verify(&token, TokenKind::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn wrong_secret_rejected() {
        let issuer = issuer();
        let other = TokenIssuer::new(&SecretString::from("another-secret-value"), 900, 900);
        let token = issuer.issue_access(Uuid::new_v4()).expect("issue");
        assert_eq!(
            other.verify(&token, TokenKind::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn non_uuid_subject_rejected() {
        let issuer = issuer();
        let now = Utc::now();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            kind: TokenKind::Access,
            jti: None,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-0123456789abcdef"),
        )
        .expect("encode");
        assert_eq!(
            issuer.verify(&token, TokenKind::Access),
            Err(TokenError::Subject)
        );
    }
}
