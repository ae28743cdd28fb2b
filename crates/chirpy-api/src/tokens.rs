//! Signed session tokens.
//!
//! Access and refresh tokens are both HS256 JWTs over the same secret; the
//! `iss` claim is the only thing telling them apart, and a token presented
//! as the wrong kind is rejected outright. Refresh tokens are revoked by
//! denylisting the raw token string, so revoking one leaves a user's other
//! sessions alone.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use chirpy_db::{Database, DbError, RevokedToken};
use chirpy_types::api::Claims;

pub const ACCESS_ISSUER: &str = "chirpy-access";
pub const REFRESH_ISSUER: &str = "chirpy-refresh";

pub const DEFAULT_ACCESS_TTL: Duration = Duration::hours(1);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::days(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn issuer(self) -> &'static str {
        match self {
            Self::Access => ACCESS_ISSUER,
            Self::Refresh => REFRESH_ISSUER,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("expected a {} token", .expected.issuer())]
    WrongIssuer { expected: TokenKind },

    #[error("token has been revoked")]
    Revoked,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] DbError),
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenAuthority {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }

    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    pub fn issue(&self, user_id: u64, kind: TokenKind) -> Result<String, TokenError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            iss: kind.issuer().to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    pub fn issue_pair(&self, user_id: u64) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh)?,
        })
    }

    /// Check signature, then issuer, then expiry (`now < exp`).
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        self.validate_at(token, expected, Utc::now())
    }

    fn validate_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below without leeway.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                TokenError::Invalid
            })?
            .claims;

        if claims.iss != expected.issuer() {
            return Err(TokenError::WrongIssuer { expected });
        }
        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Mint a new access token from a valid, non-denylisted refresh token.
    pub fn refresh(&self, db: &Database, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.validate(refresh_token, TokenKind::Refresh)?;

        if db.is_token_revoked(refresh_token)? {
            return Err(TokenError::Revoked);
        }

        self.issue(subject_id(&claims)?, TokenKind::Access)
    }

    /// Denylist a refresh token. Access tokens cannot be revoked here.
    pub fn revoke(&self, db: &Database, refresh_token: &str) -> Result<RevokedToken, TokenError> {
        let claims = self.validate(refresh_token, TokenKind::Refresh)?;

        let entry = db.revoke_token(refresh_token, Utc::now())?;
        info!("Refresh token for user {} revoked", claims.sub);
        Ok(entry)
    }
}

pub fn subject_id(claims: &Claims) -> Result<u64, TokenError> {
    claims.sub.parse().map_err(|_| TokenError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new("test-secret")
    }

    fn temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("database.json")).unwrap();
        (dir, db)
    }

    #[test]
    fn issued_tokens_carry_subject_and_issuer() {
        let tokens = authority();
        let pair = tokens.issue_pair(7).unwrap();

        let access = tokens.validate(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.sub, "7");
        assert_eq!(access.iss, ACCESS_ISSUER);
        assert_eq!(access.exp - access.iat, DEFAULT_ACCESS_TTL.num_seconds());

        let refresh = tokens.validate(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.sub, "7");
        assert_eq!(refresh.iss, REFRESH_ISSUER);
        assert_eq!(refresh.exp - refresh.iat, DEFAULT_REFRESH_TTL.num_seconds());
    }

    #[test]
    fn kinds_are_not_interchangeable() {
        let tokens = authority();
        let pair = tokens.issue_pair(1).unwrap();

        assert!(matches!(
            tokens.validate(&pair.access_token, TokenKind::Refresh),
            Err(TokenError::WrongIssuer { expected: TokenKind::Refresh })
        ));
        assert!(matches!(
            tokens.validate(&pair.refresh_token, TokenKind::Access),
            Err(TokenError::WrongIssuer { expected: TokenKind::Access })
        ));
    }

    #[test]
    fn wrong_kind_is_rejected_even_when_expired() {
        let tokens = authority().with_ttls(Duration::seconds(-10), Duration::seconds(-10));
        let pair = tokens.issue_pair(1).unwrap();

        assert!(matches!(
            tokens.validate(&pair.access_token, TokenKind::Refresh),
            Err(TokenError::WrongIssuer { .. })
        ));
        assert!(matches!(
            tokens.validate(&pair.refresh_token, TokenKind::Access),
            Err(TokenError::WrongIssuer { .. })
        ));
    }

    #[test]
    fn expiry_is_exclusive() {
        let tokens = authority();
        let token = tokens.issue(1, TokenKind::Access).unwrap();
        let claims = tokens.validate(&token, TokenKind::Access).unwrap();

        let just_before = DateTime::from_timestamp(claims.exp - 1, 0).unwrap();
        let at_expiry = DateTime::from_timestamp(claims.exp, 0).unwrap();

        assert!(tokens.validate_at(&token, TokenKind::Access, just_before).is_ok());
        assert!(matches!(
            tokens.validate_at(&token, TokenKind::Access, at_expiry),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn foreign_signature_and_garbage_are_invalid() {
        let ours = authority();
        let theirs = TokenAuthority::new("someone-else");
        let forged = theirs.issue(1, TokenKind::Access).unwrap();

        assert!(matches!(
            ours.validate(&forged, TokenKind::Access),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(
            ours.validate("not.a.jwt", TokenKind::Access),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(ours.validate("", TokenKind::Access), Err(TokenError::Invalid)));
    }

    #[test]
    fn same_second_tokens_are_distinct() {
        let tokens = authority();
        let a = tokens.issue(1, TokenKind::Refresh).unwrap();
        let b = tokens.issue(1, TokenKind::Refresh).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn refresh_mints_access_for_same_subject() {
        let (_dir, db) = temp_db();
        let tokens = authority();
        let pair = tokens.issue_pair(3).unwrap();

        let access = tokens.refresh(&db, &pair.refresh_token).unwrap();
        let claims = tokens.validate(&access, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "3");
    }

    #[test]
    fn refresh_rejects_access_tokens_and_expired_tokens() {
        let (_dir, db) = temp_db();
        let tokens = authority();
        let pair = tokens.issue_pair(3).unwrap();
        assert!(matches!(
            tokens.refresh(&db, &pair.access_token),
            Err(TokenError::WrongIssuer { .. })
        ));

        let stale = authority()
            .with_ttls(Duration::hours(1), Duration::seconds(-1))
            .issue(3, TokenKind::Refresh)
            .unwrap();
        assert!(matches!(tokens.refresh(&db, &stale), Err(TokenError::Expired)));
    }

    #[test]
    fn revocation_only_affects_that_token() {
        let (_dir, db) = temp_db();
        let tokens = authority();
        let first = tokens.issue_pair(5).unwrap();
        let second = tokens.issue_pair(5).unwrap();

        let entry = tokens.revoke(&db, &first.refresh_token).unwrap();
        assert_eq!(entry.token_id, first.refresh_token);

        assert!(matches!(
            tokens.refresh(&db, &first.refresh_token),
            Err(TokenError::Revoked)
        ));
        assert!(tokens.refresh(&db, &second.refresh_token).is_ok());
        // Access tokens are not consulted against the denylist.
        assert!(tokens.validate(&first.access_token, TokenKind::Access).is_ok());
    }

    #[test]
    fn revoke_requires_refresh_token() {
        let (_dir, db) = temp_db();
        let tokens = authority();
        let pair = tokens.issue_pair(5).unwrap();

        assert!(matches!(
            tokens.revoke(&db, &pair.access_token),
            Err(TokenError::WrongIssuer { .. })
        ));
        assert!(matches!(tokens.revoke(&db, "junk"), Err(TokenError::Invalid)));
        assert!(db.load().unwrap().revoked_tokens.is_empty());
    }
}
