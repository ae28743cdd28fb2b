use thiserror::Error;
use tracing::{info, warn};

use chirpy_db::password::{verify_against_dummy, verify_password};
use chirpy_db::{Database, DbError, User};

use crate::tokens::{TokenAuthority, TokenError, TokenKind, TokenPair, subject_id};

#[derive(Debug, Error)]
pub enum SessionError {
    /// Deliberately the same for an unknown email and a wrong password.
    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] DbError),
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

/// Verify credentials and hand out a fresh access/refresh pair.
pub fn login(
    db: &Database,
    tokens: &TokenAuthority,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, SessionError> {
    let user = match db.get_user_by_email(email) {
        Ok(user) => user,
        Err(DbError::NotFound(_)) => {
            verify_against_dummy(password);
            warn!("Login failed: unknown account");
            return Err(SessionError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(password, &user.password_hash) {
        warn!("Login failed for user {}", user.id);
        return Err(SessionError::InvalidCredentials);
    }

    let pair = tokens.issue_pair(user.id)?;
    info!("User {} logged in", user.id);

    Ok(LoginOutcome { user, tokens: pair })
}

/// Gate for operations that need an authenticated user.
pub fn require_access(tokens: &TokenAuthority, token: &str) -> Result<u64, TokenError> {
    let claims = tokens.validate(token, TokenKind::Access)?;
    subject_id(&claims)
}
