use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::session;

/// Authenticated user id, inserted as a request extension by `require_access`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub u64);

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    authorization_value(headers, "Bearer ")
}

/// Pull the key out of `Authorization: ApiKey <key>`.
pub fn api_key(headers: &HeaderMap) -> Result<&str, ApiError> {
    authorization_value(headers, "ApiKey ")
}

fn authorization_value<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("authorization header missing".into()))?;

    value
        .strip_prefix(scheme)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized(format!("expected {}authorization", scheme.to_lowercase()))
        })
}

/// Compare a presented key with the configured one without short-circuiting
/// on the first differing byte.
pub fn keys_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Validate an access token from the Authorization header.
pub async fn require_access(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;
    let user_id = session::require_access(&state.tokens, token)?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_and_api_key() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(api_key(&headers("ApiKey f271c81f")).unwrap(), "f271c81f");
    }

    #[test]
    fn rejects_missing_or_mismatched_scheme() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
        assert!(bearer_token(&headers("ApiKey abc")).is_err());
        assert!(bearer_token(&headers("Bearer ")).is_err());
        assert!(api_key(&headers("Bearer abc")).is_err());
    }

    #[test]
    fn keys_match_only_on_identical_input() {
        assert!(keys_match("f271c81f", "f271c81f"));
        assert!(!keys_match("f271c81e", "f271c81f"));
        assert!(!keys_match("f271c81", "f271c81f"));
        assert!(!keys_match("", "f271c81f"));
    }
}
