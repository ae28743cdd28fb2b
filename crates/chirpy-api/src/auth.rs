use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};

use chirpy_db::Database;
use chirpy_types::api::{LoginRequest, LoginResponse, RefreshResponse, RevokeResponse};

use crate::blocking;
use crate::error::ApiError;
use crate::middleware::bearer_token;
use crate::session;
use crate::tokens::TokenAuthority;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenAuthority,
    /// Shared key the payment provider presents on webhook calls.
    pub polka_key: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;

    // Argon2 verification blocks for tens of milliseconds.
    let outcome = blocking(move || {
        session::login(&state.db, &state.tokens, &req.email, &req.password).map_err(ApiError::from)
    })
    .await?;

    Ok(Json(LoginResponse {
        id: outcome.user.id,
        email: outcome.user.email,
        access_token: outcome.tokens.access_token,
        refresh_token: outcome.tokens.refresh_token,
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = bearer_token(&headers)?.to_string();

    let access_token =
        blocking(move || state.tokens.refresh(&state.db, &token).map_err(ApiError::from)).await?;

    Ok(Json(RefreshResponse { access_token }))
}

pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RevokeResponse>, ApiError> {
    let token = bearer_token(&headers)?.to_string();

    let entry =
        blocking(move || state.tokens.revoke(&state.db, &token).map_err(ApiError::from)).await?;

    Ok(Json(RevokeResponse {
        token_id: entry.token_id,
        revoked_at: entry.revoked_at,
    }))
}
