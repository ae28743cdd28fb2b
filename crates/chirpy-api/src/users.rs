use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use chirpy_db::User;
use chirpy_types::api::{UserRequest, UserResponse};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::AuthUser;

fn validate(req: &UserRequest) -> Result<(), ApiError> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("password must not be empty".into()));
    }
    Ok(())
}

fn to_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate(&req)?;

    let user = blocking(move || {
        state
            .db
            .create_user(&req.email, &req.password)
            .map_err(ApiError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(req) = payload?;
    validate(&req)?;

    let user = blocking(move || {
        state
            .db
            .update_user(user_id, &req.email, &req.password)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(Json(to_response(user)))
}
