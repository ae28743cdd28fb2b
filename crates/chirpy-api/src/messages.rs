use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use chirpy_db::Message;
use chirpy_types::api::{ChirpResponse, CreateChirpRequest};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::validate::clean_body;

fn to_response(message: Message) -> ChirpResponse {
    ChirpResponse {
        id: message.id,
        author_id: message.author_id,
        body: message.body,
    }
}

pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(AuthUser(author_id)): Extension<AuthUser>,
    payload: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let body = clean_body(&req.body);

    let message = blocking(move || {
        state
            .db
            .create_message(author_id, &body)
            .map_err(ApiError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(message))))
}

pub async fn list_chirps(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChirpResponse>>, ApiError> {
    let messages = blocking(move || state.db.list_messages().map_err(ApiError::from)).await?;
    Ok(Json(messages.into_iter().map(to_response).collect()))
}

/// `position` is 1-based within the listing order, not a chirp id.
pub async fn get_chirp(
    State(state): State<AppState>,
    position: Result<Path<u64>, PathRejection>,
) -> Result<Json<ChirpResponse>, ApiError> {
    let Path(position) = position?;
    let message =
        blocking(move || state.db.message_at(position).map_err(ApiError::from)).await?;
    Ok(Json(to_response(message)))
}

pub async fn delete_chirp(
    State(state): State<AppState>,
    Extension(AuthUser(requester_id)): Extension<AuthUser>,
    message_id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(message_id) = message_id?;
    blocking(move || {
        state
            .db
            .delete_message(requester_id, message_id)
            .map_err(ApiError::from)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
