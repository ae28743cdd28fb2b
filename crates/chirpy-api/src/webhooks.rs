use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use chirpy_types::webhooks::{MembershipResponse, USER_UPGRADED, WebhookEvent};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::{api_key, keys_match};

/// Payment-provider callback. Only `user.upgraded` changes anything; every
/// other event is acknowledged so the provider stops retrying.
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<WebhookEvent>, JsonRejection>,
) -> Result<Response, ApiError> {
    if !keys_match(api_key(&headers)?, &state.polka_key) {
        warn!("Webhook call with a bad API key");
        return Err(ApiError::Unauthorized("invalid API key".into()));
    }

    let Json(event) = payload?;
    if event.event != USER_UPGRADED {
        debug!("Ignoring webhook event {}", event.event);
        return Ok(StatusCode::OK.into_response());
    }

    let user_id = event
        .data
        .map(|data| data.user_id)
        .ok_or_else(|| ApiError::BadRequest("missing data.user_id".into()))?;
    let user = blocking(move || state.db.set_membership(user_id, true).map_err(ApiError::from)).await?;

    Ok((
        StatusCode::CREATED,
        Json(MembershipResponse {
            is_chirpy_red: user.membership,
        }),
    )
        .into_response())
}
