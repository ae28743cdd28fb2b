use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::{self, AppState};
use crate::messages;
use crate::middleware::require_access;
use crate::users;
use crate::validate;
use crate::webhooks;

/// Every `/api` route. Cross-cutting layers (CORS, tracing, static files)
/// are the server's business.
pub fn api_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/chirps", get(messages::list_chirps))
        .route("/chirps/{id}", get(messages::get_chirp))
        .route("/users", post(users::create_user))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/revoke", post(auth::revoke))
        .route("/polka/webhooks", post(webhooks::polka_webhook))
        .route("/validate_chirp", post(validate::validate_chirp));

    let protected_routes = Router::new()
        .route("/chirps", post(messages::create_chirp))
        .route("/chirps/{id}", delete(messages::delete_chirp))
        .route("/users", put(users::update_user))
        .layer(middleware::from_fn_with_state(state.clone(), require_access));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
