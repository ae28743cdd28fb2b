mod config;

use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use chirpy_api::auth::{AppState, AppStateInner};
use chirpy_api::routes::api_router;
use chirpy_api::tokens::TokenAuthority;
use chirpy_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chirpy_server=debug,chirpy_api=debug,chirpy_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    let db = Database::open(&config.db_path)?;
    let tokens =
        TokenAuthority::new(&config.jwt_secret).with_ttls(config.access_ttl, config.refresh_ttl);

    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens,
        polka_key: config.polka_key.clone(),
    });

    let api = api_router(state).route("/healthz", get(healthz));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", api)
        .nest_service("/app", ServeDir::new(&config.fileserver_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!(
        "Serving files from {} on {}",
        config.fileserver_root.display(),
        config.addr
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn healthz() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}
