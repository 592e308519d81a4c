//! Axum router configuration with middleware.
//!
//! All API routes are under `/api/v1/`.
//! Middleware: CORS, tracing.
//!
//! When `[server] web_dir` points at a built widget bundle, it is served at
//! `/`; API routes and `/health` take priority and unknown paths fall through
//! to the bundle's `index.html`.

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/sessions", post(handlers::session::open_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::close_session),
        )
        .route("/sessions/{id}/visitor", put(handlers::session::update_visitor))
        .route("/sessions/{id}/intake", post(handlers::session::submit_intake))
        .route("/sessions/{id}/messages", post(handlers::session::send_message));

    let web_dir = state.config.server.web_dir.clone();

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(web_dir) = web_dir.filter(|dir| std::path::Path::new(dir).exists()) {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "Widget static file serving enabled");
    }

    router
}

/// GET /health
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
