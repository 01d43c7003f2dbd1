//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - challenge endpoints under `/api/challenges/...`
/// - user profile at `/api/user`, stats and history under `/api/user/...`
/// - static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        // Challenges
        .route("/api/challenges", get(http::http_get_challenges))
        .route("/api/challenges/complete", post(http::http_post_complete))
        .route("/api/challenges/feedback", post(http::http_post_feedback))
        .route("/api/challenges/setting-goal", post(http::http_post_setting_goal))
        // User
        .route("/api/user", get(http::http_get_user).put(http::http_put_user))
        .route("/api/user/stats", get(http::http_get_stats))
        .route("/api/user/stats/:user_id", get(http::http_get_user_stats))
        .route("/api/user/dashboard", get(http::http_get_dashboard))
        .route("/api/user/history", get(http::http_get_history))
        .route("/api/user/pp-history", get(http::http_get_pp_history))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
