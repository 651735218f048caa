use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, magnet, middleware::metrics_middleware, search, sessions};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Searcher
        .route("/search", post(search::search))
        .route("/categories", get(search::list_categories))
        .route("/searcher/status", get(search::get_status))
        .route("/sort-keys", get(search::list_sort_keys))
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/{id}/sort", post(sessions::sort_session))
        .route("/sessions/{id}/refresh", post(sessions::refresh_session))
        .route(
            "/sessions/{id}/records/{record_id}/magnet",
            get(sessions::get_record_magnet),
        )
        // Magnet utilities
        .route("/magnet/parse", post(magnet::parse));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
