use crate::handlers;
use crate::middleware::{rate_limit, require_admin, require_operator, require_view};
use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::{middleware, Router};

/// Builds the full admin-API router. Callers must serve this
/// with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// rate-limit layer can read the client's address, and must bind only
/// to loopback — enforced separately by `AppConfig::validate`.
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/status", get(handlers::get_status).route_layer(middleware::from_fn_with_state(state.clone(), require_view)))
        .route("/api/statistics", get(handlers::get_statistics).route_layer(middleware::from_fn_with_state(state.clone(), require_view)))
        .route("/api/recent-blocked", get(handlers::get_recent_blocked).route_layer(middleware::from_fn_with_state(state.clone(), require_view)))
        .route("/api/config", get(handlers::get_config).route_layer(middleware::from_fn_with_state(state.clone(), require_view)))
        .route(
            "/api/config/update",
            put(handlers::update_config)
                .patch(handlers::update_config)
                .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .route("/api/pause", post(handlers::pause).route_layer(middleware::from_fn_with_state(state.clone(), require_operator)))
        .route("/api/resume", post(handlers::resume).route_layer(middleware::from_fn_with_state(state.clone(), require_operator)))
        .route("/api/refresh-rules", post(handlers::refresh_rules).route_layer(middleware::from_fn_with_state(state.clone(), require_operator)))
        .route("/api/clear-cache", post(handlers::clear_cache).route_layer(middleware::from_fn_with_state(state.clone(), require_operator)))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state)
}
