use crate::dto::{ErrorResponse, PauseRequest};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Duration;
use tracing::{error, instrument};

#[instrument(skip(state), name = "api_pause")]
pub async fn pause(State(state): State<AppState>, Json(request): Json<PauseRequest>) -> Response {
    match state.pause.execute(Duration::from_secs(request.duration_secs)).await {
        Ok(()) => Json(json!({ "paused": true, "duration_secs": request.duration_secs })).into_response(),
        Err(e) => {
            error!(error = %e, "pause request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

#[instrument(skip(state), name = "api_resume")]
pub async fn resume(State(state): State<AppState>) -> Response {
    match state.resume.execute().await {
        Ok(()) => Json(json!({ "paused": false })).into_response(),
        Err(e) => {
            error!(error = %e, "resume request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

#[instrument(skip(state), name = "api_refresh_rules")]
pub async fn refresh_rules(State(state): State<AppState>) -> Response {
    match state.refresh_rules.execute().await {
        Ok(()) => Json(json!({ "triggered": true })).into_response(),
        Err(e) => {
            error!(error = %e, "refresh-rules request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

#[instrument(skip(state), name = "api_clear_cache")]
pub async fn clear_cache(State(state): State<AppState>) -> Response {
    match state.clear_cache.execute().await {
        Ok(outcome) => Json(json!({ "dns_entries_cleared": outcome.dns_entries_cleared, "cert_entries_cleared": outcome.cert_entries_cleared })).into_response(),
        Err(e) => {
            error!(error = %e, "clear-cache request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}
