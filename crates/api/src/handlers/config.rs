use crate::dto::{ConfigResponse, ConfigUpdateRequest, ErrorResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dnshield_application::ports::ConfigUpdate;
use tracing::{error, instrument};

#[instrument(skip(state), name = "api_get_config")]
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse(state.get_config.execute()))
}

#[instrument(skip(state), name = "api_update_config")]
pub async fn update_config(State(state): State<AppState>, Json(patch): Json<ConfigUpdateRequest>) -> Response {
    let update = ConfigUpdate {
        allow_pause: patch.allow_pause,
        allow_quit: patch.allow_quit,
        policy_url: patch.policy_url,
        update_interval_secs: patch.update_interval_secs,
    };
    match state.update_config.execute(update).await {
        Ok(config) => Json(ConfigResponse(config)).into_response(),
        Err(e) => {
            error!(error = %e, "config update rejected");
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}
