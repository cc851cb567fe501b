use crate::dto::StatusResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use tracing::instrument;

#[instrument(skip(state), name = "api_get_status")]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::from(state.get_status.execute()))
}
