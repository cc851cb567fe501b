use crate::dto::{BlockedEventResponse, StatisticsResponse};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

#[instrument(skip(state), name = "api_get_statistics")]
pub async fn get_statistics(State(state): State<AppState>) -> Json<StatisticsResponse> {
    Json(state.get_statistics.execute().into())
}

#[derive(Deserialize)]
pub struct RecentBlockedQuery {
    limit: Option<usize>,
}

const DEFAULT_RECENT_BLOCKED: usize = 20;

/// The use case clamps the limit to a small ceiling, so a caller-supplied
/// value is never trusted verbatim.
#[instrument(skip(state), name = "api_get_recent_blocked")]
pub async fn get_recent_blocked(State(state): State<AppState>, Query(query): Query<RecentBlockedQuery>) -> Json<Vec<BlockedEventResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_BLOCKED);
    Json(state.get_recent_blocked.execute(limit).into_iter().map(Into::into).collect())
}
