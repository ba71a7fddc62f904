//! Activity feed routes.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use socialpulse_shared::{Activity, NewActivity};

use super::UserFilter;
use crate::error::{ApiProblem, ApiResult};
use crate::state::AppState;

/// List activities, newest first
pub async fn list_activities(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Json<Vec<Activity>>> {
    Ok(Json(state.storage.get_activities(filter.user_id()).await?))
}

/// Append an activity to the feed
pub async fn create_activity(
    State(state): State<AppState>,
    payload: Result<Json<NewActivity>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Activity>)> {
    let Json(payload) = payload?;
    payload
        .validate()
        .map_err(|errors| ApiProblem::invalid("activity", errors))?;

    let row = state.storage.create_activity(payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}
