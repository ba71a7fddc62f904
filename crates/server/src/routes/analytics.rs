//! Analytics routes.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use socialpulse_shared::{Analytics, NewAnalytics};

use super::UserFilter;
use crate::error::{ApiProblem, ApiResult};
use crate::state::AppState;

/// List analytics snapshots, optionally for one user
pub async fn list_analytics(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Json<Vec<Analytics>>> {
    Ok(Json(state.storage.get_analytics(filter.user_id()).await?))
}

/// Record an analytics snapshot
pub async fn create_analytics(
    State(state): State<AppState>,
    payload: Result<Json<NewAnalytics>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Analytics>)> {
    let Json(payload) = payload?;
    payload
        .validate()
        .map_err(|errors| ApiProblem::invalid("analytics", errors))?;

    let row = state.storage.create_analytics(payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}
