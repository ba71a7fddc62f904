//! Saved content routes.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use socialpulse_shared::{NewSavedContent, SavedContent};

use super::{parse_positive, UserFilter};
use crate::error::{parse_id, ApiProblem, ApiResult};
use crate::state::AppState;

pub const DEFAULT_TOP_LIMIT: usize = 3;

#[derive(Debug, Default, Deserialize)]
pub struct TopContentQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub limit: Option<String>,
}

/// List saved content
pub async fn list_saved_content(
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Json<Vec<SavedContent>>> {
    Ok(Json(state.storage.get_saved_content(filter.user_id()).await?))
}

/// Highest-engagement saved content
pub async fn top_content(
    State(state): State<AppState>,
    Query(query): Query<TopContentQuery>,
) -> ApiResult<Json<Vec<SavedContent>>> {
    let user_id = parse_positive(query.user_id.as_deref());
    let limit = parse_positive(query.limit.as_deref())
        .map(|l| l as usize)
        .unwrap_or(DEFAULT_TOP_LIMIT);

    Ok(Json(state.storage.get_top_content(user_id, limit).await?))
}

/// Save a piece of content
pub async fn save_content(
    State(state): State<AppState>,
    payload: Result<Json<NewSavedContent>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SavedContent>)> {
    let Json(payload) = payload?;
    payload
        .validate()
        .map_err(|errors| ApiProblem::invalid("content", errors))?;

    let row = state.storage.create_saved_content(payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Remove saved content
pub async fn delete_saved_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "Invalid content ID")?;
    if !state.storage.delete_saved_content(id).await? {
        return Err(ApiProblem::not_found("Content not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
