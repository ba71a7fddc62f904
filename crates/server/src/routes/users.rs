//! User routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use socialpulse_shared::{NewUser, UpdateUser, User};

use crate::error::{parse_id, ApiProblem, ApiResult};
use crate::password::hash_password;
use crate::state::AppState;

fn hash(password: &str) -> ApiResult<String> {
    hash_password(password).map_err(|e| {
        tracing::error!("Hashing error: {e}");
        ApiProblem::internal("Internal server error")
    })
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.storage.list_users().await?))
}

/// Get a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "Invalid user ID")?;
    state
        .storage
        .get_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiProblem::not_found("User not found"))
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(payload) = payload?;
    payload
        .validate()
        .map_err(|errors| ApiProblem::invalid("user", errors))?;

    if state.storage.get_user_by_username(&payload.username).await?.is_some() {
        return Err(ApiProblem::conflict("Username already taken"));
    }
    if state.storage.get_user_by_email(&payload.email).await?.is_some() {
        return Err(ApiProblem::conflict("Email already registered"));
    }

    tracing::info!("Creating user: {}", payload.username);
    let password_hash = hash(&payload.password)?;
    let user = state.storage.create_user(payload, password_hash).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Partially update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = parse_id(&id, "Invalid user ID")?;
    let Json(payload) = payload?;
    payload
        .validate()
        .map_err(|errors| ApiProblem::invalid("user", errors))?;

    let password_hash = payload.password.as_deref().map(hash).transpose()?;
    state
        .storage
        .update_user(id, payload, password_hash)
        .await?
        .map(Json)
        .ok_or_else(|| ApiProblem::not_found("User not found"))
}
