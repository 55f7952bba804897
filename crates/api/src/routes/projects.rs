//! Project CRUD routes
//!
//! All handlers run behind [`crate::auth::require_auth`] and operate on the
//! caller's own projects only.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    http::StatusCode,
    Json,
};
use projects_shared::{Project, ProjectInput, ProjectUpdate};

use super::auth::{IdResponse, MessageResponse};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdResponse>)> {
    let Json(input) = payload?;
    if input.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let id = state.projects.create(auth_user.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = state.projects.list(auth_user.user_id).await?;
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Project>> {
    let Path(id) = id?;
    let project = state.projects.get(auth_user.user_id, id).await?;
    Ok(Json(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProjectUpdate>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(update) = payload?;

    if update.is_empty() {
        return Err(ApiError::Validation(
            "Update has no values".to_string(),
        ));
    }
    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::Validation("Title must not be empty".to_string()));
    }

    state.projects.update(auth_user.user_id, id, update).await?;
    Ok(Json(MessageResponse::ok()))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    state.projects.delete(auth_user.user_id, id).await?;
    Ok(Json(MessageResponse::ok()))
}
