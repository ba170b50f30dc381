use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::domain::NamedRef;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AdminUser;

#[derive(Debug, Deserialize)]
pub struct NameInput {
    pub name: String,
}

pub async fn list_categories(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<NamedRef>>> {
    Ok(Json(state.taxonomy_repo.list_categories().await?))
}

pub async fn create_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<NameInput>,
) -> ApiResult<(StatusCode, Json<NamedRef>)> {
    let category = state.taxonomy_repo.create_category(input.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.taxonomy_repo.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_themes(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<NamedRef>>> {
    Ok(Json(state.taxonomy_repo.list_themes().await?))
}

pub async fn create_theme(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<NameInput>,
) -> ApiResult<(StatusCode, Json<NamedRef>)> {
    let theme = state.taxonomy_repo.create_theme(input.name).await?;
    Ok((StatusCode::CREATED, Json(theme)))
}

pub async fn delete_theme(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.taxonomy_repo.delete_theme(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
