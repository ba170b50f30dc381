use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use super::Upload;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::{CollectionInput, CollectionSummary};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AdminUser;
use crate::services::media::MediaKind;

pub async fn get_collection(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<CollectionSummary>> {
    state
        .collection_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Collection"))
}

pub async fn create_collection(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CollectionInput>,
) -> ApiResult<(StatusCode, Json<CollectionSummary>)> {
    let collection = state.collection_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn update_collection(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<CollectionInput>,
) -> ApiResult<Json<CollectionSummary>> {
    Ok(Json(state.collection_repo.update(id, input).await?))
}

/// Artworks of the collection stay, detached
pub async fn delete_collection(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    if let Some(cover) = state.collection_repo.delete(id).await? {
        state.media.remove(&cover).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_cover(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<Json<CollectionSummary>> {
    if state.collection_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Collection"));
    }

    let upload = Upload::read(multipart).await?;
    let path = state
        .media
        .store(MediaKind::Collection, &upload.file_name, upload.data)
        .await?;

    if let Some(previous) = state.collection_repo.set_cover(id, path).await? {
        state.media.remove(&previous).await;
    }

    state
        .collection_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Collection"))
}
