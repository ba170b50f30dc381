use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use super::Upload;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::{ArtworkDetail, ArtworkInput, ImageDto, ImageUpdate, NewImage};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AdminUser;
use crate::services::media::MediaKind;

pub async fn get_artwork(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ArtworkDetail>> {
    state
        .artwork_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Artwork"))
}

pub async fn create_artwork(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(input): Json<ArtworkInput>,
) -> ApiResult<(StatusCode, Json<ArtworkDetail>)> {
    let artwork = state.artwork_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(artwork)))
}

pub async fn update_artwork(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<ArtworkInput>,
) -> ApiResult<Json<ArtworkDetail>> {
    Ok(Json(state.artwork_repo.update(id, input).await?))
}

pub async fn delete_artwork(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    for path in state.artwork_repo.delete(id).await? {
        state.media.remove(&path).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_images(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Vec<ImageDto>>> {
    if state.artwork_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Artwork"));
    }
    Ok(Json(state.artwork_repo.images(id).await?))
}

/// Multipart: `file`, optional `order` and `is_primary`
pub async fn upload_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ImageDto>)> {
    if state.artwork_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Artwork"));
    }

    let upload = Upload::read(multipart).await?;
    let order = match upload.field("order") {
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::Validation(format!("order must be an integer, got {}", raw)))?,
        None => 0,
    };
    let is_primary = upload.flag("is_primary");

    let path = state
        .media
        .store(MediaKind::Artwork, &upload.file_name, upload.data)
        .await?;

    let image = NewImage {
        path: path.clone(),
        order,
        is_primary,
    };
    match state.artwork_repo.add_image(id, image).await {
        Ok(image) => Ok((StatusCode::CREATED, Json(image))),
        Err(e) => {
            state.media.remove(&path).await;
            Err(e.into())
        }
    }
}

pub async fn update_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(update): Json<ImageUpdate>,
) -> ApiResult<Json<ImageDto>> {
    Ok(Json(state.artwork_repo.update_image(id, update).await?))
}

pub async fn delete_image(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let path = state.artwork_repo.delete_image(id).await?;
    state.media.remove(&path).await;
    Ok(StatusCode::NO_CONTENT)
}
