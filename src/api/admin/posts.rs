use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use super::Upload;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::{PostDetail, PostInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AdminUser;
use crate::services::media::MediaKind;

/// Any status, so editors can preview drafts
pub async fn get_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<PostDetail>> {
    state
        .post_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Post"))
}

/// The author defaults to the logged-in editor
pub async fn create_post(
    AdminUser(claims): AdminUser,
    State(state): State<AppState>,
    Json(mut input): Json<PostInput>,
) -> ApiResult<(StatusCode, Json<PostDetail>)> {
    input.author_id = input.author_id.or(Some(claims.uid));
    let post = state.post_repo.create(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<PostInput>,
) -> ApiResult<Json<PostDetail>> {
    Ok(Json(state.post_repo.update(id, input).await?))
}

pub async fn delete_post(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    if let Some(preview) = state.post_repo.delete(id).await? {
        state.media.remove(&preview).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_preview(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<Json<PostDetail>> {
    if state.post_repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found("Post"));
    }

    let upload = Upload::read(multipart).await?;
    let path = state
        .media
        .store(MediaKind::BlogPreview, &upload.file_name, upload.data)
        .await?;

    if let Some(previous) = state.post_repo.set_preview(id, path).await? {
        state.media.remove(&previous).await;
    }

    state
        .post_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Post"))
}
