use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::Query;
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use crate::domain::pagination::{DEFAULT_PER_PAGE, PageRequest, last_value};
use crate::domain::{CollectionPage, CollectionsOverview};
use crate::infrastructure::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/collections",
    responses(
        (status = 200, description = "All collections with artwork counts")
    )
)]
pub async fn list_collections(State(state): State<AppState>) -> ApiResult<Json<CollectionsOverview>> {
    Ok(Json(state.collection_repo.overview().await?))
}

#[utoipa::path(
    get,
    path = "/api/collections/{slug}",
    params(
        ("slug" = String, Path, description = "Collection slug"),
        ("page" = Option<String>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "Collection with its artworks"),
        (status = 404, description = "Unknown slug", body = super::error::ErrorBody)
    )
)]
pub async fn collection_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<CollectionPage>> {
    let page = PageRequest::new(DEFAULT_PER_PAGE, last_value(params.page));
    state
        .collection_repo
        .page_by_slug(&slug, &page)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Collection"))
}
