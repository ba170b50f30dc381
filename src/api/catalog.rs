use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::{CookieJar, Query};

use super::error::ApiResult;
use crate::domain::catalog::CatalogParams;
use crate::infrastructure::AppState;
use crate::infrastructure::session::ensure_session;
use crate::services::catalog_service::{self, ArtworkPage, CatalogPage};

/// Filter keys may repeat (`?category=1&category=2`)
#[utoipa::path(
    get,
    path = "/api/catalog",
    params(
        ("q" = Option<String>, Query, description = "Free-text search"),
        ("status" = Option<Vec<String>>, Query, description = "available | sold"),
        ("category" = Option<Vec<i32>>, Query, description = "Category ids"),
        ("theme" = Option<Vec<i32>>, Query, description = "Theme ids"),
        ("collection" = Option<Vec<i32>>, Query, description = "Collection ids"),
        ("size" = Option<Vec<String>>, Query, description = "small | medium | large"),
        ("price_min" = Option<String>, Query, description = "Minimum price"),
        ("price_max" = Option<String>, Query, description = "Maximum price"),
        ("order" = Option<String>, Query, description = "Sort key, e.g. -created_at"),
        ("per_page" = Option<u64>, Query, description = "12, 24 or 48"),
        ("page" = Option<String>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "Filtered catalog page")
    )
)]
pub async fn catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> ApiResult<Json<CatalogPage>> {
    Ok(Json(catalog_service::catalog_page(&state, params).await?))
}

#[utoipa::path(
    get,
    path = "/api/artworks/{slug}",
    params(("slug" = String, Path, description = "Artwork slug")),
    responses(
        (status = 200, description = "Artwork with similar works"),
        (status = 404, description = "Unknown slug", body = super::error::ErrorBody)
    )
)]
pub async fn artwork_detail(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> ApiResult<(CookieJar, Json<ArtworkPage>)> {
    let (jar, session_id) = ensure_session(jar);
    let page = catalog_service::artwork_page(&state, &session_id, &slug).await?;
    Ok((jar, Json(page)))
}
