use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::{CookieJar, Query};

use super::error::ApiResult;
use crate::infrastructure::AppState;
use crate::infrastructure::session::ensure_session;
use crate::services::blog_service::{self, BlogListPage, BlogListParams, PostPage};

#[utoipa::path(
    get,
    path = "/api/blog",
    params(
        ("q" = Option<String>, Query, description = "Free-text search"),
        ("tag" = Option<String>, Query, description = "Tag filter"),
        ("page" = Option<String>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "Published posts with sidebar data")
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<BlogListParams>,
) -> ApiResult<Json<BlogListPage>> {
    Ok(Json(blog_service::blog_list(&state, params).await?))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Published post with similar posts"),
        (status = 404, description = "Unknown or unpublished slug", body = super::error::ErrorBody)
    )
)]
pub async fn post_detail(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> ApiResult<(CookieJar, Json<PostPage>)> {
    let (jar, session_id) = ensure_session(jar);
    let page = blog_service::post_page(&state, &session_id, &slug).await?;
    Ok((jar, Json(page)))
}
