use axum::{Json, extract::State};
use axum_extra::extract::Query;

use super::error::ApiResult;
use crate::infrastructure::AppState;
use crate::services::showcase::{
    self, AboutPage, ContactPage, HomePage, Navigation, SearchPage, SearchParams,
};

#[utoipa::path(get, path = "/api/home", responses((status = 200, description = "Home page showcase")))]
pub async fn home(State(state): State<AppState>) -> ApiResult<Json<HomePage>> {
    Ok(Json(showcase::home(&state).await?))
}

#[utoipa::path(get, path = "/api/about", responses((status = 200, description = "About page works")))]
pub async fn about(State(state): State<AppState>) -> ApiResult<Json<AboutPage>> {
    Ok(Json(showcase::about(&state).await?))
}

#[utoipa::path(get, path = "/api/contact", responses((status = 200, description = "Contact page works and posts")))]
pub async fn contact(State(state): State<AppState>) -> ApiResult<Json<ContactPage>> {
    Ok(Json(showcase::contact(&state).await?))
}

#[utoipa::path(get, path = "/api/navigation", responses((status = 200, description = "Site navigation")))]
pub async fn navigation(State(state): State<AppState>) -> ApiResult<Json<Navigation>> {
    Ok(Json(showcase::navigation(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(("q" = Option<String>, Query, description = "Search text")),
    responses((status = 200, description = "Artworks, collections and posts matching the text"))
)]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage>> {
    Ok(Json(showcase::search(&state, params).await?))
}
