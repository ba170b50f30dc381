pub mod admin;
pub mod auth;
pub mod blog;
pub mod catalog;
pub mod collections;
pub mod error;
pub mod health;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Showcase pages
        .route("/home", get(pages::home))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/navigation", get(pages::navigation))
        .route("/search", get(pages::search))
        // Catalog
        .route("/catalog", get(catalog::catalog))
        .route("/artworks/:slug", get(catalog::artwork_detail))
        // Collections
        .route("/collections", get(collections::list_collections))
        .route("/collections/:slug", get(collections::collection_detail))
        // Blog
        .route("/blog", get(blog::list_posts))
        .route("/blog/:slug", get(blog::post_detail))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/me", get(auth::me))
        // Editors
        .nest("/admin", admin::admin_router(max_upload_bytes))
        .with_state(state)
}
