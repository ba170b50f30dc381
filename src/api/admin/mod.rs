//! Editor endpoints, all behind the admin role

pub mod artworks;
pub mod collections;
pub mod posts;
pub mod taxonomy;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart},
    routing::{get, post, put},
};
use std::collections::HashMap;

use super::error::{ApiError, ApiResult};
use crate::infrastructure::AppState;

pub fn admin_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // Vocabularies
        .route(
            "/categories",
            get(taxonomy::list_categories).post(taxonomy::create_category),
        )
        .route("/categories/:id", axum::routing::delete(taxonomy::delete_category))
        .route("/themes", get(taxonomy::list_themes).post(taxonomy::create_theme))
        .route("/themes/:id", axum::routing::delete(taxonomy::delete_theme))
        // Collections
        .route("/collections", post(collections::create_collection))
        .route(
            "/collections/:id",
            get(collections::get_collection)
                .put(collections::update_collection)
                .delete(collections::delete_collection),
        )
        .route("/collections/:id/cover", post(collections::upload_cover))
        // Artworks
        .route("/artworks", post(artworks::create_artwork))
        .route(
            "/artworks/:id",
            get(artworks::get_artwork)
                .put(artworks::update_artwork)
                .delete(artworks::delete_artwork),
        )
        .route(
            "/artworks/:id/images",
            get(artworks::list_images).post(artworks::upload_image),
        )
        .route(
            "/images/:id",
            put(artworks::update_image).delete(artworks::delete_image),
        )
        // Blog
        .route("/posts", post(posts::create_post))
        .route(
            "/posts/:id",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/:id/preview", post(posts::upload_preview))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// A multipart form with one `file` part and plain text fields
pub struct Upload {
    pub file_name: String,
    pub data: Vec<u8>,
    pub fields: HashMap<String, String>,
}

impl Upload {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut file: Option<(String, Vec<u8>)> = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Could not read file: {}", e)))?;
                file = Some((file_name, data.to_vec()));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Could not read field {}: {}", name, e)))?;
                fields.insert(name, value);
            }
        }

        let (file_name, data) = file
            .filter(|(_, data)| !data.is_empty())
            .ok_or_else(|| ApiError::Validation("A non-empty `file` part is required".into()))?;

        Ok(Self {
            file_name,
            data,
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.field(name), Some("true" | "1" | "on" | "yes"))
    }
}
