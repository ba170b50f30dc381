// Server module - router assembly shared by main.rs and the integration tests

use axum::Router;
use axum::http::HeaderValue;
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::api_docs::ApiDoc;
use crate::domain::MEDIA_URL;
use crate::infrastructure::AppState;
use crate::infrastructure::config::Config;

/// Build the full application router: API, Swagger UI and media files
pub fn build_router(db: DatabaseConnection, config: &Config) -> Router {
    build_router_with_state(AppState::new(db, config), config)
}

pub fn build_router_with_state(state: AppState, config: &Config) -> Router {
    let media_root = state.media.root().to_path_buf();

    Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api::api_router(state))
        .nest_service(MEDIA_URL, ServeDir::new(media_root))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let mut allowed = Vec::new();
    for origin in origins {
        match origin.parse::<HeaderValue>() {
            Ok(v) => allowed.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Periodically forget sessions idle for longer than `idle`
pub fn spawn_session_pruner(state: &AppState, idle: Duration) {
    let views = state.views.clone();
    let period = (idle / 4).max(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let pruned = views.prune_idle(idle);
            if pruned > 0 {
                tracing::debug!("Pruned {} idle sessions", pruned);
            }
        }
    });
}
