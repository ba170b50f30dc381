//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{ArtworkRepository, CollectionRepository, PostRepository, TaxonomyRepository};
use crate::infrastructure::config::Config;
use crate::infrastructure::session::ViewTracker;
use crate::infrastructure::{
    SeaOrmArtworkRepository, SeaOrmCollectionRepository, SeaOrmPostRepository,
    SeaOrmTaxonomyRepository,
};
use crate::services::media::MediaStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub artwork_repo: Arc<dyn ArtworkRepository>,
    pub collection_repo: Arc<dyn CollectionRepository>,
    pub post_repo: Arc<dyn PostRepository>,
    pub taxonomy_repo: Arc<dyn TaxonomyRepository>,
    /// Per-session "already viewed" lists
    pub views: ViewTracker,
    pub media: MediaStore,
    pub site_name: Arc<str>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, config: &Config) -> Self {
        Self {
            artwork_repo: Arc::new(SeaOrmArtworkRepository::new(db.clone())),
            collection_repo: Arc::new(SeaOrmCollectionRepository::new(db.clone())),
            post_repo: Arc::new(SeaOrmPostRepository::new(db.clone())),
            taxonomy_repo: Arc::new(SeaOrmTaxonomyRepository::new(db.clone())),
            views: ViewTracker::new(),
            media: MediaStore::new(config.media_root.clone(), config.image_max_dimension),
            site_name: Arc::from(config.site_name.as_str()),
            max_upload_bytes: config.max_upload_bytes,
            db,
        }
    }

    /// Database connection, for handlers that work on entities directly (auth)
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
