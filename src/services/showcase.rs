//! Home, about, contact, navigation and site-wide search
//!
//! Blog content on these pages is optional: a failing post query is logged
//! and rendered as an empty list.

use serde::{Deserialize, Serialize};

use crate::domain::pagination::last_value;
use crate::domain::size::SizeBucket;
use crate::domain::{
    ArtworkCard, CollectionSummary, DomainError, PostCard, ShowcasePick,
};
use crate::infrastructure::AppState;

/// Category ids featured on the home page
pub const OIL_CATEGORY_ID: i32 = 1;
pub const PASTEL_CATEGORY_ID: i32 = 2;

const HOME_POPULAR: u64 = 3;
const HOME_POSTS: u64 = 4;
const PAGE_POPULAR: u64 = 12;
const NAVIGATION_COLLECTIONS: u64 = 5;
const SEARCH_ARTWORKS: u64 = 20;
const SEARCH_COLLECTIONS: u64 = 10;
const SEARCH_POSTS: u64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub site_name: String,
    pub popular_artworks: Vec<ArtworkCard>,
    pub oil_artwork: Option<ArtworkCard>,
    pub pastel_artwork: Option<ArtworkCard>,
    pub small_artwork: Option<ArtworkCard>,
    pub large_artwork: Option<ArtworkCard>,
    pub latest_posts: Vec<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutPage {
    pub popular_artworks: Vec<ArtworkCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactPage {
    pub popular_artworks: Vec<ArtworkCard>,
    pub popular_posts: Vec<PostCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Navigation {
    pub site_name: String,
    pub collections: Vec<CollectionSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub query: String,
    pub artworks: Vec<ArtworkCard>,
    pub collections: Vec<CollectionSummary>,
    pub posts: Vec<PostCard>,
    pub artworks_count: usize,
    pub collections_count: usize,
    pub posts_count: usize,
    pub total_artworks: u64,
    pub total_collections: u64,
    pub total_posts: u64,
}

fn or_empty<T>(result: Result<Vec<T>, DomainError>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!("Blog data unavailable for {}: {}", what, e);
        Vec::new()
    })
}

pub async fn home(state: &AppState) -> Result<HomePage, DomainError> {
    let artworks = &state.artwork_repo;

    Ok(HomePage {
        site_name: state.site_name.to_string(),
        popular_artworks: artworks.most_viewed(HOME_POPULAR).await?,
        oil_artwork: artworks
            .random_pick(ShowcasePick::Category(OIL_CATEGORY_ID))
            .await?,
        pastel_artwork: artworks
            .random_pick(ShowcasePick::Category(PASTEL_CATEGORY_ID))
            .await?,
        small_artwork: artworks
            .random_pick(ShowcasePick::Size(SizeBucket::Small))
            .await?,
        large_artwork: artworks
            .random_pick(ShowcasePick::Size(SizeBucket::Large))
            .await?,
        latest_posts: or_empty(state.post_repo.latest_created(HOME_POSTS).await, "home"),
    })
}

pub async fn about(state: &AppState) -> Result<AboutPage, DomainError> {
    Ok(AboutPage {
        popular_artworks: state.artwork_repo.most_viewed(PAGE_POPULAR).await?,
    })
}

pub async fn contact(state: &AppState) -> Result<ContactPage, DomainError> {
    Ok(ContactPage {
        popular_artworks: state.artwork_repo.most_viewed(PAGE_POPULAR).await?,
        popular_posts: or_empty(state.post_repo.most_viewed(PAGE_POPULAR).await, "contact"),
    })
}

pub async fn navigation(state: &AppState) -> Result<Navigation, DomainError> {
    Ok(Navigation {
        site_name: state.site_name.to_string(),
        collections: state.collection_repo.navigation(NAVIGATION_COLLECTIONS).await?,
    })
}

pub async fn search(state: &AppState, params: SearchParams) -> Result<SearchPage, DomainError> {
    let query = last_value(params.q).unwrap_or_default().trim().to_string();

    let (artworks, collections, posts) = if query.is_empty() {
        (Vec::new(), Vec::new(), Vec::new())
    } else {
        (
            state.artwork_repo.search(&query, SEARCH_ARTWORKS).await?,
            state.collection_repo.search(&query, SEARCH_COLLECTIONS).await?,
            or_empty(state.post_repo.search(&query, SEARCH_POSTS).await, "search"),
        )
    };

    let total_posts = state.post_repo.count_published().await.unwrap_or_else(|e| {
        tracing::warn!("Blog data unavailable for search totals: {}", e);
        0
    });

    Ok(SearchPage {
        artworks_count: artworks.len(),
        collections_count: collections.len(),
        posts_count: posts.len(),
        total_artworks: state.artwork_repo.count_all().await?,
        total_collections: state.collection_repo.count_all().await?,
        total_posts,
        query,
        artworks,
        collections,
        posts,
    })
}
