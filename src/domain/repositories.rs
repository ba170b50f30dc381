//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;
use super::catalog::CatalogQuery;
use super::pagination::{Page, PageRequest};
use super::size::SizeBucket;
use crate::models::{ArtworkStatus, PostStatus};

/// Public URL prefix under which MEDIA_ROOT is served.
pub const MEDIA_URL: &str = "/media";

pub fn media_url(path: &str) -> String {
    format!("{}/{}", MEDIA_URL, path.trim_start_matches('/'))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionRef {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageDto {
    pub id: i32,
    pub artwork_id: i32,
    pub path: String,
    pub url: String,
    pub order: i32,
    pub is_primary: bool,
}

/// Artwork as shown in lists and grids
#[derive(Debug, Clone, Serialize)]
pub struct ArtworkCard {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub status: ArtworkStatus,
    pub status_label: &'static str,
    pub price: Option<i64>,
    pub price_display: String,
    pub width_cm: i32,
    pub height_cm: i32,
    pub dimensions: String,
    pub size_category: SizeBucket,
    pub size_category_label: &'static str,
    pub created_year: i32,
    pub short_description: String,
    pub tags: Vec<String>,
    pub views: i64,
    pub category: Option<NamedRef>,
    pub theme: Option<NamedRef>,
    pub collection: Option<CollectionRef>,
    pub primary_image: Option<ImageDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtworkDetail {
    #[serde(flatten)]
    pub card: ArtworkCard,
    pub description: String,
    pub purchase_url: String,
    pub images: Vec<ImageDto>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResult {
    pub page: Page<ArtworkCard>,
    /// Matches of the free-text search alone
    pub total_count: u64,
    /// Matches after structural filters
    pub filtered_count: u64,
}

/// Random "pick of the day" selectors used by the home page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowcasePick {
    Category(i32),
    Size(SizeBucket),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtworkInput {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: String,
    pub category_id: Option<i32>,
    pub theme_id: Option<i32>,
    pub collection_id: Option<i32>,
    #[serde(default = "default_artwork_status")]
    pub status: ArtworkStatus,
    pub price: Option<i64>,
    #[serde(default)]
    pub purchase_url: String,
    pub width_cm: i32,
    pub height_cm: i32,
    pub created_year: i32,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
}

fn default_artwork_status() -> ArtworkStatus {
    ArtworkStatus::Available
}

impl ArtworkInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".into()));
        }
        for (name, value) in [("width_cm", self.width_cm), ("height_cm", self.height_cm)] {
            if !(1..=500).contains(&value) {
                return Err(DomainError::Validation(format!(
                    "{} must be between 1 and 500, got {}",
                    name, value
                )));
            }
        }
        if !(1900..=2200).contains(&self.created_year) {
            return Err(DomainError::Validation(format!(
                "created_year must be between 1900 and 2200, got {}",
                self.created_year
            )));
        }
        if let Some(price) = self.price
            && price < 0
        {
            return Err(DomainError::Validation("price must not be negative".into()));
        }
        if self.short_description.chars().count() > 300 {
            return Err(DomainError::Validation(
                "short_description must be at most 300 characters".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub path: String,
    pub order: i32,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageUpdate {
    pub order: Option<i32>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub description: String,
    pub image_url: Option<String>,
    pub artwork_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionsOverview {
    pub collections: Vec<CollectionSummary>,
    pub collections_with_images: Vec<CollectionSummary>,
    /// Artworks that belong to any collection
    pub total_artworks: u64,
    pub available_artworks: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CarouselImage {
    pub url: String,
    pub alt: String,
    pub artwork_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionPage {
    pub collection: CollectionSummary,
    pub artworks: Page<ArtworkCard>,
    pub carousel_images: Vec<CarouselImage>,
    pub available_count: u64,
    pub sold_count: u64,
    pub other_collections: Vec<CollectionSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInput {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRef {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub preview_image_url: Option<String>,
    pub views: i64,
    pub status: PostStatus,
    pub author: Option<AuthorRef>,
    pub published_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub card: PostCard,
    pub content: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    pub text: Option<String>,
    pub tag: Option<String>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_post_status")]
    pub status: PostStatus,
    pub published_at: Option<String>,
    #[serde(default)]
    pub excerpt: String,
    pub author_id: Option<i32>,
}

fn default_post_status() -> PostStatus {
    PostStatus::Draft
}

impl PostInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be empty".into()));
        }
        if self.excerpt.chars().count() > 500 {
            return Err(DomainError::Validation(
                "excerpt must be at most 500 characters".into(),
            ));
        }
        if let Some(ts) = &self.published_at
            && chrono::DateTime::parse_from_rfc3339(ts).is_err()
        {
            return Err(DomainError::Validation(
                "published_at must be an RFC 3339 timestamp".into(),
            ));
        }
        Ok(())
    }
}

/// Repository trait for the Category and Theme vocabularies
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<NamedRef>, DomainError>;

    async fn create_category(&self, name: String) -> Result<NamedRef, DomainError>;

    /// Artworks of the category are kept, their category is cleared
    async fn delete_category(&self, id: i32) -> Result<(), DomainError>;

    async fn list_themes(&self) -> Result<Vec<NamedRef>, DomainError>;

    async fn create_theme(&self, name: String) -> Result<NamedRef, DomainError>;

    async fn delete_theme(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Artwork entity and its images
#[async_trait]
pub trait ArtworkRepository: Send + Sync {
    /// Searched, filtered, ordered and paginated catalog view
    async fn catalog(&self, query: &CatalogQuery) -> Result<CatalogResult, DomainError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ArtworkDetail>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<ArtworkDetail>, DomainError>;

    /// Available works sharing the theme, else the category, of `artwork`
    async fn similar(&self, artwork: &ArtworkDetail, limit: u64)
    -> Result<Vec<ArtworkCard>, DomainError>;

    /// Available works of a collection, excluding one artwork
    async fn from_collection(
        &self,
        collection_id: i32,
        exclude_id: i32,
        limit: u64,
    ) -> Result<Vec<ArtworkCard>, DomainError>;

    async fn most_viewed(&self, limit: u64) -> Result<Vec<ArtworkCard>, DomainError>;

    async fn random_pick(&self, pick: ShowcasePick) -> Result<Option<ArtworkCard>, DomainError>;

    async fn search(&self, text: &str, limit: u64) -> Result<Vec<ArtworkCard>, DomainError>;

    async fn count_all(&self) -> Result<u64, DomainError>;

    /// Atomic `views = views + 1`
    async fn increment_views(&self, id: i32) -> Result<(), DomainError>;

    async fn create(&self, input: ArtworkInput) -> Result<ArtworkDetail, DomainError>;

    async fn update(&self, id: i32, input: ArtworkInput) -> Result<ArtworkDetail, DomainError>;

    /// Returns the media paths of the removed images
    async fn delete(&self, id: i32) -> Result<Vec<String>, DomainError>;

    async fn add_image(&self, artwork_id: i32, image: NewImage) -> Result<ImageDto, DomainError>;

    async fn update_image(&self, image_id: i32, update: ImageUpdate)
    -> Result<ImageDto, DomainError>;

    /// Returns the media path of the removed image
    async fn delete_image(&self, image_id: i32) -> Result<String, DomainError>;

    async fn images(&self, artwork_id: i32) -> Result<Vec<ImageDto>, DomainError>;
}

/// Repository trait for Collection entity
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn overview(&self) -> Result<CollectionsOverview, DomainError>;

    async fn page_by_slug(
        &self,
        slug: &str,
        page: &PageRequest,
    ) -> Result<Option<CollectionPage>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<CollectionSummary>, DomainError>;

    /// First collections by name, for site navigation
    async fn navigation(&self, limit: u64) -> Result<Vec<CollectionSummary>, DomainError>;

    async fn search(&self, text: &str, limit: u64) -> Result<Vec<CollectionSummary>, DomainError>;

    async fn count_all(&self) -> Result<u64, DomainError>;

    async fn create(&self, input: CollectionInput) -> Result<CollectionSummary, DomainError>;

    async fn update(&self, id: i32, input: CollectionInput)
    -> Result<CollectionSummary, DomainError>;

    /// Detaches the artworks; returns the cover path, if any
    async fn delete(&self, id: i32) -> Result<Option<String>, DomainError>;

    /// Returns the previous cover path, if any
    async fn set_cover(&self, id: i32, path: String) -> Result<Option<String>, DomainError>;
}

/// Repository trait for BlogPost entity
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn list_published(&self, query: &PostListQuery) -> Result<Page<PostCard>, DomainError>;

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, DomainError>;

    /// Any status, for editors
    async fn find_by_id(&self, id: i32) -> Result<Option<PostDetail>, DomainError>;

    /// Published posts sharing a tag, or a random sample when untagged
    async fn similar(&self, post: &PostDetail, limit: u64) -> Result<Vec<PostCard>, DomainError>;

    async fn latest_published(&self, limit: u64) -> Result<Vec<PostCard>, DomainError>;

    async fn latest_created(&self, limit: u64) -> Result<Vec<PostCard>, DomainError>;

    async fn most_viewed(&self, limit: u64) -> Result<Vec<PostCard>, DomainError>;

    async fn top_tags(&self, limit: usize) -> Result<Vec<TagCount>, DomainError>;

    async fn search(&self, text: &str, limit: u64) -> Result<Vec<PostCard>, DomainError>;

    async fn count_published(&self) -> Result<u64, DomainError>;

    async fn increment_views(&self, id: i32) -> Result<(), DomainError>;

    async fn create(&self, input: PostInput) -> Result<PostDetail, DomainError>;

    async fn update(&self, id: i32, input: PostInput) -> Result<PostDetail, DomainError>;

    /// Returns the preview image path, if any
    async fn delete(&self, id: i32) -> Result<Option<String>, DomainError>;

    /// Returns the previous preview image path, if any
    async fn set_preview(&self, id: i32, path: String) -> Result<Option<String>, DomainError>;
}
