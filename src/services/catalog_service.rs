//! Catalog and artwork detail pages

use serde::Serialize;

use crate::domain::catalog::{CatalogEcho, CatalogParams, CatalogQuery};
use crate::domain::pagination::Page;
use crate::domain::size::SizeBucket;
use crate::domain::{ArtworkCard, ArtworkDetail, DomainError, NamedRef};
use crate::infrastructure::AppState;
use crate::infrastructure::session::ViewedKind;
use crate::models::ArtworkStatus;

pub const SIMILAR_ARTWORKS: u64 = 4;
pub const COLLECTION_ARTWORKS: u64 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct FilterChoice {
    pub value: &'static str,
    pub label: &'static str,
}

/// Everything a filter form can offer
#[derive(Debug, Clone, Serialize)]
pub struct CatalogVocabulary {
    pub categories: Vec<NamedRef>,
    pub themes: Vec<NamedRef>,
    pub status_choices: Vec<FilterChoice>,
    pub size_choices: Vec<FilterChoice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub artworks: Page<ArtworkCard>,
    pub total_count: u64,
    pub filtered_count: u64,
    pub filters: CatalogEcho,
    pub vocabulary: CatalogVocabulary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtworkPage {
    pub artwork: ArtworkDetail,
    pub similar_artworks: Vec<ArtworkCard>,
    /// Absent when the artwork is not part of a collection
    pub collection_artworks: Option<Vec<ArtworkCard>>,
}

pub async fn vocabulary(state: &AppState) -> Result<CatalogVocabulary, DomainError> {
    Ok(CatalogVocabulary {
        categories: state.taxonomy_repo.list_categories().await?,
        themes: state.taxonomy_repo.list_themes().await?,
        status_choices: [ArtworkStatus::Available, ArtworkStatus::Sold]
            .iter()
            .map(|s| FilterChoice {
                value: s.as_str(),
                label: s.label(),
            })
            .collect(),
        size_choices: SizeBucket::ALL
            .iter()
            .map(|b| FilterChoice {
                value: b.as_str(),
                label: b.choice_label(),
            })
            .collect(),
    })
}

pub async fn catalog_page(state: &AppState, params: CatalogParams) -> Result<CatalogPage, DomainError> {
    let query = CatalogQuery::from(params);
    let result = state.artwork_repo.catalog(&query).await?;

    Ok(CatalogPage {
        artworks: result.page,
        total_count: result.total_count,
        filtered_count: result.filtered_count,
        filters: query.echo(),
        vocabulary: vocabulary(state).await?,
    })
}

/// Counts a view at most once per session, then loads the related works
pub async fn artwork_page(
    state: &AppState,
    session_id: &str,
    slug: &str,
) -> Result<ArtworkPage, DomainError> {
    let mut artwork = state
        .artwork_repo
        .find_by_slug(slug)
        .await?
        .ok_or(DomainError::NotFound)?;

    if state.views.record(session_id, ViewedKind::Artwork, artwork.card.id) {
        match state.artwork_repo.increment_views(artwork.card.id).await {
            Ok(()) => artwork.card.views += 1,
            Err(e) => {
                state.views.forget(session_id, ViewedKind::Artwork, artwork.card.id);
                tracing::warn!("Could not count view of artwork {}: {}", artwork.card.id, e);
            }
        }
    }

    let similar_artworks = state.artwork_repo.similar(&artwork, SIMILAR_ARTWORKS).await?;
    let collection_artworks = match &artwork.card.collection {
        Some(collection) => Some(
            state
                .artwork_repo
                .from_collection(collection.id, artwork.card.id, COLLECTION_ARTWORKS)
                .await?,
        ),
        None => None,
    };

    Ok(ArtworkPage {
        artwork,
        similar_artworks,
        collection_artworks,
    })
}
