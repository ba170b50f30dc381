//! SeaORM implementation of CollectionRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use super::artwork_repository::{decorate_cards, default_order, primary_images};
use super::slug::resolve_slug;
use super::{contains_ci, now};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::{
    CarouselImage, CollectionInput, CollectionPage, CollectionRepository, CollectionSummary,
    CollectionsOverview, DomainError, media_url,
};
use crate::models::{ArtworkStatus, artwork, artwork_image, collection};

const CAROUSEL_SIZE: u64 = 10;
const COVERS_ON_OVERVIEW: usize = 10;
const OTHER_COLLECTIONS: u64 = 6;

/// SeaORM-based implementation of CollectionRepository
pub struct SeaOrmCollectionRepository {
    db: DatabaseConnection,
}

impl SeaOrmCollectionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn summary(model: collection::Model, artwork_count: u64) -> CollectionSummary {
    CollectionSummary {
        id: model.id,
        url: format!("/collections/{}", model.slug),
        image_url: model.image.as_deref().map(media_url),
        name: model.name,
        slug: model.slug,
        description: model.description,
        artwork_count,
    }
}

/// Number of artworks per collection id
async fn artwork_counts<C: ConnectionTrait>(conn: &C) -> Result<HashMap<i32, u64>, DbErr> {
    let rows: Vec<(Option<i32>, i64)> = artwork::Entity::find()
        .select_only()
        .column(artwork::Column::CollectionId)
        .column_as(Expr::col(artwork::Column::Id).count(), "artwork_count")
        .filter(artwork::Column::CollectionId.is_not_null())
        .group_by(artwork::Column::CollectionId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, count.max(0) as u64)))
        .collect())
}

async fn summaries<C: ConnectionTrait>(
    conn: &C,
    models: Vec<collection::Model>,
) -> Result<Vec<CollectionSummary>, DbErr> {
    let counts = artwork_counts(conn).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let count = counts.get(&m.id).copied().unwrap_or(0);
            summary(m, count)
        })
        .collect())
}

fn checked_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("name must not be empty".into()));
    }
    Ok(name.to_string())
}

impl SeaOrmCollectionRepository {
    async fn carousel(
        &self,
        collection: &collection::Model,
    ) -> Result<Vec<CarouselImage>, DomainError> {
        let with_images = Query::select()
            .column(artwork_image::Column::ArtworkId)
            .from(artwork_image::Entity)
            .to_owned();

        let artworks = default_order(
            artwork::Entity::find()
                .filter(artwork::Column::CollectionId.eq(collection.id))
                .filter(artwork::Column::Id.in_subquery(with_images)),
        )
        .limit(CAROUSEL_SIZE)
        .all(&self.db)
        .await?;

        let ids: Vec<i32> = artworks.iter().map(|a| a.id).collect();
        let images = primary_images(&self.db, &ids).await?;

        let mut carousel: Vec<CarouselImage> = artworks
            .into_iter()
            .filter_map(|artwork| {
                images.get(&artwork.id).map(|image| CarouselImage {
                    url: media_url(&image.image),
                    artwork_url: Some(format!("/artworks/{}", artwork.slug)),
                    alt: artwork.title,
                })
            })
            .collect();

        if carousel.is_empty()
            && let Some(cover) = &collection.image
        {
            carousel.push(CarouselImage {
                url: media_url(cover),
                alt: collection.name.clone(),
                artwork_url: None,
            });
        }

        Ok(carousel)
    }

    async fn count_with_status(
        &self,
        collection_id: i32,
        status: ArtworkStatus,
    ) -> Result<u64, DomainError> {
        Ok(artwork::Entity::find()
            .filter(artwork::Column::CollectionId.eq(collection_id))
            .filter(artwork::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await?)
    }
}

#[async_trait]
impl CollectionRepository for SeaOrmCollectionRepository {
    async fn overview(&self) -> Result<CollectionsOverview, DomainError> {
        let models = collection::Entity::find()
            .order_by_asc(collection::Column::Name)
            .order_by_asc(collection::Column::Id)
            .all(&self.db)
            .await?;
        let collections = summaries(&self.db, models).await?;

        let collections_with_images = collections
            .iter()
            .filter(|c| c.image_url.is_some())
            .take(COVERS_ON_OVERVIEW)
            .cloned()
            .collect();

        let in_collection = artwork::Entity::find().filter(artwork::Column::CollectionId.is_not_null());
        let total_artworks = in_collection.clone().count(&self.db).await?;
        let available_artworks = in_collection
            .filter(artwork::Column::Status.eq(ArtworkStatus::Available.as_str()))
            .count(&self.db)
            .await?;

        Ok(CollectionsOverview {
            collections,
            collections_with_images,
            total_artworks,
            available_artworks,
        })
    }

    async fn page_by_slug(
        &self,
        slug: &str,
        page: &PageRequest,
    ) -> Result<Option<CollectionPage>, DomainError> {
        let Some(model) = collection::Entity::find()
            .filter(collection::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let artworks = artwork::Entity::find().filter(artwork::Column::CollectionId.eq(model.id));
        let total = artworks.clone().count(&self.db).await?;
        let number = page.resolve(total);
        let models = default_order(artworks)
            .offset((number - 1) * page.per_page)
            .limit(page.per_page)
            .all(&self.db)
            .await?;
        let items = decorate_cards(&self.db, models).await?;

        let carousel_images = self.carousel(&model).await?;
        let available_count = self
            .count_with_status(model.id, ArtworkStatus::Available)
            .await?;
        let sold_count = self.count_with_status(model.id, ArtworkStatus::Sold).await?;

        let others = collection::Entity::find()
            .filter(collection::Column::Id.ne(model.id))
            .order_by_asc(collection::Column::Name)
            .limit(OTHER_COLLECTIONS)
            .all(&self.db)
            .await?;
        let other_collections = summaries(&self.db, others).await?;

        Ok(Some(CollectionPage {
            collection: summary(model, total),
            artworks: Page::new(items, number, page.per_page, total),
            carousel_images,
            available_count,
            sold_count,
            other_collections,
        }))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CollectionSummary>, DomainError> {
        let Some(model) = collection::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(summaries(&self.db, vec![model]).await?.pop())
    }

    async fn navigation(&self, limit: u64) -> Result<Vec<CollectionSummary>, DomainError> {
        let models = collection::Entity::find()
            .order_by_asc(collection::Column::Name)
            .order_by_asc(collection::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(summaries(&self.db, models).await?)
    }

    async fn search(&self, text: &str, limit: u64) -> Result<Vec<CollectionSummary>, DomainError> {
        let models = collection::Entity::find()
            .filter(
                contains_ci(collection::Column::Name, text)
                    .or(contains_ci(collection::Column::Description, text)),
            )
            .order_by_asc(collection::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(summaries(&self.db, models).await?)
    }

    async fn count_all(&self) -> Result<u64, DomainError> {
        Ok(collection::Entity::find().count(&self.db).await?)
    }

    async fn create(&self, input: CollectionInput) -> Result<CollectionSummary, DomainError> {
        let name = checked_name(&input.name)?;

        let txn = self.db.begin().await?;
        let slug = resolve_slug::<collection::Entity, _>(
            &txn,
            collection::Column::Slug,
            collection::Column::Id,
            input.slug.as_deref(),
            &name,
            "collection",
            None,
        )
        .await?;

        let timestamp = now();
        let model = collection::ActiveModel {
            name: Set(name),
            slug: Set(slug),
            description: Set(input.description),
            image: Set(None),
            created_at: Set(timestamp.clone()),
            updated_at: Set(timestamp),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!("Created collection {} ({})", model.id, model.slug);
        Ok(summary(model, 0))
    }

    async fn update(
        &self,
        id: i32,
        input: CollectionInput,
    ) -> Result<CollectionSummary, DomainError> {
        let name = checked_name(&input.name)?;

        let txn = self.db.begin().await?;
        let existing = collection::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(requested) if requested != existing.slug => Some(
                resolve_slug::<collection::Entity, _>(
                    &txn,
                    collection::Column::Slug,
                    collection::Column::Id,
                    Some(requested),
                    &name,
                    "collection",
                    Some(id),
                )
                .await?,
            ),
            _ => None,
        };

        let mut active: collection::ActiveModel = existing.into();
        active.name = Set(name);
        active.description = Set(input.description);
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        active.updated_at = Set(now());
        let model = active.update(&txn).await?;
        let updated = summaries(&txn, vec![model]).await?.pop();

        txn.commit().await?;
        updated.ok_or(DomainError::NotFound)
    }

    async fn delete(&self, id: i32) -> Result<Option<String>, DomainError> {
        let txn = self.db.begin().await?;

        let existing = collection::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        artwork::Entity::update_many()
            .col_expr(artwork::Column::CollectionId, Expr::value(Option::<i32>::None))
            .filter(artwork::Column::CollectionId.eq(id))
            .exec(&txn)
            .await?;
        collection::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!("Deleted collection {}", id);
        Ok(existing.image)
    }

    async fn set_cover(&self, id: i32, path: String) -> Result<Option<String>, DomainError> {
        let existing = collection::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;
        let previous = existing.image.clone();

        let mut active: collection::ActiveModel = existing.into();
        active.image = Set(Some(path));
        active.updated_at = Set(now());
        active.update(&self.db).await?;

        Ok(previous)
    }
}
