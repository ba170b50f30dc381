//! SeaORM implementation of ArtworkRepository

use async_trait::async_trait;
use rand::seq::SliceRandom;
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use std::collections::HashMap;

use super::slug::resolve_slug;
use super::{contains_ci, now};
use crate::domain::catalog::{ArtworkFilter, CatalogOrder, CatalogQuery};
use crate::domain::pagination::Page;
use crate::domain::size::{MEDIUM_LONG_MAX_CM, MEDIUM_SHORT_MAX_CM, SMALL_MAX_CM, SizeBucket};
use crate::domain::{
    ArtworkCard, ArtworkDetail, ArtworkInput, ArtworkRepository, CatalogResult, CollectionRef,
    DomainError, ImageDto, ImageUpdate, NamedRef, NewImage, ShowcasePick, media_url,
};
use crate::models::{ArtworkStatus, artwork, artwork_image, category, collection, theme};

/// SeaORM-based implementation of ArtworkRepository
pub struct SeaOrmArtworkRepository {
    db: DatabaseConnection,
}

impl SeaOrmArtworkRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn available() -> sea_orm::sea_query::SimpleExpr {
    artwork::Column::Status.eq(ArtworkStatus::Available.as_str())
}

/// Newest works first: by creation year, then insertion time
pub(crate) fn default_order(select: Select<artwork::Entity>) -> Select<artwork::Entity> {
    select
        .order_by_desc(artwork::Column::CreatedYear)
        .order_by_desc(artwork::Column::CreatedAt)
        .order_by_desc(artwork::Column::Id)
}

fn apply_order(select: Select<artwork::Entity>, order: CatalogOrder) -> Select<artwork::Entity> {
    use artwork::Column;

    let (column, direction) = match order {
        CatalogOrder::Newest => (Column::CreatedAt, Order::Desc),
        CatalogOrder::Oldest => (Column::CreatedAt, Order::Asc),
        CatalogOrder::PriceAsc => (Column::Price, Order::Asc),
        CatalogOrder::PriceDesc => (Column::Price, Order::Desc),
        CatalogOrder::MostViewed => (Column::Views, Order::Desc),
        CatalogOrder::YearDesc => (Column::CreatedYear, Order::Desc),
        CatalogOrder::YearAsc => (Column::CreatedYear, Order::Asc),
        CatalogOrder::TitleAsc => (Column::Title, Order::Asc),
        CatalogOrder::TitleDesc => (Column::Title, Order::Desc),
    };
    select
        .order_by(column, direction.clone())
        .order_by(Column::Id, direction)
}

fn small_rect() -> Condition {
    Condition::all()
        .add(artwork::Column::WidthCm.lte(SMALL_MAX_CM))
        .add(artwork::Column::HeightCm.lte(SMALL_MAX_CM))
}

fn medium_rect() -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(artwork::Column::WidthCm.lte(MEDIUM_SHORT_MAX_CM))
                .add(artwork::Column::HeightCm.lte(MEDIUM_LONG_MAX_CM)),
        )
        .add(
            Condition::all()
                .add(artwork::Column::WidthCm.lte(MEDIUM_LONG_MAX_CM))
                .add(artwork::Column::HeightCm.lte(MEDIUM_SHORT_MAX_CM)),
        )
}

/// Database form of `SizeBucket::matches`
pub(crate) fn size_condition(bucket: SizeBucket) -> Condition {
    match bucket {
        SizeBucket::Small => small_rect(),
        SizeBucket::Medium => Condition::all().add(medium_rect()).add(small_rect().not()),
        SizeBucket::Large => Condition::all()
            .add(small_rect().not())
            .add(medium_rect().not()),
    }
}

fn text_condition(text: &str) -> Condition {
    Condition::any()
        .add(contains_ci(artwork::Column::Title, text))
        .add(contains_ci(artwork::Column::Tags, text))
        .add(contains_ci(artwork::Column::ShortDescription, text))
        .add(contains_ci(artwork::Column::Description, text))
}

fn filter_condition(filter: &ArtworkFilter) -> Condition {
    let mut condition = Condition::all();

    if !filter.statuses.is_empty() {
        condition = condition.add(
            artwork::Column::Status.is_in(filter.statuses.iter().map(|s| s.as_str())),
        );
    }
    if !filter.category_ids.is_empty() {
        condition = condition.add(artwork::Column::CategoryId.is_in(filter.category_ids.clone()));
    }
    if !filter.theme_ids.is_empty() {
        condition = condition.add(artwork::Column::ThemeId.is_in(filter.theme_ids.clone()));
    }
    if !filter.collection_ids.is_empty() {
        condition =
            condition.add(artwork::Column::CollectionId.is_in(filter.collection_ids.clone()));
    }
    if !filter.sizes.is_empty() {
        let sizes = filter
            .sizes
            .iter()
            .fold(Condition::any(), |any, bucket| any.add(size_condition(*bucket)));
        condition = condition.add(sizes);
    }
    if let Some(min) = filter.price_min {
        condition = condition.add(artwork::Column::Price.gte(min));
    }
    if let Some(max) = filter.price_max {
        condition = condition.add(artwork::Column::Price.lte(max));
    }

    condition
}

pub(crate) fn image_dto(image: &artwork_image::Model) -> ImageDto {
    ImageDto {
        id: image.id,
        artwork_id: image.artwork_id,
        path: image.image.clone(),
        url: media_url(&image.image),
        order: image.sort_order,
        is_primary: image.is_primary,
    }
}

fn card(
    model: artwork::Model,
    category: Option<NamedRef>,
    theme: Option<NamedRef>,
    collection: Option<CollectionRef>,
    primary_image: Option<ImageDto>,
) -> ArtworkCard {
    let size = model.size_category();
    ArtworkCard {
        id: model.id,
        url: format!("/artworks/{}", model.slug),
        status_label: model.status.label(),
        price_display: model.price_display(),
        dimensions: model.dimensions(),
        size_category: size,
        size_category_label: size.label(),
        tags: model.tags_list(),
        title: model.title,
        slug: model.slug,
        status: model.status,
        price: model.price,
        width_cm: model.width_cm,
        height_cm: model.height_cm,
        created_year: model.created_year,
        short_description: model.short_description,
        views: model.views,
        category,
        theme,
        collection,
        primary_image,
    }
}

fn unique_ids(ids: impl Iterator<Item = Option<i32>>) -> Vec<i32> {
    let mut ids: Vec<i32> = ids.flatten().collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Primary image of every listed artwork, falling back to its first image
/// by (order, id).
pub(crate) async fn primary_images<C: ConnectionTrait>(
    conn: &C,
    artwork_ids: &[i32],
) -> Result<HashMap<i32, artwork_image::Model>, DbErr> {
    let mut primary: HashMap<i32, artwork_image::Model> = HashMap::new();
    if artwork_ids.is_empty() {
        return Ok(primary);
    }

    let images = artwork_image::Entity::find()
        .filter(artwork_image::Column::ArtworkId.is_in(artwork_ids.to_vec()))
        .order_by_asc(artwork_image::Column::SortOrder)
        .order_by_asc(artwork_image::Column::Id)
        .all(conn)
        .await?;

    for image in images {
        match primary.get(&image.artwork_id) {
            Some(current) if current.is_primary || !image.is_primary => {}
            _ => {
                primary.insert(image.artwork_id, image);
            }
        }
    }
    Ok(primary)
}

/// Attach category, theme, collection and primary image with one query per
/// relation.
pub(crate) async fn decorate_cards<C: ConnectionTrait>(
    conn: &C,
    models: Vec<artwork::Model>,
) -> Result<Vec<ArtworkCard>, DbErr> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let category_ids = unique_ids(models.iter().map(|m| m.category_id));
    let theme_ids = unique_ids(models.iter().map(|m| m.theme_id));
    let collection_ids = unique_ids(models.iter().map(|m| m.collection_id));
    let artwork_ids: Vec<i32> = models.iter().map(|m| m.id).collect();

    let categories: HashMap<i32, NamedRef> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| (c.id, NamedRef { id: c.id, name: c.name }))
            .collect()
    };

    let themes: HashMap<i32, NamedRef> = if theme_ids.is_empty() {
        HashMap::new()
    } else {
        theme::Entity::find()
            .filter(theme::Column::Id.is_in(theme_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|t| (t.id, NamedRef { id: t.id, name: t.name }))
            .collect()
    };

    let collections: HashMap<i32, CollectionRef> = if collection_ids.is_empty() {
        HashMap::new()
    } else {
        collection::Entity::find()
            .filter(collection::Column::Id.is_in(collection_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| {
                (
                    c.id,
                    CollectionRef {
                        id: c.id,
                        name: c.name,
                        slug: c.slug,
                    },
                )
            })
            .collect()
    };

    let images = primary_images(conn, &artwork_ids).await?;

    Ok(models
        .into_iter()
        .map(|m| {
            let category = m.category_id.and_then(|id| categories.get(&id).cloned());
            let theme = m.theme_id.and_then(|id| themes.get(&id).cloned());
            let collection = m.collection_id.and_then(|id| collections.get(&id).cloned());
            let primary = images.get(&m.id).map(image_dto);
            card(m, category, theme, collection, primary)
        })
        .collect())
}

async fn detail<C: ConnectionTrait>(
    conn: &C,
    model: artwork::Model,
) -> Result<ArtworkDetail, DbErr> {
    let description = model.description.clone();
    let purchase_url = model.purchase_url.clone();
    let created_at = model.created_at.clone();
    let updated_at = model.updated_at.clone();

    let images = list_images(conn, model.id).await?;
    let card = decorate_cards(conn, vec![model])
        .await?
        .pop()
        .ok_or_else(|| DbErr::RecordNotFound("artwork".into()))?;

    Ok(ArtworkDetail {
        card,
        description,
        purchase_url,
        images,
        created_at,
        updated_at,
    })
}

async fn list_images<C: ConnectionTrait>(conn: &C, artwork_id: i32) -> Result<Vec<ImageDto>, DbErr> {
    let images = artwork_image::Entity::find()
        .filter(artwork_image::Column::ArtworkId.eq(artwork_id))
        .order_by_asc(artwork_image::Column::SortOrder)
        .order_by_asc(artwork_image::Column::Id)
        .all(conn)
        .await?;
    Ok(images.iter().map(image_dto).collect())
}

async fn clear_primary<C: ConnectionTrait>(conn: &C, artwork_id: i32) -> Result<(), DbErr> {
    artwork_image::Entity::update_many()
        .col_expr(artwork_image::Column::IsPrimary, Expr::value(false))
        .filter(artwork_image::Column::ArtworkId.eq(artwork_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Foreign keys of an input must point at existing rows
async fn check_references<C: ConnectionTrait>(
    conn: &C,
    input: &ArtworkInput,
) -> Result<(), DomainError> {
    if let Some(id) = input.category_id
        && category::Entity::find_by_id(id).one(conn).await?.is_none()
    {
        return Err(DomainError::Validation(format!("unknown category {}", id)));
    }
    if let Some(id) = input.theme_id
        && theme::Entity::find_by_id(id).one(conn).await?.is_none()
    {
        return Err(DomainError::Validation(format!("unknown theme {}", id)));
    }
    if let Some(id) = input.collection_id
        && collection::Entity::find_by_id(id).one(conn).await?.is_none()
    {
        return Err(DomainError::Validation(format!("unknown collection {}", id)));
    }
    Ok(())
}

fn apply_input(active: &mut artwork::ActiveModel, input: ArtworkInput) {
    active.title = Set(input.title.trim().to_string());
    active.tags = Set(input.tags.trim().to_string());
    active.category_id = Set(input.category_id);
    active.theme_id = Set(input.theme_id);
    active.collection_id = Set(input.collection_id);
    active.status = Set(input.status);
    active.price = Set(input.price);
    active.purchase_url = Set(input.purchase_url.trim().to_string());
    active.width_cm = Set(input.width_cm);
    active.height_cm = Set(input.height_cm);
    active.created_year = Set(input.created_year);
    active.short_description = Set(input.short_description);
    active.description = Set(input.description);
    active.updated_at = Set(now());
}

impl SeaOrmArtworkRepository {
    async fn cards(&self, select: Select<artwork::Entity>) -> Result<Vec<ArtworkCard>, DomainError> {
        let models = select.all(&self.db).await?;
        Ok(decorate_cards(&self.db, models).await?)
    }
}

#[async_trait]
impl ArtworkRepository for SeaOrmArtworkRepository {
    async fn catalog(&self, query: &CatalogQuery) -> Result<CatalogResult, DomainError> {
        let mut base = artwork::Entity::find();
        if let Some(text) = &query.text {
            base = base.filter(text_condition(text));
        }
        let total_count = base.clone().count(&self.db).await?;

        let filtered = base.filter(filter_condition(&query.filter));
        let filtered_count = filtered.clone().count(&self.db).await?;

        let per_page = query.page.per_page;
        let number = query.page.resolve(filtered_count);
        let models = apply_order(filtered, query.order)
            .offset((number - 1) * per_page)
            .limit(per_page)
            .all(&self.db)
            .await?;
        let items = decorate_cards(&self.db, models).await?;

        tracing::debug!(
            "Catalog page {} of {} matches ({} before filters)",
            number,
            filtered_count,
            total_count
        );

        Ok(CatalogResult {
            page: Page::new(items, number, per_page, filtered_count),
            total_count,
            filtered_count,
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ArtworkDetail>, DomainError> {
        let model = artwork::Entity::find()
            .filter(artwork::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        match model {
            Some(model) => Ok(Some(detail(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ArtworkDetail>, DomainError> {
        match artwork::Entity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(detail(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn similar(
        &self,
        artwork: &ArtworkDetail,
        limit: u64,
    ) -> Result<Vec<ArtworkCard>, DomainError> {
        let mut select = artwork::Entity::find()
            .filter(available())
            .filter(artwork::Column::Id.ne(artwork.card.id));

        if let Some(theme) = &artwork.card.theme {
            select = select.filter(artwork::Column::ThemeId.eq(theme.id));
        } else if let Some(category) = &artwork.card.category {
            select = select.filter(artwork::Column::CategoryId.eq(category.id));
        }

        self.cards(default_order(select).limit(limit)).await
    }

    async fn from_collection(
        &self,
        collection_id: i32,
        exclude_id: i32,
        limit: u64,
    ) -> Result<Vec<ArtworkCard>, DomainError> {
        let select = artwork::Entity::find()
            .filter(available())
            .filter(artwork::Column::CollectionId.eq(collection_id))
            .filter(artwork::Column::Id.ne(exclude_id));

        self.cards(default_order(select).limit(limit)).await
    }

    async fn most_viewed(&self, limit: u64) -> Result<Vec<ArtworkCard>, DomainError> {
        let select = artwork::Entity::find()
            .filter(available())
            .order_by_desc(artwork::Column::Views)
            .order_by_asc(artwork::Column::Id)
            .limit(limit);

        self.cards(select).await
    }

    async fn random_pick(&self, pick: ShowcasePick) -> Result<Option<ArtworkCard>, DomainError> {
        let condition = match pick {
            ShowcasePick::Category(id) => Condition::all().add(artwork::Column::CategoryId.eq(id)),
            ShowcasePick::Size(bucket) => size_condition(bucket),
        };

        let ids: Vec<i32> = artwork::Entity::find()
            .select_only()
            .column(artwork::Column::Id)
            .filter(available())
            .filter(condition)
            .into_tuple()
            .all(&self.db)
            .await?;

        let chosen = {
            let mut rng = rand::thread_rng();
            ids.choose(&mut rng).copied()
        };

        match chosen {
            Some(id) => {
                let model = artwork::Entity::find_by_id(id).all(&self.db).await?;
                Ok(decorate_cards(&self.db, model).await?.pop())
            }
            None => Ok(None),
        }
    }

    async fn search(&self, text: &str, limit: u64) -> Result<Vec<ArtworkCard>, DomainError> {
        let select = artwork::Entity::find().filter(text_condition(text));
        self.cards(default_order(select).limit(limit)).await
    }

    async fn count_all(&self) -> Result<u64, DomainError> {
        Ok(artwork::Entity::find().count(&self.db).await?)
    }

    async fn increment_views(&self, id: i32) -> Result<(), DomainError> {
        let result = artwork::Entity::update_many()
            .col_expr(
                artwork::Column::Views,
                Expr::col(artwork::Column::Views).add(1),
            )
            .filter(artwork::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    async fn create(&self, input: ArtworkInput) -> Result<ArtworkDetail, DomainError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        check_references(&txn, &input).await?;

        let slug = resolve_slug::<artwork::Entity, _>(
            &txn,
            artwork::Column::Slug,
            artwork::Column::Id,
            input.slug.as_deref(),
            &input.title,
            "artwork",
            None,
        )
        .await?;

        let timestamp = now();
        let mut active = artwork::ActiveModel {
            slug: Set(slug),
            views: Set(0),
            created_at: Set(timestamp),
            ..Default::default()
        };
        apply_input(&mut active, input);
        let model = active.insert(&txn).await?;
        let created = detail(&txn, model).await?;

        txn.commit().await?;
        tracing::info!("Created artwork {} ({})", created.card.id, created.card.slug);
        Ok(created)
    }

    async fn update(&self, id: i32, input: ArtworkInput) -> Result<ArtworkDetail, DomainError> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let existing = artwork::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;
        check_references(&txn, &input).await?;

        let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(requested) if requested != existing.slug => Some(
                resolve_slug::<artwork::Entity, _>(
                    &txn,
                    artwork::Column::Slug,
                    artwork::Column::Id,
                    Some(requested),
                    &input.title,
                    "artwork",
                    Some(id),
                )
                .await?,
            ),
            _ => None,
        };

        let mut active: artwork::ActiveModel = existing.into();
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        apply_input(&mut active, input);
        let model = active.update(&txn).await?;
        let updated = detail(&txn, model).await?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<Vec<String>, DomainError> {
        let txn = self.db.begin().await?;

        if artwork::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DomainError::NotFound);
        }

        let paths: Vec<String> = list_images(&txn, id)
            .await?
            .into_iter()
            .map(|image| image.path)
            .collect();

        artwork_image::Entity::delete_many()
            .filter(artwork_image::Column::ArtworkId.eq(id))
            .exec(&txn)
            .await?;
        artwork::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!("Deleted artwork {} with {} images", id, paths.len());
        Ok(paths)
    }

    async fn add_image(&self, artwork_id: i32, image: NewImage) -> Result<ImageDto, DomainError> {
        let txn = self.db.begin().await?;

        if artwork::Entity::find_by_id(artwork_id).one(&txn).await?.is_none() {
            return Err(DomainError::NotFound);
        }

        let existing = artwork_image::Entity::find()
            .filter(artwork_image::Column::ArtworkId.eq(artwork_id))
            .count(&txn)
            .await?;

        // the first image of an artwork is always its primary
        let is_primary = image.is_primary || existing == 0;
        if is_primary {
            clear_primary(&txn, artwork_id).await?;
        }

        let model = artwork_image::ActiveModel {
            artwork_id: Set(artwork_id),
            image: Set(image.path),
            sort_order: Set(image.order),
            is_primary: Set(is_primary),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(image_dto(&model))
    }

    async fn update_image(
        &self,
        image_id: i32,
        update: ImageUpdate,
    ) -> Result<ImageDto, DomainError> {
        let txn = self.db.begin().await?;

        let image = artwork_image::Entity::find_by_id(image_id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        // Clearing the flag on the current primary is ignored: a new
        // primary has to be chosen instead.
        let promote = update.is_primary == Some(true) && !image.is_primary;
        if promote {
            clear_primary(&txn, image.artwork_id).await?;
        }

        let mut active: artwork_image::ActiveModel = image.clone().into();
        active.sort_order = Set(update.order.unwrap_or(image.sort_order));
        if promote {
            active.is_primary = Set(true);
        }
        let model = active.update(&txn).await?;

        txn.commit().await?;
        Ok(image_dto(&model))
    }

    async fn delete_image(&self, image_id: i32) -> Result<String, DomainError> {
        let txn = self.db.begin().await?;

        let image = artwork_image::Entity::find_by_id(image_id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;
        artwork_image::Entity::delete_by_id(image_id).exec(&txn).await?;

        if image.is_primary {
            let next = artwork_image::Entity::find()
                .filter(artwork_image::Column::ArtworkId.eq(image.artwork_id))
                .order_by_asc(artwork_image::Column::SortOrder)
                .order_by_asc(artwork_image::Column::Id)
                .one(&txn)
                .await?;
            if let Some(next) = next {
                let mut active: artwork_image::ActiveModel = next.into();
                active.is_primary = Set(true);
                active.update(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(image.image)
    }

    async fn images(&self, artwork_id: i32) -> Result<Vec<ImageDto>, DomainError> {
        Ok(list_images(&self.db, artwork_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql_for(bucket: SizeBucket) -> String {
        artwork::Entity::find()
            .filter(size_condition(bucket))
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn size_filters_use_the_bucket_limits() {
        let small = sql_for(SizeBucket::Small);
        assert!(small.contains("\"width_cm\" <= 25"));
        assert!(small.contains("\"height_cm\" <= 25"));

        let medium = sql_for(SizeBucket::Medium);
        assert!(medium.contains("<= 40"));
        assert!(medium.contains("<= 60"));
        assert!(medium.contains("NOT"));
    }

    #[test]
    fn search_escapes_like_wildcards() {
        let sql = artwork::Entity::find()
            .filter(text_condition("100%_off"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("ESCAPE"));
        assert!(!sql.contains("'%100%_off%'"));
    }
}
