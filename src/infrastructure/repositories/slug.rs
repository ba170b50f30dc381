//! Unique slug assignment shared by artworks, collections and posts

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::domain::DomainError;
use crate::utils::text::slug_base;

pub(crate) async fn slug_taken<E, C>(
    conn: &C,
    slug_column: E::Column,
    id_column: E::Column,
    slug: &str,
    exclude_id: Option<i32>,
) -> Result<bool, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut query = E::find().filter(slug_column.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(id_column.ne(id));
    }
    Ok(query.one(conn).await?.is_some())
}

/// Slug derived from `source`: the slugified base, then `base-1`, `base-2`, ...
/// until no other record holds it.
pub(crate) async fn unique_slug<E, C>(
    conn: &C,
    slug_column: E::Column,
    id_column: E::Column,
    source: &str,
    fallback: &str,
    exclude_id: Option<i32>,
) -> Result<String, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let base = slug_base(source, fallback);
    let mut candidate = base.clone();
    let mut counter = 1;
    while slug_taken::<E, C>(conn, slug_column, id_column, &candidate, exclude_id).await? {
        candidate = format!("{}-{}", base, counter);
        counter += 1;
    }
    Ok(candidate)
}

/// Slug for a write: an explicit slug is normalized and must be free, a
/// missing one is derived from `source`.
pub(crate) async fn resolve_slug<E, C>(
    conn: &C,
    slug_column: E::Column,
    id_column: E::Column,
    requested: Option<&str>,
    source: &str,
    fallback: &str,
    exclude_id: Option<i32>,
) -> Result<String, DomainError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(requested) => {
            let slug = slug_base(requested, fallback);
            if slug_taken::<E, C>(conn, slug_column, id_column, &slug, exclude_id).await? {
                return Err(DomainError::Conflict(format!("slug '{}' is already taken", slug)));
            }
            Ok(slug)
        }
        None => Ok(unique_slug::<E, C>(conn, slug_column, id_column, source, fallback, exclude_id).await?),
    }
}
