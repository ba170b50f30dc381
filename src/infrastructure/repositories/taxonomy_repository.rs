//! SeaORM implementation of TaxonomyRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::{DomainError, NamedRef, TaxonomyRepository};
use crate::models::{artwork, category, theme};

/// SeaORM-based implementation of TaxonomyRepository
pub struct SeaOrmTaxonomyRepository {
    db: DatabaseConnection,
}

impl SeaOrmTaxonomyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn checked_name(name: String) -> Result<String, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("name must not be empty".into()));
    }
    Ok(name)
}

#[async_trait]
impl TaxonomyRepository for SeaOrmTaxonomyRepository {
    async fn list_categories(&self) -> Result<Vec<NamedRef>, DomainError> {
        let categories = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;

        Ok(categories
            .into_iter()
            .map(|c| NamedRef {
                id: c.id,
                name: c.name,
            })
            .collect())
    }

    async fn create_category(&self, name: String) -> Result<NamedRef, DomainError> {
        let model = category::ActiveModel {
            name: Set(checked_name(name)?),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(NamedRef {
            id: model.id,
            name: model.name,
        })
    }

    async fn delete_category(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        if category::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DomainError::NotFound);
        }

        artwork::Entity::update_many()
            .col_expr(artwork::Column::CategoryId, Expr::value(Option::<i32>::None))
            .filter(artwork::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        category::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!("Deleted category {}", id);
        Ok(())
    }

    async fn list_themes(&self) -> Result<Vec<NamedRef>, DomainError> {
        let themes = theme::Entity::find()
            .order_by_asc(theme::Column::Name)
            .order_by_asc(theme::Column::Id)
            .all(&self.db)
            .await?;

        Ok(themes
            .into_iter()
            .map(|t| NamedRef {
                id: t.id,
                name: t.name,
            })
            .collect())
    }

    async fn create_theme(&self, name: String) -> Result<NamedRef, DomainError> {
        let model = theme::ActiveModel {
            name: Set(checked_name(name)?),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(NamedRef {
            id: model.id,
            name: model.name,
        })
    }

    async fn delete_theme(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        if theme::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DomainError::NotFound);
        }

        artwork::Entity::update_many()
            .col_expr(artwork::Column::ThemeId, Expr::value(Option::<i32>::None))
            .filter(artwork::Column::ThemeId.eq(id))
            .exec(&txn)
            .await?;
        theme::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        tracing::info!("Deleted theme {}", id);
        Ok(())
    }
}
