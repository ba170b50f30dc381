//! Repository implementations using SeaORM

pub mod artwork_repository;
pub mod collection_repository;
pub mod post_repository;
pub mod slug;
pub mod taxonomy_repository;

pub use artwork_repository::SeaOrmArtworkRepository;
pub use collection_repository::SeaOrmCollectionRepository;
pub use post_repository::SeaOrmPostRepository;
pub use taxonomy_repository::SeaOrmTaxonomyRepository;

use sea_orm::ColumnTrait;
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};

/// `column LIKE '%text%'` with the LIKE wildcards of `text` escaped.
/// SQLite folds case for ASCII letters only.
pub(crate) fn contains_ci<C: ColumnTrait>(column: C, text: &str) -> SimpleExpr {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::col((column.entity_name(), column))
        .like(LikeExpr::new(format!("%{}%", escaped)).escape('\\'))
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
