use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::size::SizeBucket;
use crate::utils::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ArtworkStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "sold")]
    Sold,
}

impl ArtworkStatus {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Self::Available),
            "sold" => Some(Self::Sold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "В наличии",
            Self::Sold => "Нет в наличии",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "artworks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub tags: String, // comma separated
    pub category_id: Option<i32>,
    pub theme_id: Option<i32>,
    pub collection_id: Option<i32>,
    pub status: ArtworkStatus,
    pub price: Option<i64>,
    pub purchase_url: String,
    pub width_cm: i32,
    pub height_cm: i32,
    pub created_year: i32,
    pub short_description: String,
    pub description: String,
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::theme::Entity",
        from = "Column::ThemeId",
        to = "super::theme::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Theme,
    #[sea_orm(
        belongs_to = "super::collection::Entity",
        from = "Column::CollectionId",
        to = "super::collection::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Collection,
    #[sea_orm(has_many = "super::artwork_image::Entity")]
    Images,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::theme::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Theme.def()
    }
}

impl Related<super::collection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collection.def()
    }
}

impl Related<super::artwork_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn size_category(&self) -> SizeBucket {
        SizeBucket::classify(self.width_cm, self.height_cm)
    }

    pub fn tags_list(&self) -> Vec<String> {
        text::split_tags(&self.tags)
    }

    pub fn price_display(&self) -> String {
        text::price_display(self.status == ArtworkStatus::Sold, self.price)
    }

    pub fn dimensions(&self) -> String {
        text::dimensions_display(self.width_cm, self.height_cm)
    }
}
