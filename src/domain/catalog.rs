//! Catalog request normalization: raw query-string parameters in, a
//! validated `CatalogQuery` out. Unknown or malformed values are dropped.

use serde::{Deserialize, Serialize};

use super::pagination::{PageRequest, last_value, per_page_from_param};
use super::size::SizeBucket;
use crate::models::ArtworkStatus;

/// Query string of the catalog page. Multi-valued keys repeat
/// (`?category=1&category=3`); single-valued keys are collected too so a
/// repeated one never rejects the request, and the last value is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub q: Vec<String>,
    #[serde(default)]
    pub status: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub theme: Vec<String>,
    #[serde(default)]
    pub collection: Vec<String>,
    #[serde(default)]
    pub size: Vec<String>,
    #[serde(default)]
    pub price_min: Vec<String>,
    #[serde(default)]
    pub price_max: Vec<String>,
    #[serde(default)]
    pub order: Vec<String>,
    #[serde(default)]
    pub per_page: Vec<String>,
    #[serde(default)]
    pub page: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogOrder {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    MostViewed,
    YearDesc,
    YearAsc,
    TitleAsc,
    TitleDesc,
}

impl CatalogOrder {
    /// Anything outside the allow-list falls back to newest first.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("-created_at") => Self::Newest,
            Some("created_at") => Self::Oldest,
            Some("price") => Self::PriceAsc,
            Some("-price") => Self::PriceDesc,
            Some("-views") => Self::MostViewed,
            Some("-created_year") => Self::YearDesc,
            Some("created_year") => Self::YearAsc,
            Some("title") => Self::TitleAsc,
            Some("-title") => Self::TitleDesc,
            _ => Self::default(),
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Newest => "-created_at",
            Self::Oldest => "created_at",
            Self::PriceAsc => "price",
            Self::PriceDesc => "-price",
            Self::MostViewed => "-views",
            Self::YearDesc => "-created_year",
            Self::YearAsc => "created_year",
            Self::TitleAsc => "title",
            Self::TitleDesc => "-title",
        }
    }
}

/// Structural filters; an empty list means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtworkFilter {
    pub statuses: Vec<ArtworkStatus>,
    pub category_ids: Vec<i32>,
    pub theme_ids: Vec<i32>,
    pub collection_ids: Vec<i32>,
    pub sizes: Vec<SizeBucket>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub text: Option<String>,
    pub filter: ArtworkFilter,
    pub order: CatalogOrder,
    pub page: PageRequest,
}

/// Normalized selections echoed back so forms can re-render them.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEcho {
    pub query: String,
    pub selected_statuses: Vec<ArtworkStatus>,
    pub selected_categories: Vec<i32>,
    pub selected_themes: Vec<i32>,
    pub selected_collections: Vec<i32>,
    pub selected_sizes: Vec<SizeBucket>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub per_page: u64,
    pub current_order: &'static str,
    pub show_available_only: bool,
}

impl From<CatalogParams> for CatalogQuery {
    fn from(params: CatalogParams) -> Self {
        let text = last_value(params.q)
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        let filter = ArtworkFilter {
            statuses: dedup(params.status.iter().filter_map(|s| ArtworkStatus::from_param(s.trim()))),
            category_ids: dedup(params.category.iter().filter_map(|s| s.trim().parse().ok())),
            theme_ids: dedup(params.theme.iter().filter_map(|s| s.trim().parse().ok())),
            collection_ids: dedup(params.collection.iter().filter_map(|s| s.trim().parse().ok())),
            sizes: dedup(params.size.iter().filter_map(|s| SizeBucket::from_param(s.trim()))),
            price_min: parse_price(last_value(params.price_min).as_deref()).map(|p| p.ceil() as i64),
            price_max: parse_price(last_value(params.price_max).as_deref()).map(|p| p.floor() as i64),
        };

        Self {
            text,
            filter,
            order: CatalogOrder::from_param(last_value(params.order).as_deref()),
            page: PageRequest::new(
                per_page_from_param(last_value(params.per_page).as_deref()),
                last_value(params.page),
            ),
        }
    }
}

impl CatalogQuery {
    pub fn echo(&self) -> CatalogEcho {
        CatalogEcho {
            query: self.text.clone().unwrap_or_default(),
            selected_statuses: self.filter.statuses.clone(),
            selected_categories: self.filter.category_ids.clone(),
            selected_themes: self.filter.theme_ids.clone(),
            selected_collections: self.filter.collection_ids.clone(),
            selected_sizes: self.filter.sizes.clone(),
            price_min: self.filter.price_min,
            price_max: self.filter.price_max,
            per_page: self.page.per_page,
            current_order: self.order.as_param(),
            show_available_only: self.filter.statuses == [ArtworkStatus::Available],
        }
    }
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|p| p.is_finite())
}

fn dedup<T: PartialEq>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}
