//! Physical size buckets for artworks.
//!
//! `small` fits in 25×25 cm, `medium` fits in 40×60 cm in either
//! orientation, everything else is `large`. The catalog filter expresses the
//! same rule as range predicates (see `matches`), so both must stay in sync
//! with these constants.

use serde::{Deserialize, Serialize};

pub const SMALL_MAX_CM: i32 = 25;
pub const MEDIUM_SHORT_MAX_CM: i32 = 40;
pub const MEDIUM_LONG_MAX_CM: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 3] = [SizeBucket::Small, SizeBucket::Medium, SizeBucket::Large];

    pub fn classify(width_cm: i32, height_cm: i32) -> Self {
        if is_small_rect(width_cm, height_cm) {
            SizeBucket::Small
        } else if is_medium_rect(width_cm, height_cm) {
            SizeBucket::Medium
        } else {
            SizeBucket::Large
        }
    }

    /// Filter form of the bucket: medium excludes small, large is the
    /// complement of both.
    pub fn matches(self, width_cm: i32, height_cm: i32) -> bool {
        let small = is_small_rect(width_cm, height_cm);
        let medium = is_medium_rect(width_cm, height_cm) && !small;
        match self {
            SizeBucket::Small => small,
            SizeBucket::Medium => medium,
            SizeBucket::Large => !(small || medium),
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "small" => Some(SizeBucket::Small),
            "medium" => Some(SizeBucket::Medium),
            "large" => Some(SizeBucket::Large),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeBucket::Small => "small",
            SizeBucket::Medium => "medium",
            SizeBucket::Large => "large",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizeBucket::Small => "Маленькие",
            SizeBucket::Medium => "Средние",
            SizeBucket::Large => "Большие",
        }
    }

    /// Label used by the filter form.
    pub fn choice_label(self) -> &'static str {
        match self {
            SizeBucket::Small => "Маленькие (до 25×25)",
            SizeBucket::Medium => "Средние (до 40×60)",
            SizeBucket::Large => "Большие (свыше 40×60 см)",
        }
    }
}

fn is_small_rect(w: i32, h: i32) -> bool {
    w <= SMALL_MAX_CM && h <= SMALL_MAX_CM
}

fn is_medium_rect(w: i32, h: i32) -> bool {
    (w <= MEDIUM_SHORT_MAX_CM && h <= MEDIUM_LONG_MAX_CM)
        || (w <= MEDIUM_LONG_MAX_CM && h <= MEDIUM_SHORT_MAX_CM)
}
