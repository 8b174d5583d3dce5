//! Harvested field (crop batch) models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A harvested crop batch, named after the field it came from.
///
/// Stock entering storage is always attributed to a field; the field's name
/// is denormalized into intake and movement records so history survives
/// field deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: Uuid,
    pub name: String,
    /// Free-text area description, e.g. "36 Acres Maincrop Potato"
    pub area: String,
    pub crop_type: String,
    pub variety: Option<String>,
    pub harvest_year: i32,
    /// Grades this field's stock can be booked in under. Empty means
    /// ungraded intake is accepted with any grade label.
    pub grades: Vec<String>,
    /// Explicit crop classifier, fixed at creation time.
    pub crop_class: Option<CropClass>,
    pub created_at: DateTime<Utc>,
}

/// Crop classification, decided when the field is created.
///
/// Replaces the variety-name guessing the reporting screens used to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropClass {
    RedOnion,
    BrownOnion,
}

impl CropClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropClass::RedOnion => "red_onion",
            CropClass::BrownOnion => "brown_onion",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "red_onion" => Some(CropClass::RedOnion),
            "brown_onion" => Some(CropClass::BrownOnion),
            _ => None,
        }
    }
}

impl std::fmt::Display for CropClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropClass::RedOnion => write!(f, "Red Onion"),
            CropClass::BrownOnion => write!(f, "Brown Onion"),
        }
    }
}

impl Field {
    /// Whether intake under `grade` is allowed for this field.
    pub fn accepts_grade(&self, grade: &str) -> bool {
        self.grades.is_empty() || self.grades.iter().any(|g| g == grade)
    }
}
