// src/models/difficulty_box.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::level::DifficultyLevel;

/// Package fields joined onto a difficulty box.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackageRef {
    #[sqlx(rename = "pkg_id")]
    pub id: String,
    #[sqlx(rename = "pkg_title")]
    pub title: String,
    #[sqlx(rename = "pkg_slug")]
    pub slug: String,
    #[sqlx(rename = "pkg_category")]
    pub category: Option<String>,
}

/// Introductory article shown above one difficulty level of a package.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyBox {
    pub id: String,
    pub package_id: String,
    pub difficulty: DifficultyLevel,
    pub title: String,
    pub article: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    #[sqlx(flatten)]
    pub package: PackageRef,
}

/// `packageInfo` member of the per-package listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PackageInfo {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDifficultyBoxRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        message = "Required fields missing: packageId, difficulty, title, article"
    ))]
    pub package_id: String,
    #[validate(required(message = "Required fields missing: packageId, difficulty, title, article"))]
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    #[validate(length(
        min = 1,
        message = "Required fields missing: packageId, difficulty, title, article"
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(length(
        min = 1,
        message = "Required fields missing: packageId, difficulty, title, article"
    ))]
    pub article: String,
}

/// One entry of a bulk create; the package comes from the enclosing request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DifficultyBoxEntry {
    #[validate(required(message = "Each difficulty box must have difficulty, title, and article"))]
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Each difficulty box must have difficulty, title, and article"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Each difficulty box must have difficulty, title, and article"))]
    pub article: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkDifficultyBoxRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "packageId and difficultyBoxes array are required"))]
    pub package_id: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "packageId and difficultyBoxes array are required"),
        nested
    )]
    pub difficulty_boxes: Vec<DifficultyBoxEntry>,
}

/// Only the text can change; the (package, difficulty) pair is fixed.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDifficultyBoxRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Article must not be empty"))]
    pub article: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyBoxListParams {
    pub package_id: Option<String>,
}
