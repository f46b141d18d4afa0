// src/models/dynamic.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::level::DifficultyLevel;
use crate::models::user::AuthorSummary;
use crate::utils::patch::Field;
use crate::utils::query::{SortField, SortOrder, bool_flag};

/// A classroom activity ("teaching dynamic") joined with its author.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dynamic {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub objective: String,
    pub description: String,
    pub content: String,
    pub materials_needed: Option<String>,
    /// Minutes.
    pub duration: i64,
    pub min_students: i64,
    pub max_students: Option<i64>,
    pub age_group: String,
    pub difficulty: DifficultyLevel,
    pub dynamic_type: String,
    pub featured: bool,
    pub published: bool,
    pub author_email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    #[sqlx(flatten)]
    pub user: AuthorSummary,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDynamicRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub slug: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub objective: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub author_email: String,
    #[validate(
        required(message = "Missing required fields"),
        range(min = 1, message = "Duration must be positive")
    )]
    pub duration: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub age_group: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub dynamic_type: String,

    pub materials_needed: Option<String>,
    pub min_students: Option<i64>,
    pub max_students: Option<i64>,
    pub difficulty: Option<DifficultyLevel>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

/// DTO for updating a dynamic.
///
/// Text fields, `duration` and `minStudents` are applied only when truthy
/// (non-empty, non-zero). `materialsNeeded` and `maxStudents` may be cleared
/// with `null`, and a zero `maxStudents` also clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDynamicRequest {
    pub title: Option<String>,
    pub objective: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub materials_needed: Field<String>,
    pub duration: Option<i64>,
    pub min_students: Option<i64>,
    #[serde(default)]
    pub max_students: Field<i64>,
    pub age_group: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub dynamic_type: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicListParams {
    #[serde(default, deserialize_with = "bool_flag")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "bool_flag")]
    pub featured: Option<bool>,
    pub dynamic_type: Option<String>,
    pub age_group: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub min_duration: Option<i64>,
    pub max_duration: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub order_by: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

#[derive(Debug, Default, Clone)]
pub struct DynamicFilter {
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub dynamic_type: Option<String>,
    pub age_group: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub min_duration: Option<i64>,
    pub max_duration: Option<i64>,
    pub author_email: Option<String>,
}
