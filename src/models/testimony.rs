// src/models/testimony.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::user::AuthorSummary;

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimony {
    pub id: String,
    pub content: String,
    pub rating: i64,
    pub user_email: String,
    pub featured: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    #[sqlx(flatten)]
    pub user: AuthorSummary,
}

/// DTO for creating a testimony. New testimonies are never featured.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestimonyRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub content: String,

    #[validate(
        required(message = "Missing required fields"),
        range(min = 1, max = 5, message = "Rating must be between 1 and 5")
    )]
    pub rating: Option<i64>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub user_email: String,
}
