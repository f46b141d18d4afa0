// src/models/post.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::user::AuthorSummary;
use crate::utils::patch::Field;
use crate::utils::query::{SortField, SortOrder, bool_flag};

/// Represents the 'posts' table joined with its author.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub author_email: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    #[sqlx(flatten)]
    pub user: AuthorSummary,
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub slug: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub summary: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub author_email: String,

    pub cover_image: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

/// DTO for updating a post. Present fields are written, the slug never changes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Field<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListParams {
    #[serde(default, deserialize_with = "bool_flag")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "bool_flag")]
    pub featured: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub order_by: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

/// Filters for the per-author listings of posts and dynamics.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorListParams {
    #[serde(default, deserialize_with = "bool_flag")]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "bool_flag")]
    pub featured: Option<bool>,
}

/// Shared WHERE-clause inputs for post queries.
#[derive(Debug, Default, Clone)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub author_email: Option<String>,
}
