// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::patch::Field;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    /// Roles allowed to publish teaching dynamics.
    pub fn can_author_dynamics(&self) -> bool {
        matches!(self, UserRole::Teacher | UserRole::Admin)
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    /// Unique, used as the foreign key of authored content.
    pub email: String,

    pub name: String,
    pub role: UserRole,
    pub country: Option<String>,
    pub picture: Option<String>,
    pub preferred_color: Option<String>,
    pub preferred_language: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Author fields joined onto posts, dynamics, exercises and testimonies.
/// Columns are selected with an `author_` prefix (see `db::users::AUTHOR_COLUMNS`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuthorSummary {
    #[sqlx(rename = "author_id")]
    pub id: String,
    #[sqlx(rename = "author_email")]
    pub email: String,
    #[sqlx(rename = "author_name")]
    pub name: String,
    #[sqlx(rename = "author_picture")]
    pub picture: Option<String>,
    #[sqlx(rename = "author_role")]
    pub role: UserRole,
}

/// DTO for creating a user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub name: String,

    pub role: Option<UserRole>,
    pub country: Option<String>,
    pub picture: Option<String>,
    pub preferred_color: Option<String>,
    pub preferred_language: Option<String>,
}

/// DTO for updating a user. The email is the lookup key and never changes.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default)]
    pub country: Field<String>,
    #[serde(default)]
    pub picture: Field<String>,
    #[serde(default)]
    pub preferred_color: Field<String>,
    #[serde(default)]
    pub preferred_language: Field<String>,
}
