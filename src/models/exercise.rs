// src/models/exercise.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

use crate::models::level::DifficultyLevel;
use crate::models::user::AuthorSummary;
use crate::utils::patch::Field;
use crate::utils::query::bool_flag;

/// Represents the 'exercises' table joined with its author.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub instructions: Option<String>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub exercise_type: String,
    /// Free-form exercise body (questions, options, answers).
    pub content: Json<Value>,
    pub difficulty: DifficultyLevel,
    pub category: Option<String>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    #[sqlx(json)]
    pub hints: Vec<String>,
    pub explanation: Option<String>,
    pub is_published: bool,
    pub times_completed: i64,
    pub author_email: String,
    pub package_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    #[sqlx(flatten)]
    pub user: AuthorSummary,
}

/// Compact exercise view embedded in package listings.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSummary {
    pub id: String,
    pub title: String,
    pub difficulty: DifficultyLevel,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub exercise_type: String,
    #[serde(skip)]
    pub package_id: Option<String>,
}

/// Accepts exercise content either as a JSON value or as a string holding JSON.
fn content_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(raw)) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Ok(Some(other)),
    }
}

/// DTO for creating one exercise (also the element type of bulk creation).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub title: String,

    #[serde(rename = "type", default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub exercise_type: String,

    #[serde(default, deserialize_with = "content_value")]
    #[validate(required(message = "Missing required fields"))]
    pub content: Option<Value>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub author_email: String,

    pub instructions: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    pub explanation: Option<String>,
    pub is_published: Option<bool>,
    pub package_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkExerciseRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Invalid exercises array"), nested)]
    pub exercises: Vec<CreateExerciseRequest>,
}

/// DTO for updating an exercise; present fields are written.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExerciseRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub instructions: Field<String>,
    #[serde(rename = "type")]
    pub exercise_type: Option<String>,
    #[serde(default, deserialize_with = "content_value")]
    pub content: Option<Value>,
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default)]
    pub category: Field<String>,
    pub tags: Option<Vec<String>>,
    pub hints: Option<Vec<String>>,
    #[serde(default)]
    pub explanation: Field<String>,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub package_id: Field<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseListParams {
    #[serde(rename = "type")]
    pub exercise_type: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub category: Option<String>,
    pub author_email: Option<String>,
    #[serde(default, deserialize_with = "bool_flag")]
    pub is_published: Option<bool>,
    /// Comma-separated; matches exercises carrying any of the tags.
    pub tags: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseAuthorParams {
    #[serde(rename = "type")]
    pub exercise_type: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    #[serde(default, deserialize_with = "bool_flag")]
    pub is_published: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct ExerciseFilter {
    pub exercise_type: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub category: Option<String>,
    pub author_email: Option<String>,
    pub is_published: Option<bool>,
    /// JSON array text of tags to match against.
    pub tags: Option<String>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_content_is_parsed_as_json() {
        let req: CreateExerciseRequest = serde_json::from_value(serde_json::json!({
            "title": "Verbs",
            "type": "MULTIPLE_CHOICE",
            "content": "{\"questions\": [1, 2]}",
            "authorEmail": "a@b.c"
        }))
        .unwrap();
        assert_eq!(req.content, Some(serde_json::json!({"questions": [1, 2]})));
        assert!(req.tags.is_empty());
    }

    #[test]
    fn invalid_string_content_is_rejected() {
        let res: Result<CreateExerciseRequest, _> = serde_json::from_value(serde_json::json!({
            "title": "Verbs",
            "type": "MULTIPLE_CHOICE",
            "content": "{not json",
            "authorEmail": "a@b.c"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn missing_content_fails_validation() {
        let req: CreateExerciseRequest = serde_json::from_value(serde_json::json!({
            "title": "Verbs",
            "type": "MULTIPLE_CHOICE",
            "authorEmail": "a@b.c"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn bulk_request_validates_every_element() {
        let empty: BulkExerciseRequest =
            serde_json::from_value(serde_json::json!({ "exercises": [] })).unwrap();
        assert!(empty.validate().is_err());

        let one_bad: BulkExerciseRequest = serde_json::from_value(serde_json::json!({
            "exercises": [
                { "title": "A", "type": "quiz", "content": {}, "authorEmail": "a@b.c" },
                { "title": "", "type": "quiz", "content": {}, "authorEmail": "a@b.c" }
            ]
        }))
        .unwrap();
        assert!(one_bad.validate().is_err());

        let good: BulkExerciseRequest = serde_json::from_value(serde_json::json!({
            "exercises": [{ "title": "A", "type": "quiz", "content": {}, "authorEmail": "a@b.c" }]
        }))
        .unwrap();
        assert!(good.validate().is_ok());
    }
}
