// src/models/exercise_package.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::exercise::{Exercise, ExerciseSummary};
use crate::models::level::DifficultyLevel;
use crate::utils::patch::Field;
use crate::utils::query::bool_flag;

pub const DEFAULT_MAX_EXERCISES: i64 = 30;

/// Represents the 'exercise_packages' table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePackage {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub max_exercises: i64,
    pub is_published: bool,
    pub featured: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Per-user progress through one package.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPackageCompletion {
    pub user_id: String,
    pub package_id: String,
    #[sqlx(json)]
    pub completed_exercises: Vec<String>,
    pub completion_rate: f64,
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Progress as reported to clients; all zero when nothing was completed yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub completed_exercises: Vec<String>,
    pub completion_rate: f64,
    pub last_activity_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<UserPackageCompletion> for ProgressView {
    fn from(c: UserPackageCompletion) -> Self {
        Self {
            completed_exercises: c.completed_exercises,
            completion_rate: c.completion_rate,
            last_activity_at: Some(c.last_activity_at),
        }
    }
}

/// Result of recording one completed exercise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub completed_exercises: Vec<String>,
    pub completion_rate: f64,
}

/// Adds `exercise_id` to the completed set (once) and recomputes the rate
/// as `completed / total * 100`; an empty package has rate 0.
pub fn record_completion(
    mut completed: Vec<String>,
    exercise_id: &str,
    total_exercises: i64,
) -> CompletionResult {
    if !completed.iter().any(|id| id == exercise_id) {
        completed.push(exercise_id.to_string());
    }
    let completion_rate = if total_exercises > 0 {
        completed.len() as f64 / total_exercises as f64 * 100.0
    } else {
        0.0
    };
    CompletionResult {
        completed_exercises: completed,
        completion_rate,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageListItem {
    #[serde(flatten)]
    pub package: ExercisePackage,
    pub exercises: Vec<ExerciseSummary>,
    pub exercise_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetail {
    #[serde(flatten)]
    pub package: ExercisePackage,
    pub exercises: Vec<Exercise>,
    pub exercise_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_progress: Option<ProgressView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageExercise {
    #[serde(flatten)]
    pub exercise: Exercise,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSearchItem {
    #[serde(flatten)]
    pub package: ExercisePackage,
    pub exercises: Vec<ExerciseSummary>,
    pub matching_exercises: Vec<ExerciseSummary>,
    pub total_matches: usize,
    pub exercise_count: usize,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields: title, slug, description"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields: title, slug, description"))]
    pub slug: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields: title, slug, description"))]
    pub description: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[validate(range(min = 0, message = "maxExercises must not be negative"))]
    pub max_exercises: Option<i64>,
    pub is_published: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackageRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Slug must not be empty"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub category: Field<String>,
    #[serde(default)]
    pub image_url: Field<String>,
    #[serde(default)]
    pub meta_title: Field<String>,
    #[serde(default)]
    pub meta_description: Field<String>,
    #[validate(range(min = 0, message = "maxExercises must not be negative"))]
    pub max_exercises: Option<i64>,
    pub is_published: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageListParams {
    pub category: Option<String>,
    #[serde(default, deserialize_with = "bool_flag")]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "bool_flag")]
    pub is_published: Option<bool>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub user_email: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct PackageFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub is_published: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEmailParams {
    pub user_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageExerciseParams {
    pub difficulty: Option<DifficultyLevel>,
    pub user_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSearchParams {
    pub q: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub category: Option<String>,
    pub min_matches: Option<usize>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddExerciseRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Exercise ID is required"))]
    pub exercise_id: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteExerciseRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Exercise ID and user email are required"))]
    pub exercise_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Exercise ID and user email are required"))]
    pub user_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_is_deduplicated() {
        let first = record_completion(Vec::new(), "ex-1", 4);
        assert_eq!(first.completed_exercises, vec!["ex-1"]);
        assert_eq!(first.completion_rate, 25.0);

        let again = record_completion(first.completed_exercises, "ex-1", 4);
        assert_eq!(again.completed_exercises.len(), 1);
        assert_eq!(again.completion_rate, 25.0);
    }

    #[test]
    fn empty_package_has_zero_rate() {
        let result = record_completion(Vec::new(), "ex-1", 0);
        assert_eq!(result.completion_rate, 0.0);
    }

    #[test]
    fn full_package_reaches_one_hundred() {
        let result = record_completion(vec!["a".into(), "b".into()], "c", 3);
        assert_eq!(result.completion_rate, 100.0);
    }
}
