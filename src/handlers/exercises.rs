// src/handlers/exercises.rs

use std::collections::BTreeSet;

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::Database,
    error::{AppError, is_foreign_key_violation},
    models::exercise::{
        BulkExerciseRequest, CreateExerciseRequest, ExerciseAuthorParams, ExerciseFilter,
        ExerciseListParams, UpdateExerciseRequest,
    },
    response::{ApiResponse, Pagination},
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        query::{PageRequest, json_list, non_empty},
    },
};

const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maps a dangling `packageId` to a client error.
fn package_reference_error(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        AppError::BadRequest("Exercise package not found".to_string())
    } else {
        err.into()
    }
}

/// Paginated listing. `tags` matches any of the comma-separated tags and
/// `search` looks at title and instructions.
pub async fn list_exercises(
    State(db): State<Database>,
    AppQuery(params): AppQuery<ExerciseListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_PAGE_SIZE)?;
    let filter = ExerciseFilter {
        exercise_type: non_empty(params.exercise_type),
        difficulty: params.difficulty,
        category: non_empty(params.category),
        author_email: non_empty(params.author_email),
        is_published: params.is_published,
        tags: json_list(params.tags.as_deref()),
        search: non_empty(params.search),
    };

    let (exercises, total) = db.list_exercises(&filter, page).await?;
    Ok(ApiResponse::paginated(exercises, Pagination::new(page.page, page.limit, total)))
}

pub async fn get_exercise(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let exercise = db
        .find_exercise(&id)
        .await?
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    Ok(ApiResponse::ok(exercise))
}

pub async fn list_exercises_by_author(
    State(db): State<Database>,
    AppPath(email): AppPath<String>,
    AppQuery(params): AppQuery<ExerciseAuthorParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ExerciseFilter {
        exercise_type: non_empty(params.exercise_type),
        difficulty: params.difficulty,
        is_published: params.is_published,
        author_email: Some(email),
        ..Default::default()
    };
    let exercises = db.find_exercises(&filter).await?;
    Ok(ApiResponse::ok(exercises))
}

/// Creates one exercise. `content` may arrive as an object or as a JSON string.
pub async fn create_exercise(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreateExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. The author must exist
    if db.find_user_by_email(&payload.author_email).await?.is_none() {
        return Err(AppError::NotFound("Author not found".to_string()));
    }

    // 3. Insert
    let exercise = db
        .create_exercise(payload)
        .await
        .map_err(package_reference_error)?;

    tracing::info!("Created exercise {}", exercise.id);
    Ok(ApiResponse::created(exercise).with_message("Exercise created successfully"))
}

/// Creates several exercises atomically; one bad element rejects the batch.
pub async fn create_exercises_bulk(
    State(db): State<Database>,
    AppJson(payload): AppJson<BulkExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate every element up front
    payload.validate()?;

    // 2. Every referenced author must exist
    let authors: BTreeSet<&str> = payload
        .exercises
        .iter()
        .map(|e| e.author_email.as_str())
        .collect();
    for email in authors {
        if db.find_user_by_email(email).await?.is_none() {
            return Err(AppError::NotFound(format!("Author not found: {}", email)));
        }
    }

    // 3. Insert all in one transaction
    let exercises = db
        .create_exercises_bulk(payload.exercises)
        .await
        .map_err(package_reference_error)?;

    tracing::info!("Bulk-created {} exercises", exercises.len());
    let message = format!("{} exercises created successfully", exercises.len());
    Ok(ApiResponse::created(exercises).with_message(message))
}

pub async fn update_exercise(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<UpdateExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exercise = db
        .update_exercise(&id, payload)
        .await
        .map_err(package_reference_error)?
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    Ok(ApiResponse::ok(exercise).with_message("Exercise updated successfully"))
}

pub async fn delete_exercise(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.delete_exercise(&id).await? {
        return Err(AppError::NotFound("Exercise not found".to_string()));
    }
    Ok(ApiResponse::message("Exercise deleted successfully"))
}

/// Bumps the exercise's completion counter.
pub async fn complete_exercise(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.increment_exercise_completions(&id).await? {
        return Err(AppError::NotFound("Exercise not found".to_string()));
    }

    let exercise = db
        .find_exercise(&id)
        .await?
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    Ok(ApiResponse::ok(exercise).with_message("Exercise marked as completed"))
}
