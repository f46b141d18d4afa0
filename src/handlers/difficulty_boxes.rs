// src/handlers/difficulty_boxes.rs

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::Database,
    error::AppError,
    models::{
        difficulty_box::{
            BulkDifficultyBoxRequest, CreateDifficultyBoxRequest, DifficultyBoxListParams,
            UpdateDifficultyBoxRequest,
        },
        level::DifficultyLevel,
    },
    response::ApiResponse,
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        query::non_empty,
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Difficulty box not found".to_string())
}

fn package_not_found() -> AppError {
    AppError::NotFound("Exercise package not found".to_string())
}

fn duplicate_level() -> AppError {
    AppError::BadRequest(
        "A difficulty box already exists for this package and difficulty level".to_string(),
    )
}

/// Accepts `beginner`, `Beginner` and `BEGINNER`.
fn parse_level(raw: &str) -> Result<DifficultyLevel, AppError> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_uppercase()))
        .map_err(|_| AppError::BadRequest(format!("Invalid difficulty level: {}", raw)))
}

pub async fn list_boxes(
    State(db): State<Database>,
    AppQuery(params): AppQuery<DifficultyBoxListParams>,
) -> Result<impl IntoResponse, AppError> {
    let package_id = non_empty(params.package_id);
    let boxes = db.list_difficulty_boxes(package_id.as_deref()).await?;
    Ok(ApiResponse::ok(boxes))
}

pub async fn get_box(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let difficulty_box = db.find_difficulty_box(&id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::ok(difficulty_box))
}

/// All boxes of one package, easiest first, plus `packageInfo`.
pub async fn list_boxes_for_package(
    State(db): State<Database>,
    AppPath(package_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let info = db
        .package_info(&package_id)
        .await?
        .ok_or_else(package_not_found)?;
    let boxes = db.list_difficulty_boxes(Some(&package_id)).await?;

    Ok(ApiResponse::ok(boxes).with_field("packageInfo", info))
}

pub async fn get_box_for_level(
    State(db): State<Database>,
    AppPath((package_id, difficulty)): AppPath<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let difficulty = parse_level(&difficulty)?;
    let difficulty_box = db
        .find_difficulty_box_for_level(&package_id, difficulty)
        .await?
        .ok_or(AppError::NotFound(
            "Difficulty box not found for this package and difficulty level".to_string(),
        ))?;

    Ok(ApiResponse::ok(difficulty_box))
}

/// Creates one box. Each (package, difficulty) pair holds at most one box.
pub async fn create_box(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreateDifficultyBoxRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;
    let difficulty = payload.difficulty.unwrap_or_default();

    // 2. The package must exist and the level must be free
    if db.package_info(&payload.package_id).await?.is_none() {
        return Err(package_not_found());
    }
    if db
        .find_difficulty_box_for_level(&payload.package_id, difficulty)
        .await?
        .is_some()
    {
        return Err(duplicate_level());
    }

    // 3. Insert
    let difficulty_box = db
        .create_difficulty_box(&payload.package_id, difficulty, payload.title, payload.article)
        .await
        .map_err(|e| AppError::unique_violation_or(e, duplicate_level()))?;

    tracing::info!(
        "Created {} difficulty box for package {}",
        difficulty.as_str(),
        difficulty_box.package_id
    );
    Ok(ApiResponse::created(difficulty_box).with_message("Difficulty box created successfully"))
}

/// Creates several boxes for one package in a single transaction.
pub async fn create_boxes_bulk(
    State(db): State<Database>,
    AppJson(payload): AppJson<BulkDifficultyBoxRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload and entries
    payload.validate()?;

    // 2. The package must exist
    if db.package_info(&payload.package_id).await?.is_none() {
        return Err(package_not_found());
    }

    // 3. Insert all; a taken level rolls back the batch
    let boxes = db
        .create_difficulty_boxes_bulk(&payload.package_id, payload.difficulty_boxes)
        .await
        .map_err(|e| AppError::unique_violation_or(e, duplicate_level()))?;

    let message = format!("{} difficulty boxes created successfully", boxes.len());
    Ok(ApiResponse::created(boxes).with_message(message))
}

pub async fn update_box(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<UpdateDifficultyBoxRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let difficulty_box = db
        .update_difficulty_box(&id, payload)
        .await?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::ok(difficulty_box).with_message("Difficulty box updated successfully"))
}

pub async fn delete_box(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.delete_difficulty_box(&id).await? {
        return Err(not_found());
    }
    Ok(ApiResponse::message("Difficulty box deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_in_path_is_case_insensitive() {
        assert_eq!(parse_level("beginner").unwrap(), DifficultyLevel::Beginner);
        assert_eq!(parse_level("ADVANCED").unwrap(), DifficultyLevel::Advanced);
        assert!(parse_level("expert").is_err());
    }
}
