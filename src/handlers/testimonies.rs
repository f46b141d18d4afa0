// src/handlers/testimonies.rs

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::Database,
    error::AppError,
    models::testimony::CreateTestimonyRequest,
    response::ApiResponse,
    utils::extract::{AppJson, AppPath},
};

/// All testimonies, newest first.
pub async fn list_testimonies(State(db): State<Database>) -> Result<impl IntoResponse, AppError> {
    let testimonies = db.list_testimonies(None, None).await?;
    Ok(ApiResponse::ok(testimonies))
}

pub async fn list_featured_testimonies(
    State(db): State<Database>,
) -> Result<impl IntoResponse, AppError> {
    let testimonies = db.list_testimonies(Some(true), None).await?;
    Ok(ApiResponse::ok(testimonies))
}

pub async fn list_testimonies_by_user(
    State(db): State<Database>,
    AppPath(email): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let testimonies = db.list_testimonies(None, Some(&email)).await?;
    Ok(ApiResponse::ok(testimonies))
}

/// Records a testimony. New testimonies are never featured.
pub async fn create_testimony(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreateTestimonyRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. The author must exist
    if db.find_user_by_email(&payload.user_email).await?.is_none() {
        return Err(AppError::BadRequest("User not found".to_string()));
    }

    // 3. Insert
    let rating = payload.rating.unwrap_or_default();
    let testimony = db
        .create_testimony(payload.content, rating, payload.user_email)
        .await?;

    Ok(ApiResponse::created(testimony).with_message("Testimony created successfully"))
}
