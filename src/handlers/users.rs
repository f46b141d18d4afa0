// src/handlers/users.rs

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::Database,
    error::AppError,
    models::user::{CreateUserRequest, UpdateUserRequest},
    response::ApiResponse,
    utils::extract::{AppJson, AppPath},
};

/// Lists every user.
pub async fn list_users(State(db): State<Database>) -> Result<impl IntoResponse, AppError> {
    let users = db.list_users().await?;
    Ok(ApiResponse::ok(users))
}

/// Fetches one user by email.
pub async fn get_user_by_email(
    State(db): State<Database>,
    AppPath(email): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = db
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(user))
}

/// Registers a user. Emails are unique.
pub async fn create_user(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Reject duplicates before inserting
    if db.find_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("User with this email already exists".to_string()));
    }

    // 3. Insert; a concurrent insert still ends up as the same conflict
    let user = db.create_user(payload).await.map_err(|e| {
        AppError::unique_violation_or(
            e,
            AppError::Conflict("User with this email already exists".to_string()),
        )
    })?;

    tracing::info!("Created user {}", user.email);
    Ok(ApiResponse::created(user).with_message("User created successfully"))
}

/// Partially updates a user; only fields present in the body are written.
pub async fn update_user(
    State(db): State<Database>,
    AppPath(email): AppPath<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = db
        .update_user(&email, payload)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::ok(user).with_message("User updated successfully"))
}
