// src/handlers/page_config.rs

use axum::{body::Bytes, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::Database,
    error::AppError,
    models::page_config::{
        CreatePageConfigRequest, PageConfig, ResetPageConfigRequest, UpdatePageConfigRequest,
    },
    response::ApiResponse,
    utils::extract::{AppJson, AppPath},
};

fn not_found() -> AppError {
    AppError::NotFound("Page configuration not found".to_string())
}

/// Returns the single site configuration, or `data: null` before one exists.
pub async fn get_page_config(State(db): State<Database>) -> Result<impl IntoResponse, AppError> {
    match db.latest_page_config().await? {
        Some(config) => Ok(ApiResponse::ok(Some(config))),
        None => Ok(ApiResponse::<Option<PageConfig>>::ok(None)
            .with_message("No page configuration found. Please create one.")),
    }
}

/// The subset of the configuration the public site needs.
pub async fn get_public_page_config(
    State(db): State<Database>,
) -> Result<impl IntoResponse, AppError> {
    let config = db
        .latest_page_config()
        .await?
        .ok_or(AppError::NotFound("Page configuration not found".to_string()))?;

    Ok(ApiResponse::ok(config.public))
}

/// Creates the configuration. At most one row may exist.
pub async fn create_page_config(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreatePageConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Singleton check
    if db.page_config_exists().await? {
        return Err(AppError::BadRequest(
            "Page configuration already exists. Use update endpoint instead.".to_string(),
        ));
    }

    // 3. Insert
    let config = db.create_page_config(payload).await?;

    tracing::info!("Created page configuration {}", config.id);
    Ok(ApiResponse::created(config).with_message("Page configuration created successfully"))
}

pub async fn update_page_config(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<UpdatePageConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let config = db
        .update_page_config(&id, payload)
        .await?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::ok(config).with_message("Page configuration updated successfully"))
}

/// Restores defaults. The body is optional and may carry `updatedBy`.
pub async fn reset_page_config(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request: ResetPageConfigRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ResetPageConfigRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let config = db
        .reset_page_config(&id, request.updated_by)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!("Reset page configuration {}", id);
    Ok(ApiResponse::ok(config).with_message("Page configuration reset to defaults successfully"))
}
