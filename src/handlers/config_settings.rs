// src/handlers/config_settings.rs

use std::collections::HashSet;

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::{Database, config_settings::SettingKey},
    error::AppError,
    models::config_setting::{
        BulkConfigSettingRequest, ConfigSettingFilter, ConfigSettingListParams,
        CreateConfigSettingRequest, UpdateConfigSettingRequest,
    },
    response::{ApiResponse, Pagination},
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        query::{PageRequest, non_empty},
    },
};

const DEFAULT_PAGE_SIZE: i64 = 20;

fn duplicate_key(key: &str) -> AppError {
    AppError::BadRequest(format!("Configuration setting with key '{}' already exists", key))
}

fn not_found() -> AppError {
    AppError::NotFound("Configuration setting not found".to_string())
}

pub async fn list_settings(
    State(db): State<Database>,
    AppQuery(params): AppQuery<ConfigSettingListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_PAGE_SIZE)?;
    let filter = ConfigSettingFilter {
        category: non_empty(params.category),
        is_public: params.is_public,
        data_type: non_empty(params.data_type),
    };

    let (settings, total) = db.list_config_settings(&filter, page).await?;
    Ok(ApiResponse::paginated(settings, Pagination::new(page.page, page.limit, total)))
}

/// Settings flagged as safe for anonymous clients.
pub async fn list_public_settings(State(db): State<Database>) -> Result<impl IntoResponse, AppError> {
    let settings = db.public_config_settings().await?;
    Ok(ApiResponse::ok(settings))
}

pub async fn list_settings_by_category(
    State(db): State<Database>,
    AppPath(category): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let settings = db.config_settings_in_category(&category).await?;
    Ok(ApiResponse::ok(settings))
}

pub async fn get_setting(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let setting = db.find_config_setting(&id).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::ok(setting))
}

pub async fn get_setting_by_key(
    State(db): State<Database>,
    AppPath(key): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let setting = db.find_config_setting_by_key(&key).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::ok(setting))
}

/// Creates a setting. Keys are unique (400 on duplicates).
pub async fn create_setting(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreateConfigSettingRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Key must be free
    if db.find_config_setting_by_key(&payload.key).await?.is_some() {
        return Err(duplicate_key(&payload.key));
    }

    // 3. Insert
    let key = payload.key.clone();
    let setting = db
        .create_config_setting(payload)
        .await
        .map_err(|e| AppError::unique_violation_or(e, duplicate_key(&key)))?;

    tracing::info!("Created config setting {}", setting.key);
    Ok(ApiResponse::created(setting).with_message("Configuration setting created successfully"))
}

/// Creates several settings in one transaction; any duplicate rejects the batch.
pub async fn create_settings_bulk(
    State(db): State<Database>,
    AppJson(payload): AppJson<BulkConfigSettingRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate every element
    payload.validate()?;

    // 2. Keys must be unique within the batch and unused in the store
    let mut seen = HashSet::new();
    for setting in &payload.settings {
        if !seen.insert(setting.key.as_str()) {
            return Err(duplicate_key(&setting.key));
        }
        if db.find_config_setting_by_key(&setting.key).await?.is_some() {
            return Err(duplicate_key(&setting.key));
        }
    }

    // 3. Insert all
    let settings = db
        .create_config_settings_bulk(payload.settings)
        .await
        .map_err(|e| {
            AppError::unique_violation_or(
                e,
                AppError::BadRequest("One or more configuration keys already exist".to_string()),
            )
        })?;

    let message = format!("{} configuration settings created successfully", settings.len());
    Ok(ApiResponse::created(settings).with_message(message))
}

pub async fn update_setting(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<UpdateConfigSettingRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let setting = db
        .update_config_setting(SettingKey::Id, &id, payload)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::ok(setting).with_message("Configuration setting updated successfully"))
}

pub async fn update_setting_by_key(
    State(db): State<Database>,
    AppPath(key): AppPath<String>,
    AppJson(payload): AppJson<UpdateConfigSettingRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let setting = db
        .update_config_setting(SettingKey::Key, &key, payload)
        .await?
        .ok_or_else(not_found)?;
    Ok(ApiResponse::ok(setting).with_message("Configuration setting updated successfully"))
}

pub async fn delete_setting(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.delete_config_setting(SettingKey::Id, &id).await? {
        return Err(not_found());
    }
    Ok(ApiResponse::message("Configuration setting deleted successfully"))
}

pub async fn delete_setting_by_key(
    State(db): State<Database>,
    AppPath(key): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.delete_config_setting(SettingKey::Key, &key).await? {
        return Err(not_found());
    }
    Ok(ApiResponse::message("Configuration setting deleted successfully"))
}
