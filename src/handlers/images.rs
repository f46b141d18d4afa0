// src/handlers/images.rs

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    response::ApiResponse,
    storage::{
        ImageStore, ImageUpload,
        images::{MAX_IMAGE_BYTES, MAX_LISTED_IMAGES},
    },
    utils::extract::AppPath,
};

pub async fn list_images(
    State(images): State<Arc<dyn ImageStore>>,
) -> Result<impl IntoResponse, AppError> {
    let images = images.list(MAX_LISTED_IMAGES).await?;
    Ok(ApiResponse::ok(images))
}

/// Accepts a multipart form with one `file` part holding an image.
pub async fn upload_image(
    State(images): State<Arc<dyn ImageStore>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    // 1. Find the `file` part
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        upload = Some(ImageUpload {
            file_name,
            content_type,
            data: data.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or(AppError::BadRequest("No file provided".to_string()))?;

    // 2. Only images, up to the size limit
    if !upload.content_type.starts_with("image/") {
        return Err(AppError::BadRequest("Only image files are allowed".to_string()));
    }
    if upload.data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {}MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    // 3. Store
    let image = images.upload(upload).await?;
    Ok(ApiResponse::created(image).with_message("Image uploaded successfully"))
}

/// Public ids contain a slash (`uploads/<name>`), so the route uses a wildcard.
pub async fn delete_image(
    State(images): State<Arc<dyn ImageStore>>,
    AppPath(public_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !images.delete(&public_id).await? {
        return Err(AppError::NotFound("Image not found or already deleted".to_string()));
    }

    tracing::info!("Deleted image {}", public_id);
    Ok(ApiResponse::message("Image deleted successfully"))
}
