// src/handlers/dynamics.rs

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::Database,
    error::AppError,
    models::{
        dynamic::{CreateDynamicRequest, DynamicFilter, DynamicListParams, UpdateDynamicRequest},
        post::AuthorListParams,
        user::UserRole,
    },
    response::{ApiResponse, Pagination},
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        query::{PageRequest, non_empty},
    },
};

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Creates a teaching dynamic.
///
/// Only TEACHER and ADMIN users may author dynamics, and only an ADMIN
/// can create one that is already featured.
pub async fn create_dynamic(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreateDynamicRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Resolve the author and check the role
    let author = db
        .find_user_by_email(&payload.author_email)
        .await?
        .ok_or(AppError::NotFound("Author not found".to_string()))?;

    if !author.role.can_author_dynamics() {
        return Err(AppError::Forbidden(
            "Only teachers and admins can create dynamics".to_string(),
        ));
    }

    // 3. Slug must be free
    if db.dynamic_slug_exists(&payload.slug).await? {
        return Err(AppError::Conflict("A dynamic with this slug already exists".to_string()));
    }

    // 4. Insert, downgrading `featured` for non-admins
    let featured = author.role == UserRole::Admin && payload.featured.unwrap_or(false);
    let dynamic = db.create_dynamic(payload, featured).await.map_err(|e| {
        AppError::unique_violation_or(
            e,
            AppError::Conflict("A dynamic with this slug already exists".to_string()),
        )
    })?;

    tracing::info!("Created dynamic {} by {}", dynamic.slug, author.email);
    Ok(ApiResponse::created(dynamic).with_message("Dynamic created successfully"))
}

/// Paginated listing with type, audience, difficulty and duration filters.
pub async fn list_dynamics(
    State(db): State<Database>,
    AppQuery(params): AppQuery<DynamicListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_PAGE_SIZE)?;
    let filter = DynamicFilter {
        published: params.published,
        featured: params.featured,
        dynamic_type: non_empty(params.dynamic_type),
        age_group: non_empty(params.age_group),
        difficulty: params.difficulty,
        min_duration: params.min_duration,
        max_duration: params.max_duration,
        author_email: None,
    };

    let (dynamics, total) = db
        .list_dynamics(&filter, params.order_by, params.order, page)
        .await?;

    Ok(ApiResponse::paginated(dynamics, Pagination::new(page.page, page.limit, total)))
}

pub async fn list_dynamics_by_author(
    State(db): State<Database>,
    AppPath(email): AppPath<String>,
    AppQuery(params): AppQuery<AuthorListParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = DynamicFilter {
        published: params.published,
        featured: params.featured,
        author_email: Some(email),
        ..Default::default()
    };
    let dynamics = db.find_dynamics(&filter, None).await?;
    Ok(ApiResponse::ok(dynamics))
}

pub async fn get_dynamic_by_slug(
    State(db): State<Database>,
    AppPath(slug): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let dynamic = db
        .find_dynamic_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("Dynamic not found".to_string()))?;

    Ok(ApiResponse::ok(dynamic))
}

/// Partially updates a dynamic. Empty strings and zero counts are ignored.
pub async fn update_dynamic(
    State(db): State<Database>,
    AppPath(slug): AppPath<String>,
    AppJson(payload): AppJson<UpdateDynamicRequest>,
) -> Result<impl IntoResponse, AppError> {
    let dynamic = db
        .update_dynamic(&slug, payload)
        .await?
        .ok_or(AppError::NotFound("Dynamic not found".to_string()))?;

    Ok(ApiResponse::ok(dynamic).with_message("Dynamic updated successfully"))
}

pub async fn delete_dynamic(
    State(db): State<Database>,
    AppPath(slug): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.delete_dynamic(&slug).await? {
        return Err(AppError::NotFound("Dynamic not found".to_string()));
    }

    tracing::info!("Deleted dynamic {}", slug);
    Ok(ApiResponse::message("Dynamic deleted successfully"))
}
