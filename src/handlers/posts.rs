// src/handlers/posts.rs

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::Database,
    error::AppError,
    models::post::{AuthorListParams, CreatePostRequest, PostFilter, PostListParams, UpdatePostRequest},
    response::{ApiResponse, Pagination},
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        query::PageRequest,
    },
};

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Creates a blog post.
///
/// The author must exist and the slug must be unused (409 otherwise).
pub async fn create_post(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Resolve the author
    if db.find_user_by_email(&payload.author_email).await?.is_none() {
        return Err(AppError::NotFound("Author not found".to_string()));
    }

    // 3. Slug must be free
    if db.post_slug_exists(&payload.slug).await? {
        return Err(AppError::Conflict("A post with this slug already exists".to_string()));
    }

    // 4. Insert
    let post = db.create_post(payload).await.map_err(|e| {
        AppError::unique_violation_or(
            e,
            AppError::Conflict("A post with this slug already exists".to_string()),
        )
    })?;

    tracing::info!("Created post {}", post.slug);
    Ok(ApiResponse::created(post).with_message("Post created successfully"))
}

/// Paginated post listing with optional `published`/`featured` filters.
pub async fn list_posts(
    State(db): State<Database>,
    AppQuery(params): AppQuery<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_PAGE_SIZE)?;
    let filter = PostFilter {
        published: params.published,
        featured: params.featured,
        author_email: None,
    };

    let (posts, total) = db
        .list_posts(&filter, params.order_by, params.order, page)
        .await?;

    Ok(ApiResponse::paginated(posts, Pagination::new(page.page, page.limit, total)))
}

/// All posts of one author, newest first.
pub async fn list_posts_by_author(
    State(db): State<Database>,
    AppPath(email): AppPath<String>,
    AppQuery(params): AppQuery<AuthorListParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = PostFilter {
        published: params.published,
        featured: params.featured,
        author_email: Some(email),
    };
    let posts = db.find_posts(&filter, None).await?;
    Ok(ApiResponse::ok(posts))
}

pub async fn get_post_by_slug(
    State(db): State<Database>,
    AppPath(slug): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = db
        .find_post_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(ApiResponse::ok(post))
}

/// Partially updates a post; the slug itself never changes.
pub async fn update_post(
    State(db): State<Database>,
    AppPath(slug): AppPath<String>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = db
        .update_post(&slug, payload)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(ApiResponse::ok(post).with_message("Post updated successfully"))
}

pub async fn delete_post(
    State(db): State<Database>,
    AppPath(slug): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.delete_post(&slug).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    tracing::info!("Deleted post {}", slug);
    Ok(ApiResponse::message("Post deleted successfully"))
}
