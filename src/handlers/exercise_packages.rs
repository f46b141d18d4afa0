// src/handlers/exercise_packages.rs

use std::collections::{HashMap, HashSet};

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::{Database, packages::ExerciseMatchQuery},
    error::AppError,
    models::{
        exercise::ExerciseSummary,
        exercise_package::{
            AddExerciseRequest, CompleteExerciseRequest, CreatePackageRequest, ExercisePackage,
            PackageDetail, PackageExercise, PackageExerciseParams, PackageFilter, PackageListItem,
            PackageListParams, PackageSearchItem, PackageSearchParams, ProgressView,
            UpdatePackageRequest, UserEmailParams,
        },
    },
    response::{ApiResponse, Pagination},
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        query::{PageRequest, non_empty},
    },
};

const DEFAULT_PAGE_SIZE: i64 = 20;

fn group_by_package(summaries: Vec<ExerciseSummary>) -> HashMap<String, Vec<ExerciseSummary>> {
    let mut grouped: HashMap<String, Vec<ExerciseSummary>> = HashMap::new();
    for summary in summaries {
        if let Some(package_id) = summary.package_id.clone() {
            grouped.entry(package_id).or_default().push(summary);
        }
    }
    grouped
}

async fn require_package(db: &Database, id: &str) -> Result<ExercisePackage, AppError> {
    db.find_package(id)
        .await?
        .ok_or(AppError::NotFound("Exercise package not found".to_string()))
}

/// Progress of the user with `email` in `package_id`; zeroed when the user
/// is unknown or has not started the package.
async fn progress_for(db: &Database, email: &str, package_id: &str) -> Result<ProgressView, AppError> {
    let Some(user) = db.find_user_by_email(email).await? else {
        return Ok(ProgressView::default());
    };
    Ok(db
        .find_completion(&user.id, package_id)
        .await?
        .map(ProgressView::from)
        .unwrap_or_default())
}

async fn package_detail(
    db: &Database,
    package: ExercisePackage,
    user_email: Option<String>,
) -> Result<PackageDetail, AppError> {
    let exercises = db.package_exercises(&package.id, None).await?;
    let user_progress = match non_empty(user_email) {
        Some(email) => Some(progress_for(db, &email, &package.id).await?),
        None => None,
    };

    Ok(PackageDetail {
        exercise_count: exercises.len(),
        package,
        exercises,
        user_progress,
    })
}

/// Paginated package listing, featured packages first.
///
/// Each item carries its exercise summaries; with `userEmail` it also
/// carries that user's completion rate.
pub async fn list_packages(
    State(db): State<Database>,
    AppQuery(params): AppQuery<PackageListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_PAGE_SIZE)?;
    let filter = PackageFilter {
        category: non_empty(params.category),
        featured: params.featured,
        is_published: params.is_published,
        search: non_empty(params.search),
    };

    // 1. One page of packages
    let (packages, total) = db.list_packages(&filter, page).await?;
    let ids: Vec<String> = packages.iter().map(|p| p.id.clone()).collect();

    // 2. Exercise summaries and, optionally, the user's progress
    let mut summaries = group_by_package(db.exercise_summaries_for_packages(&ids).await?);
    let completions = match non_empty(params.user_email) {
        Some(email) => Some(db.completions_for_user(&email, &ids).await?),
        None => None,
    };

    // 3. Assemble
    let items: Vec<PackageListItem> = packages
        .into_iter()
        .map(|package| {
            let exercises = summaries.remove(&package.id).unwrap_or_default();
            let completion_rate = completions.as_ref().map(|by_package| {
                by_package
                    .get(&package.id)
                    .map(|c| c.completion_rate)
                    .unwrap_or(0.0)
            });
            PackageListItem {
                exercise_count: exercises.len(),
                package,
                exercises,
                completion_rate,
            }
        })
        .collect();

    Ok(ApiResponse::paginated(items, Pagination::new(page.page, page.limit, total)))
}

/// Finds published packages through their exercises.
///
/// Exercises are matched on title, instructions or tag; a package qualifies
/// with at least `minMatches` (default 1) matching exercises.
pub async fn search_packages(
    State(db): State<Database>,
    AppQuery(params): AppQuery<PackageSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let q = non_empty(params.q)
        .ok_or(AppError::BadRequest("Search query is required".to_string()))?;
    let page = PageRequest::new(params.page, params.limit, DEFAULT_PAGE_SIZE)?;
    let min_matches = params.min_matches.unwrap_or(1).max(1);
    let category = non_empty(params.category);

    // 1. Matching exercises, grouped by package
    let query = ExerciseMatchQuery {
        q: q.trim(),
        difficulty: params.difficulty,
        category: category.as_deref(),
    };
    let mut matches = group_by_package(db.search_package_exercises(&query).await?);
    matches.retain(|_, found| found.len() >= min_matches);

    let mut ids: Vec<String> = matches.keys().cloned().collect();
    ids.sort();

    // 2. Published packages among them
    let (packages, total) = db.published_packages_among(&ids, page).await?;
    let page_ids: Vec<String> = packages.iter().map(|p| p.id.clone()).collect();
    let mut summaries = group_by_package(db.exercise_summaries_for_packages(&page_ids).await?);

    // 3. Assemble
    let items: Vec<PackageSearchItem> = packages
        .into_iter()
        .map(|package| {
            let exercises = summaries.remove(&package.id).unwrap_or_default();
            let matching_exercises = matches.remove(&package.id).unwrap_or_default();
            PackageSearchItem {
                total_matches: matching_exercises.len(),
                exercise_count: exercises.len(),
                package,
                exercises,
                matching_exercises,
            }
        })
        .collect();

    Ok(ApiResponse::paginated(items, Pagination::new(page.page, page.limit, total)))
}

pub async fn get_package(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppQuery(params): AppQuery<UserEmailParams>,
) -> Result<impl IntoResponse, AppError> {
    let package = require_package(&db, &id).await?;
    let detail = package_detail(&db, package, params.user_email).await?;
    Ok(ApiResponse::ok(detail))
}

pub async fn get_package_by_slug(
    State(db): State<Database>,
    AppPath(slug): AppPath<String>,
    AppQuery(params): AppQuery<UserEmailParams>,
) -> Result<impl IntoResponse, AppError> {
    let package = db
        .find_package_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("Exercise package not found".to_string()))?;
    let detail = package_detail(&db, package, params.user_email).await?;
    Ok(ApiResponse::ok(detail))
}

/// Exercises of a package, easiest first. With `userEmail` each one says
/// whether that user completed it.
pub async fn list_package_exercises(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppQuery(params): AppQuery<PackageExerciseParams>,
) -> Result<impl IntoResponse, AppError> {
    require_package(&db, &id).await?;
    let exercises = db.package_exercises(&id, params.difficulty).await?;

    let completed: Option<HashSet<String>> = match non_empty(params.user_email) {
        Some(email) => Some(
            progress_for(&db, &email, &id)
                .await?
                .completed_exercises
                .into_iter()
                .collect(),
        ),
        None => None,
    };

    let items: Vec<PackageExercise> = exercises
        .into_iter()
        .map(|exercise| PackageExercise {
            completed: completed.as_ref().map(|done| done.contains(&exercise.id)),
            exercise,
        })
        .collect();

    Ok(ApiResponse::ok(items))
}

/// Creates a package. Slugs are unique (400 on duplicates).
pub async fn create_package(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreatePackageRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Slug must be free
    if db.package_slug_taken(&payload.slug, None).await? {
        return Err(AppError::BadRequest("Package with this slug already exists".to_string()));
    }

    // 3. Insert
    let package = db.create_package(payload).await.map_err(|e| {
        AppError::unique_violation_or(
            e,
            AppError::BadRequest("Package with this slug already exists".to_string()),
        )
    })?;

    tracing::info!("Created exercise package {}", package.slug);
    Ok(ApiResponse::created(package).with_message("Exercise package created successfully"))
}

pub async fn update_package(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<UpdatePackageRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if let Some(slug) = payload.slug.as_deref() {
        if db.package_slug_taken(slug, Some(&id)).await? {
            return Err(AppError::BadRequest("Package with this slug already exists".to_string()));
        }
    }

    let package = db
        .update_package(&id, payload)
        .await
        .map_err(|e| {
            AppError::unique_violation_or(
                e,
                AppError::BadRequest("Package with this slug already exists".to_string()),
            )
        })?
        .ok_or(AppError::NotFound("Exercise package not found".to_string()))?;

    Ok(ApiResponse::ok(package).with_message("Exercise package updated successfully"))
}

/// Deletes a package. Its exercises stay, detached.
pub async fn delete_package(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.delete_package(&id).await? {
        return Err(AppError::NotFound("Exercise package not found".to_string()));
    }

    tracing::info!("Deleted exercise package {}", id);
    Ok(ApiResponse::message("Exercise package deleted successfully"))
}

/// Attaches an existing exercise, respecting `maxExercises`.
pub async fn add_exercise_to_package(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<AddExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Both sides must exist
    let package = require_package(&db, &id).await?;
    let exercise = db
        .find_exercise(&payload.exercise_id)
        .await?
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    // 3. Capacity check, unless it is already attached here
    if exercise.package_id.as_deref() != Some(package.id.as_str()) {
        let count = db.count_package_exercises(&package.id).await?;
        if count >= package.max_exercises {
            return Err(AppError::BadRequest(format!(
                "Package has reached maximum capacity of {} exercises",
                package.max_exercises
            )));
        }
        db.set_exercise_package(&exercise.id, Some(&package.id)).await?;
    }

    let exercise = db
        .find_exercise(&exercise.id)
        .await?
        .ok_or(AppError::NotFound("Exercise not found".to_string()))?;

    Ok(ApiResponse::ok(exercise).with_message("Exercise added to package successfully"))
}

pub async fn remove_exercise_from_package(
    State(db): State<Database>,
    AppPath((id, exercise_id)): AppPath<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let exercise = db
        .find_exercise(&exercise_id)
        .await?
        .filter(|e| e.package_id.as_deref() == Some(id.as_str()))
        .ok_or(AppError::NotFound("Exercise not found in this package".to_string()))?;

    db.set_exercise_package(&exercise.id, None).await?;
    Ok(ApiResponse::message("Exercise removed from package successfully"))
}

/// Records that a user completed one exercise of the package.
///
/// Completing the same exercise twice keeps the completed list unchanged,
/// while the exercise's own counter increments both times.
pub async fn complete_package_exercise(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppJson(payload): AppJson<CompleteExerciseRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Resolve user, package and exercise
    let user = db
        .find_user_by_email(&payload.user_email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    let package = require_package(&db, &id).await?;
    db.find_exercise(&payload.exercise_id)
        .await?
        .filter(|e| e.package_id.as_deref() == Some(package.id.as_str()))
        .ok_or(AppError::NotFound("Exercise not found in this package".to_string()))?;

    // 3. Record progress
    let result = db
        .mark_exercise_complete(&user.id, &package.id, &payload.exercise_id)
        .await?;

    Ok(ApiResponse::ok(result).with_message("Exercise marked as completed"))
}

pub async fn get_package_progress(
    State(db): State<Database>,
    AppPath(id): AppPath<String>,
    AppQuery(params): AppQuery<UserEmailParams>,
) -> Result<impl IntoResponse, AppError> {
    let email = non_empty(params.user_email)
        .ok_or(AppError::BadRequest("User email is required".to_string()))?;

    let user = db
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    let package = require_package(&db, &id).await?;

    let progress = db
        .find_completion(&user.id, &package.id)
        .await?
        .map(ProgressView::from)
        .unwrap_or_default();
    let total = db.count_package_exercises(&package.id).await?;

    Ok(ApiResponse::ok(progress).with_field("totalExercises", total))
}
