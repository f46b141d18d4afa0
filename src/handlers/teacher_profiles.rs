// src/handlers/teacher_profiles.rs

use axum::{extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    db::{Database, teacher_profiles::ProfileChild},
    error::AppError,
    models::{
        dynamic::DynamicFilter,
        post::PostFilter,
        teacher_profile::{
            CreateCertificationRequest, CreateEducationRequest, CreateExperienceRequest,
            CreateProfileRequest, CreateSectionRequest, ProfileDetail, ProfileFields,
            ProfileFilter, ProfileListItem, ProfileListParams, ProfileSearchParams,
            UpdateCertificationRequest, UpdateEducationRequest, UpdateExperienceRequest,
            UpdateSectionRequest,
        },
        user::UserRole,
    },
    response::{ApiResponse, Pagination},
    utils::{
        extract::{AppJson, AppPath, AppQuery},
        query::{PageRequest, json_list, non_empty},
    },
};

const DEFAULT_PAGE_SIZE: i64 = 12;
const FEATURED_LIMIT: i64 = 6;
const LISTED_EDUCATION: i64 = 2;
const LISTED_CERTIFICATIONS: i64 = 3;
const RECENT_POSTS: i64 = 5;
const RECENT_DYNAMICS: i64 = 6;

/// Resolves the profile id of a teacher, 404 when they have no profile.
async fn profile_id_for(db: &Database, user_id: &str) -> Result<String, AppError> {
    db.find_teacher_profile(user_id)
        .await?
        .map(|profile| profile.id)
        .ok_or(AppError::NotFound("Teacher profile not found".to_string()))
}

/// Paginated directory of public teacher profiles.
///
/// `languages`, `specializations` and `availability` are comma-separated and
/// match profiles sharing any of the values.
pub async fn list_profiles(
    State(db): State<Database>,
    AppQuery(params): AppQuery<ProfileListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.page, params.limit, DEFAULT_PAGE_SIZE)?;
    let filter = ProfileFilter {
        q: None,
        languages: json_list(params.languages.as_deref()),
        specializations: json_list(params.specializations.as_deref()),
        availability: json_list(params.availability.as_deref()),
    };

    let (profiles, total) = db
        .list_teacher_profiles(&filter, params.sort_by, params.order, page)
        .await?;

    let mut items = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let education = db.profile_education(&profile.id, Some(LISTED_EDUCATION)).await?;
        let certifications = db
            .profile_certifications(&profile.id, Some(LISTED_CERTIFICATIONS))
            .await?;
        items.push(ProfileListItem {
            profile,
            education,
            certifications,
        });
    }

    Ok(ApiResponse::paginated(items, Pagination::new(page.page, page.limit, total)))
}

/// Most viewed public profiles.
pub async fn featured_profiles(State(db): State<Database>) -> Result<impl IntoResponse, AppError> {
    let profiles = db
        .search_teacher_profiles(&ProfileFilter::default(), Some(FEATURED_LIMIT))
        .await?;
    Ok(ApiResponse::ok(profiles))
}

/// Free-text search over display name, tagline, bio and the user's name.
pub async fn search_profiles(
    State(db): State<Database>,
    AppQuery(params): AppQuery<ProfileSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ProfileFilter {
        q: non_empty(params.q).map(|q| q.trim().to_string()),
        languages: json_list(params.languages.as_deref()),
        specializations: json_list(params.specializations.as_deref()),
        availability: json_list(params.availability.as_deref()),
    };
    let profiles = db.search_teacher_profiles(&filter, None).await?;
    Ok(ApiResponse::ok(profiles))
}

/// Full profile page: credentials, visible sections and recent published work.
pub async fn get_profile(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile = db
        .find_teacher_profile(&user_id)
        .await?
        .ok_or(AppError::NotFound("Teacher profile not found".to_string()))?;

    let education = db.profile_education(&profile.id, None).await?;
    let experience = db.profile_experience(&profile.id).await?;
    let certifications = db.profile_certifications(&profile.id, None).await?;
    let sections = db.profile_sections(&profile.id, true).await?;

    let recent_posts = db
        .find_posts(
            &PostFilter {
                published: Some(true),
                featured: None,
                author_email: Some(profile.user.email.clone()),
            },
            Some(RECENT_POSTS),
        )
        .await?;
    let dynamics = db
        .find_dynamics(
            &DynamicFilter {
                published: Some(true),
                author_email: Some(profile.user.email.clone()),
                ..Default::default()
            },
            Some(RECENT_DYNAMICS),
        )
        .await?;

    Ok(ApiResponse::ok(ProfileDetail {
        profile,
        education,
        experience,
        certifications,
        sections,
        recent_posts,
        dynamics,
    }))
}

/// Creates the profile of a TEACHER user; one profile per user.
pub async fn create_profile(
    State(db): State<Database>,
    AppJson(payload): AppJson<CreateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload.validate()?;

    // 2. Only teachers get a profile
    let user = db
        .find_user_by_id(&payload.user_id)
        .await?
        .filter(|u| u.role == UserRole::Teacher)
        .ok_or(AppError::BadRequest("User not found or not a teacher".to_string()))?;

    // 3. One profile per user
    if db.find_teacher_profile(&user.id).await?.is_some() {
        return Err(AppError::BadRequest("Teacher profile already exists".to_string()));
    }

    // 4. Insert
    let profile = db
        .create_teacher_profile(&user.id, payload.fields)
        .await
        .map_err(|e| {
            AppError::unique_violation_or(
                e,
                AppError::BadRequest("Teacher profile already exists".to_string()),
            )
        })?;

    tracing::info!("Created teacher profile for {}", user.email);
    Ok(ApiResponse::created(profile).with_message("Teacher profile created successfully"))
}

pub async fn update_profile(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
    AppJson(fields): AppJson<ProfileFields>,
) -> Result<impl IntoResponse, AppError> {
    let profile = db
        .update_teacher_profile(&user_id, fields)
        .await?
        .ok_or(AppError::NotFound("Teacher profile not found".to_string()))?;

    Ok(ApiResponse::ok(profile).with_message("Teacher profile updated successfully"))
}

pub async fn delete_profile(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.delete_teacher_profile(&user_id).await? {
        return Err(AppError::NotFound("Teacher profile not found".to_string()));
    }
    Ok(ApiResponse::message("Teacher profile deleted successfully"))
}

/// Counts a profile view and refreshes `lastActive`.
pub async fn record_view(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    if !db.record_profile_view(&user_id).await? {
        return Err(AppError::NotFound("Teacher profile not found".to_string()));
    }
    Ok(ApiResponse::message("Profile view recorded"))
}

async fn delete_child(
    db: &Database,
    child: ProfileChild,
    user_id: &str,
    id: &str,
    what: &str,
) -> Result<ApiResponse<()>, AppError> {
    let profile_id = profile_id_for(db, user_id).await?;
    if !db.delete_profile_child(child, &profile_id, id).await? {
        return Err(AppError::NotFound(format!("{} not found", what)));
    }
    Ok(ApiResponse::message(format!("{} deleted successfully", what)))
}

// Sections

/// All sections of a profile, including hidden ones, in display order.
pub async fn list_sections(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile_id = profile_id_for(&db, &user_id).await?;
    let sections = db.profile_sections(&profile_id, false).await?;
    Ok(ApiResponse::ok(sections))
}

pub async fn create_section(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
    AppJson(payload): AppJson<CreateSectionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let profile_id = profile_id_for(&db, &user_id).await?;
    let section = db.add_section(&profile_id, payload).await?;
    Ok(ApiResponse::created(section).with_message("Section created successfully"))
}

pub async fn update_section(
    State(db): State<Database>,
    AppPath((user_id, id)): AppPath<(String, String)>,
    AppJson(payload): AppJson<UpdateSectionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile_id = profile_id_for(&db, &user_id).await?;
    let section = db
        .update_section(&profile_id, &id, payload)
        .await?
        .ok_or(AppError::NotFound("Section not found".to_string()))?;
    Ok(ApiResponse::ok(section).with_message("Section updated successfully"))
}

pub async fn delete_section(
    State(db): State<Database>,
    AppPath((user_id, id)): AppPath<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    delete_child(&db, ProfileChild::Section, &user_id, &id, "Section").await
}

// Education

pub async fn list_education(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile_id = profile_id_for(&db, &user_id).await?;
    let education = db.profile_education(&profile_id, None).await?;
    Ok(ApiResponse::ok(education))
}

pub async fn create_education(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
    AppJson(payload): AppJson<CreateEducationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let profile_id = profile_id_for(&db, &user_id).await?;
    let education = db.add_education(&profile_id, payload).await?;
    Ok(ApiResponse::created(education).with_message("Education created successfully"))
}

pub async fn update_education(
    State(db): State<Database>,
    AppPath((user_id, id)): AppPath<(String, String)>,
    AppJson(payload): AppJson<UpdateEducationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile_id = profile_id_for(&db, &user_id).await?;
    let education = db
        .update_education(&profile_id, &id, payload)
        .await?
        .ok_or(AppError::NotFound("Education not found".to_string()))?;
    Ok(ApiResponse::ok(education).with_message("Education updated successfully"))
}

pub async fn delete_education(
    State(db): State<Database>,
    AppPath((user_id, id)): AppPath<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    delete_child(&db, ProfileChild::Education, &user_id, &id, "Education").await
}

// Experience

pub async fn list_experience(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile_id = profile_id_for(&db, &user_id).await?;
    let experience = db.profile_experience(&profile_id).await?;
    Ok(ApiResponse::ok(experience))
}

pub async fn create_experience(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
    AppJson(payload): AppJson<CreateExperienceRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let profile_id = profile_id_for(&db, &user_id).await?;
    let experience = db.add_experience(&profile_id, payload).await?;
    Ok(ApiResponse::created(experience).with_message("Experience created successfully"))
}

pub async fn update_experience(
    State(db): State<Database>,
    AppPath((user_id, id)): AppPath<(String, String)>,
    AppJson(payload): AppJson<UpdateExperienceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile_id = profile_id_for(&db, &user_id).await?;
    let experience = db
        .update_experience(&profile_id, &id, payload)
        .await?
        .ok_or(AppError::NotFound("Experience not found".to_string()))?;
    Ok(ApiResponse::ok(experience).with_message("Experience updated successfully"))
}

pub async fn delete_experience(
    State(db): State<Database>,
    AppPath((user_id, id)): AppPath<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    delete_child(&db, ProfileChild::Experience, &user_id, &id, "Experience").await
}

// Certifications

pub async fn list_certifications(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let profile_id = profile_id_for(&db, &user_id).await?;
    let certifications = db.profile_certifications(&profile_id, None).await?;
    Ok(ApiResponse::ok(certifications))
}

pub async fn create_certification(
    State(db): State<Database>,
    AppPath(user_id): AppPath<String>,
    AppJson(payload): AppJson<CreateCertificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let profile_id = profile_id_for(&db, &user_id).await?;
    let certification = db.add_certification(&profile_id, payload).await?;
    Ok(ApiResponse::created(certification).with_message("Certification created successfully"))
}

pub async fn update_certification(
    State(db): State<Database>,
    AppPath((user_id, id)): AppPath<(String, String)>,
    AppJson(payload): AppJson<UpdateCertificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile_id = profile_id_for(&db, &user_id).await?;
    let certification = db
        .update_certification(&profile_id, &id, payload)
        .await?
        .ok_or(AppError::NotFound("Certification not found".to_string()))?;
    Ok(ApiResponse::ok(certification).with_message("Certification updated successfully"))
}

pub async fn delete_certification(
    State(db): State<Database>,
    AppPath((user_id, id)): AppPath<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    delete_child(&db, ProfileChild::Certification, &user_id, &id, "Certification").await
}
