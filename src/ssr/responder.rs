// src/ssr/responder.rs

use axum::{http::StatusCode, response::Html};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::db::Database;
use crate::models::{dynamic::Dynamic, exercise::Exercise, post::Post, teacher_profile::TeacherProfile};
use crate::ssr::detect::SsrRoute;
use crate::ssr::render::{
    DEFAULT_BLOG_IMAGE, DYNAMICS_IMAGE, EXERCISE_IMAGE, SeoMeta, TEACHER_IMAGE, canonical_url,
    clip_description, excerpt, humanize, preview_image, render_document,
};
use crate::utils::html::{collapse_whitespace, strip_tags};

/// Builds the meta document for `route`. Never fails: a missing or hidden
/// entity yields a 404 document and a store failure a 500 document.
pub async fn respond(db: &Database, site_url: &str, route: &SsrRoute) -> (StatusCode, Html<String>) {
    let url = canonical_url(site_url, &route.path());

    let (status, meta) = match describe(db, route, url.clone()).await {
        Ok(Some(meta)) => (StatusCode::OK, meta),
        Ok(None) => (StatusCode::NOT_FOUND, not_found(route, url)),
        Err(e) => {
            tracing::error!("Failed to render meta document for {}: {:?}", route.path(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                SeoMeta::website(
                    "Error - EduGuiders",
                    "An error occurred while loading this page.",
                    url,
                ),
            )
        }
    };

    (status, Html(render_document(&meta)))
}

async fn describe(db: &Database, route: &SsrRoute, url: String) -> Result<Option<SeoMeta>, sqlx::Error> {
    let meta = match route {
        SsrRoute::BlogIndex => Some(SeoMeta::website(
            "Blog - EduGuiders",
            "Articles, tips and resources for learning and teaching English.",
            url,
        )),
        SsrRoute::DynamicsIndex => Some(SeoMeta::website(
            "Teaching Dynamics - EduGuiders",
            "Classroom activities and teaching dynamics for English teachers.",
            url,
        )),
        SsrRoute::TeachersIndex => Some(SeoMeta::website(
            "English Teachers - EduGuiders",
            "Find professional English teachers and explore their profiles.",
            url,
        )),
        SsrRoute::ExercisesIndex => Some(SeoMeta::website(
            "English Exercises - EduGuiders",
            "Practice English with interactive exercises for every level.",
            url,
        )),
        SsrRoute::Blog(slug) => db
            .find_post_by_slug(slug)
            .await?
            .filter(|post| post.published)
            .map(|post| post_meta(&post, url)),
        SsrRoute::Dynamic(slug) => db
            .find_dynamic_by_slug(slug)
            .await?
            .filter(|dynamic| dynamic.published)
            .map(|dynamic| dynamic_meta(&dynamic, url)),
        SsrRoute::Teacher(user_id) => db
            .find_teacher_profile(user_id)
            .await?
            .filter(|profile| profile.is_public)
            .map(|profile| teacher_meta(&profile, url)),
        SsrRoute::Exercise(id) => db
            .find_exercise(id)
            .await?
            .filter(|exercise| exercise.is_published)
            .map(|exercise| exercise_meta(&exercise, url)),
    };
    Ok(meta)
}

fn not_found(route: &SsrRoute, url: String) -> SeoMeta {
    let (title, description) = match route {
        SsrRoute::Blog(_) | SsrRoute::BlogIndex => (
            "Post Not Found - EduGuiders",
            "The requested blog post could not be found.",
        ),
        SsrRoute::Dynamic(_) | SsrRoute::DynamicsIndex => (
            "Dynamic Not Found - EduGuiders",
            "The requested teaching dynamic could not be found.",
        ),
        SsrRoute::Teacher(_) | SsrRoute::TeachersIndex => (
            "Teacher Not Found - EduGuiders",
            "The requested teacher profile could not be found.",
        ),
        SsrRoute::Exercise(_) | SsrRoute::ExercisesIndex => (
            "Exercise Not Found - EduGuiders",
            "The requested exercise could not be found.",
        ),
    };
    SeoMeta::website(title, description, url)
}

/// ISO-8601 with milliseconds, as browsers print dates.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn post_meta(post: &Post, url: String) -> SeoMeta {
    let description = if post.summary.trim().is_empty() {
        let text = collapse_whitespace(&strip_tags(&post.content));
        excerpt(&text)
    } else {
        clip_description(&post.summary)
    };

    SeoMeta {
        title: format!("{} - EduGuiders Blog", post.title),
        description,
        image: preview_image(post.cover_image.as_deref(), DEFAULT_BLOG_IMAGE),
        url,
        kind: "article",
        author: Some(post.user.name.clone()),
        published_time: Some(timestamp(post.created_at)),
        modified_time: Some(timestamp(post.updated_at)),
    }
}

fn dynamic_meta(dynamic: &Dynamic, url: String) -> SeoMeta {
    let description = format!(
        "{} Duration: {} minutes. Age group: {}. Difficulty: {}.",
        dynamic.description.trim(),
        dynamic.duration,
        humanize(&dynamic.age_group),
        dynamic.difficulty.as_str().to_lowercase()
    );

    SeoMeta {
        title: format!("{} - Teaching Dynamic", dynamic.title),
        description: clip_description(&description),
        image: DYNAMICS_IMAGE.to_string(),
        url,
        kind: "article",
        author: Some(dynamic.user.name.clone()),
        published_time: Some(timestamp(dynamic.created_at)),
        modified_time: Some(timestamp(dynamic.updated_at)),
    }
}

fn teacher_meta(profile: &TeacherProfile, url: String) -> SeoMeta {
    let name = profile
        .display_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(if profile.user.name.trim().is_empty() {
            "Teacher"
        } else {
            profile.user.name.as_str()
        });

    let description = match profile.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        Some(bio) => bio.to_string(),
        None => {
            let specialties = if profile.specializations.is_empty() {
                "English instruction".to_string()
            } else {
                profile.specializations.join(", ")
            };
            let experience = profile
                .years_experience
                .filter(|years| *years > 0)
                .map(|years| format!(" {years} years of experience."))
                .unwrap_or_default();
            format!("Professional English teacher specializing in {specialties}.{experience}")
        }
    };

    let image = profile
        .profile_image
        .as_deref()
        .filter(|i| !i.trim().is_empty())
        .or(profile.user.picture.as_deref());

    SeoMeta {
        title: format!("{name} - English Teacher Profile"),
        description: clip_description(&description),
        image: preview_image(image, TEACHER_IMAGE),
        url,
        kind: "profile",
        author: None,
        published_time: None,
        modified_time: None,
    }
}

fn exercise_meta(exercise: &Exercise, url: String) -> SeoMeta {
    let description = match exercise.instructions.as_deref().filter(|i| !i.trim().is_empty()) {
        Some(instructions) => instructions.to_string(),
        None => format!(
            "Practice English with this interactive {} exercise. Difficulty: {}.",
            humanize(&exercise.exercise_type),
            exercise.difficulty.as_str().to_lowercase()
        ),
    };

    SeoMeta {
        title: format!("{} - English Exercise", exercise.title),
        description: clip_description(&description),
        image: EXERCISE_IMAGE.to_string(),
        url,
        kind: "article",
        author: Some(exercise.user.name.clone()),
        published_time: Some(timestamp(exercise.created_at)),
        modified_time: Some(timestamp(exercise.updated_at)),
    }
}
