// src/models/page_config.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::patch::Field;

pub const DEFAULT_SITE_NAME: &str = "EduGuiders";
pub const DEFAULT_LANGUAGE: &str = "ENGLISH";
pub const DEFAULT_SUPPORTED_LANGUAGES: [&str; 2] = ["ENGLISH", "SPANISH"];
pub const DEFAULT_SUPPORT_EMAIL_NAME: &str = "EduGuiders Support";
pub const DEFAULT_POINTS_PER_EXERCISE: i64 = 10;
pub const DEFAULT_POINTS_PER_PACKAGE: i64 = 100;
pub const DEFAULT_MAX_API_REQUESTS_PER_HOUR: i64 = 1000;
pub const DEFAULT_MAX_IMAGE_SIZE: i64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_VIDEO_SIZE: i64 = 50 * 1024 * 1024;
pub const DEFAULT_IMAGE_TYPES: [&str; 4] = ["jpg", "jpeg", "png", "gif"];
pub const DEFAULT_VIDEO_TYPES: [&str; 3] = ["mp4", "webm", "mov"];
pub const DEFAULT_VERSION: &str = "1.0.0";

/// The part of the site configuration that anonymous visitors may read.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPageConfig {
    pub site_name: String,
    pub description: String,
    pub tagline: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub telegram: Option<String>,
    pub support_email: Option<String>,

    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub youtube: Option<String>,
    pub tiktok: Option<String>,
    #[sqlx(json)]
    pub instagram_posts: Vec<String>,
    #[sqlx(json)]
    pub tiktok_posts: Vec<String>,

    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[sqlx(json)]
    pub keywords: Vec<String>,
    pub favicon: Option<String>,
    pub logo: Option<String>,
    pub logo_alt: Option<String>,

    pub enable_registration: bool,
    pub enable_teacher_profiles: bool,
    pub enable_exercise_packages: bool,
    pub enable_games: bool,
    pub enable_testimonials: bool,
    pub enable_blog: bool,
    pub maintenance_mode: bool,

    pub welcome_message: Option<String>,
    pub footer_text: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub terms_of_service_url: Option<String>,
    pub about_us_content: Option<String>,

    pub default_language: String,
    #[sqlx(json)]
    pub supported_languages: Vec<String>,
    pub support_email_name: String,

    pub points_per_exercise: i64,
    pub points_per_package_complete: i64,
    pub enable_public_api: bool,
    pub max_image_size: i64,
    pub max_video_size: i64,
    #[sqlx(json)]
    pub allowed_image_types: Vec<String>,
    #[sqlx(json)]
    pub allowed_video_types: Vec<String>,
    pub version: String,
}

/// Represents the 'page_configs' table; a single row is expected.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    pub id: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub public: PublicPageConfig,

    pub google_analytics_id: Option<String>,
    pub facebook_pixel_id: Option<String>,
    pub hotjar_id: Option<String>,
    pub no_reply_email: Option<String>,
    pub email_signature: Option<String>,
    pub max_api_requests_per_hour: i64,
    pub webhook_secret: Option<String>,
    pub updated_by: Option<String>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Optional settings accepted on create and update. Absent keys keep the
/// stored (or default) value; `null` clears nullable columns.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfigFields {
    pub site_name: Option<String>,
    #[serde(default)]
    pub tagline: Field<String>,
    #[serde(default)]
    pub whatsapp: Field<String>,
    #[serde(default)]
    pub telegram: Field<String>,
    #[serde(default)]
    pub support_email: Field<String>,

    #[serde(default)]
    pub facebook: Field<String>,
    #[serde(default)]
    pub instagram: Field<String>,
    #[serde(default)]
    pub linkedin: Field<String>,
    #[serde(default)]
    pub youtube: Field<String>,
    #[serde(default)]
    pub tiktok: Field<String>,
    pub instagram_posts: Option<Vec<String>>,
    pub tiktok_posts: Option<Vec<String>>,

    #[serde(default)]
    pub meta_title: Field<String>,
    #[serde(default)]
    pub meta_description: Field<String>,
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub favicon: Field<String>,
    #[serde(default)]
    pub logo: Field<String>,
    #[serde(default)]
    pub logo_alt: Field<String>,

    pub enable_registration: Option<bool>,
    pub enable_teacher_profiles: Option<bool>,
    pub enable_exercise_packages: Option<bool>,
    pub enable_games: Option<bool>,
    pub enable_testimonials: Option<bool>,
    pub enable_blog: Option<bool>,
    pub maintenance_mode: Option<bool>,

    #[serde(default)]
    pub welcome_message: Field<String>,
    #[serde(default)]
    pub footer_text: Field<String>,
    #[serde(default)]
    pub privacy_policy_url: Field<String>,
    #[serde(default)]
    pub terms_of_service_url: Field<String>,
    #[serde(default)]
    pub about_us_content: Field<String>,

    pub default_language: Option<String>,
    pub supported_languages: Option<Vec<String>>,

    #[serde(default)]
    pub google_analytics_id: Field<String>,
    #[serde(default)]
    pub facebook_pixel_id: Field<String>,
    #[serde(default)]
    pub hotjar_id: Field<String>,

    pub support_email_name: Option<String>,
    #[serde(default)]
    pub no_reply_email: Field<String>,
    #[serde(default)]
    pub email_signature: Field<String>,

    pub points_per_exercise: Option<i64>,
    pub points_per_package_complete: Option<i64>,
    pub max_api_requests_per_hour: Option<i64>,
    pub enable_public_api: Option<bool>,
    #[serde(default)]
    pub webhook_secret: Field<String>,

    pub max_image_size: Option<i64>,
    pub max_video_size: Option<i64>,
    pub allowed_image_types: Option<Vec<String>>,
    pub allowed_video_types: Option<Vec<String>>,

    pub version: Option<String>,
    #[serde(default)]
    pub updated_by: Field<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageConfigRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Required fields missing: description, address, phone, email"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Required fields missing: description, address, phone, email"))]
    pub address: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Required fields missing: description, address, phone, email"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Required fields missing: description, address, phone, email"))]
    pub email: String,

    #[serde(flatten)]
    pub fields: PageConfigFields,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageConfigRequest {
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Address must not be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "Phone must not be empty"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Email must not be empty"))]
    pub email: Option<String>,

    #[serde(flatten)]
    pub fields: PageConfigFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPageConfigRequest {
    pub updated_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_splits_required_and_optional_fields() {
        let req: UpdatePageConfigRequest = serde_json::from_value(serde_json::json!({
            "phone": "+57 300",
            "tagline": null,
            "enableGames": false,
            "keywords": ["english", "teachers"]
        }))
        .unwrap();

        assert_eq!(req.phone.as_deref(), Some("+57 300"));
        assert_eq!(req.fields.tagline, Field::Null);
        assert_eq!(req.fields.enable_games, Some(false));
        assert_eq!(req.fields.keywords.as_ref().map(Vec::len), Some(2));
        assert!(req.fields.logo.is_missing());
    }

    #[test]
    fn create_requires_contact_fields() {
        let req: CreatePageConfigRequest =
            serde_json::from_value(serde_json::json!({ "description": "Site" })).unwrap();
        let err = req.validate().unwrap_err();
        let fields = err.field_errors();
        assert!(fields.contains_key("address"));
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("description"));
    }
}
