// src/models/teacher_profile.rs

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

use crate::models::dynamic::Dynamic;
use crate::models::post::Post;
use crate::models::user::AuthorSummary;
use crate::utils::patch::Field;
use crate::utils::query::SortOrder;

/// Calendar date accepting either `YYYY-MM-DD` or a full RFC 3339 timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct CalendarDate(pub NaiveDate);

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            return Ok(CalendarDate(date));
        }
        chrono::DateTime::parse_from_rfc3339(&raw)
            .map(|dt| CalendarDate(dt.date_naive()))
            .map_err(|_| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}

/// Represents the 'teacher_profiles' table joined with its user.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    pub id: String,
    pub user_id: String,
    pub display_name: Option<String>,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub cover_image: Option<String>,
    pub theme_color: Option<String>,
    pub layout_style: Option<String>,
    pub phone_number: Option<String>,
    pub whatsapp: Option<String>,
    pub telegram: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub timezone: Option<String>,
    pub years_experience: Option<i64>,
    pub native_language: Option<String>,
    #[sqlx(json)]
    pub teaching_languages: Vec<String>,
    #[sqlx(json)]
    pub specializations: Vec<String>,
    pub teaching_style: Option<String>,
    pub classroom_rules: Option<String>,
    #[sqlx(json)]
    pub availability_tags: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub currency: Option<String>,
    pub is_public: bool,
    pub profile_views: i64,
    pub last_active: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,

    #[sqlx(flatten)]
    pub user: AuthorSummary,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherEducation {
    pub id: String,
    pub profile_id: String,
    pub degree: String,
    pub institution: String,
    pub field: Option<String>,
    pub start_year: i64,
    pub end_year: Option<i64>,
    pub is_ongoing: bool,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherExperience {
    pub id: String,
    pub profile_id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: CalendarDate,
    pub end_date: Option<CalendarDate>,
    pub is_current: bool,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCertification {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    pub issuer: String,
    pub issue_date: CalendarDate,
    pub expiry_date: Option<CalendarDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Free-form block on a teacher's page (about, gallery, pricing...).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSection {
    pub id: String,
    pub profile_id: String,
    pub section_type: String,
    pub title: String,
    pub content: Option<String>,
    pub is_visible: bool,
    pub sort_order: i64,
    pub custom_data: Option<Json<Value>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileListItem {
    #[serde(flatten)]
    pub profile: TeacherProfile,
    pub education: Vec<TeacherEducation>,
    pub certifications: Vec<TeacherCertification>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetail {
    #[serde(flatten)]
    pub profile: TeacherProfile,
    pub education: Vec<TeacherEducation>,
    pub experience: Vec<TeacherExperience>,
    pub certifications: Vec<TeacherCertification>,
    pub sections: Vec<ProfileSection>,
    /// Latest published posts of the teacher.
    pub recent_posts: Vec<Post>,
    /// Latest published dynamics of the teacher.
    pub dynamics: Vec<Dynamic>,
}

/// Editable profile fields shared by create and update.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    #[serde(default)]
    pub display_name: Field<String>,
    #[serde(default)]
    pub tagline: Field<String>,
    #[serde(default)]
    pub bio: Field<String>,
    #[serde(default)]
    pub profile_image: Field<String>,
    #[serde(default)]
    pub cover_image: Field<String>,
    #[serde(default)]
    pub theme_color: Field<String>,
    #[serde(default)]
    pub layout_style: Field<String>,
    #[serde(default)]
    pub phone_number: Field<String>,
    #[serde(default)]
    pub whatsapp: Field<String>,
    #[serde(default)]
    pub telegram: Field<String>,
    #[serde(default)]
    pub instagram: Field<String>,
    #[serde(default)]
    pub linkedin: Field<String>,
    #[serde(default)]
    pub website: Field<String>,
    #[serde(default)]
    pub timezone: Field<String>,
    #[serde(default)]
    pub years_experience: Field<i64>,
    #[serde(default)]
    pub native_language: Field<String>,
    pub teaching_languages: Option<Vec<String>>,
    pub specializations: Option<Vec<String>>,
    #[serde(default)]
    pub teaching_style: Field<String>,
    #[serde(default)]
    pub classroom_rules: Field<String>,
    pub availability_tags: Option<Vec<String>>,
    #[serde(default)]
    pub hourly_rate: Field<f64>,
    #[serde(default)]
    pub currency: Field<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,

    #[serde(flatten)]
    pub fields: ProfileFields,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum ProfileSortField {
    #[default]
    #[serde(rename = "lastActive")]
    LastActive,
    #[serde(rename = "profileViews")]
    ProfileViews,
    #[serde(rename = "createdAt")]
    CreatedAt,
}

impl ProfileSortField {
    pub fn column(&self) -> &'static str {
        match self {
            ProfileSortField::LastActive => "tp.last_active",
            ProfileSortField::ProfileViews => "tp.profile_views",
            ProfileSortField::CreatedAt => "tp.created_at",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileListParams {
    /// Comma-separated teaching languages; any match.
    pub languages: Option<String>,
    pub specializations: Option<String>,
    pub availability: Option<String>,
    #[serde(default)]
    pub sort_by: ProfileSortField,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSearchParams {
    pub q: Option<String>,
    pub languages: Option<String>,
    pub specializations: Option<String>,
    pub availability: Option<String>,
}

/// Filter for public teacher profiles. List fields hold JSON array text.
#[derive(Debug, Default, Clone)]
pub struct ProfileFilter {
    pub q: Option<String>,
    pub languages: Option<String>,
    pub specializations: Option<String>,
    pub availability: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEducationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub degree: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub institution: String,
    pub field: Option<String>,
    #[validate(required(message = "Missing required fields"))]
    pub start_year: Option<i64>,
    pub end_year: Option<i64>,
    pub is_ongoing: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEducationRequest {
    pub degree: Option<String>,
    pub institution: Option<String>,
    #[serde(default)]
    pub field: Field<String>,
    pub start_year: Option<i64>,
    #[serde(default)]
    pub end_year: Field<i64>,
    pub is_ongoing: Option<bool>,
    #[serde(default)]
    pub description: Field<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExperienceRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub company: String,
    pub location: Option<String>,
    #[validate(required(message = "Missing required fields"))]
    pub start_date: Option<CalendarDate>,
    pub end_date: Option<CalendarDate>,
    pub is_current: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    #[serde(default)]
    pub location: Field<String>,
    pub start_date: Option<CalendarDate>,
    #[serde(default)]
    pub end_date: Field<CalendarDate>,
    pub is_current: Option<bool>,
    #[serde(default)]
    pub description: Field<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCertificationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub issuer: String,
    #[validate(required(message = "Missing required fields"))]
    pub issue_date: Option<CalendarDate>,
    pub expiry_date: Option<CalendarDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCertificationRequest {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub issue_date: Option<CalendarDate>,
    #[serde(default)]
    pub expiry_date: Field<CalendarDate>,
    #[serde(default)]
    pub credential_id: Field<String>,
    #[serde(default)]
    pub credential_url: Field<String>,
    #[serde(default)]
    pub description: Field<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub section_type: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub title: String,
    pub content: Option<String>,
    pub is_visible: Option<bool>,
    pub sort_order: Option<i64>,
    pub custom_data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectionRequest {
    pub section_type: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub content: Field<String>,
    pub is_visible: Option<bool>,
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub custom_data: Field<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_date_accepts_plain_and_timestamp_forms() {
        let plain: CalendarDate = serde_json::from_str("\"2020-09-01\"").unwrap();
        let stamp: CalendarDate = serde_json::from_str("\"2020-09-01T00:00:00.000Z\"").unwrap();
        assert_eq!(plain, stamp);
        assert_eq!(serde_json::to_string(&plain).unwrap(), "\"2020-09-01\"");
        assert!(serde_json::from_str::<CalendarDate>("\"yesterday\"").is_err());
    }

    #[test]
    fn create_request_flattens_profile_fields() {
        let req: CreateProfileRequest = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "displayName": "Ms. Ana",
            "specializations": ["IELTS"],
            "hourlyRate": 25.5
        }))
        .unwrap();
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.fields.display_name, Field::Value("Ms. Ana".to_string()));
        assert_eq!(req.fields.specializations, Some(vec!["IELTS".to_string()]));
        assert_eq!(req.fields.hourly_rate, Field::Value(25.5));
        assert!(req.fields.tagline.is_missing());
    }
}
