// src/db/page_config.rs

use sqlx::types::Json;

use crate::db::{Database, now, patch::UpdateBuilder};
use crate::models::page_config::{
    CreatePageConfigRequest, DEFAULT_IMAGE_TYPES, DEFAULT_LANGUAGE,
    DEFAULT_MAX_API_REQUESTS_PER_HOUR, DEFAULT_MAX_IMAGE_SIZE, DEFAULT_MAX_VIDEO_SIZE,
    DEFAULT_POINTS_PER_EXERCISE, DEFAULT_POINTS_PER_PACKAGE, DEFAULT_SITE_NAME,
    DEFAULT_SUPPORT_EMAIL_NAME, DEFAULT_SUPPORTED_LANGUAGES, DEFAULT_VERSION, DEFAULT_VIDEO_TYPES,
    PageConfig, PageConfigFields, UpdatePageConfigRequest,
};
use crate::utils::new_id;

fn string_list(items: &[&str]) -> Json<Vec<String>> {
    Json(items.iter().map(|s| s.to_string()).collect())
}

fn apply_page_fields(update: &mut UpdateBuilder<'_>, fields: PageConfigFields) {
    update
        .set_some("site_name", fields.site_name)
        .set_field("tagline", fields.tagline)
        .set_field("whatsapp", fields.whatsapp)
        .set_field("telegram", fields.telegram)
        .set_field("support_email", fields.support_email)
        .set_field("facebook", fields.facebook)
        .set_field("instagram", fields.instagram)
        .set_field("linkedin", fields.linkedin)
        .set_field("youtube", fields.youtube)
        .set_field("tiktok", fields.tiktok)
        .set_some("instagram_posts", fields.instagram_posts.map(Json))
        .set_some("tiktok_posts", fields.tiktok_posts.map(Json))
        .set_field("meta_title", fields.meta_title)
        .set_field("meta_description", fields.meta_description)
        .set_some("keywords", fields.keywords.map(Json))
        .set_field("favicon", fields.favicon)
        .set_field("logo", fields.logo)
        .set_field("logo_alt", fields.logo_alt)
        .set_some("enable_registration", fields.enable_registration)
        .set_some("enable_teacher_profiles", fields.enable_teacher_profiles)
        .set_some("enable_exercise_packages", fields.enable_exercise_packages)
        .set_some("enable_games", fields.enable_games)
        .set_some("enable_testimonials", fields.enable_testimonials)
        .set_some("enable_blog", fields.enable_blog)
        .set_some("maintenance_mode", fields.maintenance_mode)
        .set_field("welcome_message", fields.welcome_message)
        .set_field("footer_text", fields.footer_text)
        .set_field("privacy_policy_url", fields.privacy_policy_url)
        .set_field("terms_of_service_url", fields.terms_of_service_url)
        .set_field("about_us_content", fields.about_us_content)
        .set_some("default_language", fields.default_language)
        .set_some("supported_languages", fields.supported_languages.map(Json))
        .set_field("google_analytics_id", fields.google_analytics_id)
        .set_field("facebook_pixel_id", fields.facebook_pixel_id)
        .set_field("hotjar_id", fields.hotjar_id)
        .set_some("support_email_name", fields.support_email_name)
        .set_field("no_reply_email", fields.no_reply_email)
        .set_field("email_signature", fields.email_signature)
        .set_some("points_per_exercise", fields.points_per_exercise)
        .set_some("points_per_package_complete", fields.points_per_package_complete)
        .set_some("max_api_requests_per_hour", fields.max_api_requests_per_hour)
        .set_some("enable_public_api", fields.enable_public_api)
        .set_field("webhook_secret", fields.webhook_secret)
        .set_some("max_image_size", fields.max_image_size)
        .set_some("max_video_size", fields.max_video_size)
        .set_some("allowed_image_types", fields.allowed_image_types.map(Json))
        .set_some("allowed_video_types", fields.allowed_video_types.map(Json))
        .set_some("version", fields.version)
        .set_field("updated_by", fields.updated_by);
}

impl Database {
    /// The newest configuration row, if any.
    pub async fn latest_page_config(&self) -> Result<Option<PageConfig>, sqlx::Error> {
        sqlx::query_as::<_, PageConfig>(
            "SELECT * FROM page_configs ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await
    }

    pub async fn find_page_config(&self, id: &str) -> Result<Option<PageConfig>, sqlx::Error> {
        sqlx::query_as::<_, PageConfig>("SELECT * FROM page_configs WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn page_config_exists(&self) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM page_configs)")
            .fetch_one(self.pool())
            .await
    }

    /// Inserts the row with column defaults, then applies the optional
    /// settings, inside one transaction.
    pub async fn create_page_config(
        &self,
        payload: CreatePageConfigRequest,
    ) -> Result<PageConfig, sqlx::Error> {
        let id = new_id();
        let now = now();

        let mut tx = self.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO page_configs (id, description, address, phone, email, last_updated, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(payload.description)
        .bind(payload.address)
        .bind(payload.phone)
        .bind(payload.email)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut update = UpdateBuilder::new("page_configs");
        apply_page_fields(&mut update, payload.fields);
        update.execute("id", &id, &mut *tx).await?;
        tx.commit().await?;

        self.find_page_config(&id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Applies the present fields and stamps `last_updated`; `None` when absent.
    pub async fn update_page_config(
        &self,
        id: &str,
        payload: UpdatePageConfigRequest,
    ) -> Result<Option<PageConfig>, sqlx::Error> {
        let mut update = UpdateBuilder::new("page_configs");
        update
            .set_some("description", payload.description)
            .set_some("address", payload.address)
            .set_some("phone", payload.phone)
            .set_some("email", payload.email);
        apply_page_fields(&mut update, payload.fields);
        update.set("last_updated", now());

        if update.execute("id", id, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_page_config(id).await
    }

    /// Restores feature flags, limits and language settings to their
    /// defaults. Contact details and content are kept.
    pub async fn reset_page_config(
        &self,
        id: &str,
        updated_by: Option<String>,
    ) -> Result<Option<PageConfig>, sqlx::Error> {
        let mut update = UpdateBuilder::new("page_configs");
        update
            .set("site_name", DEFAULT_SITE_NAME)
            .set("enable_registration", true)
            .set("enable_teacher_profiles", true)
            .set("enable_exercise_packages", true)
            .set("enable_games", true)
            .set("enable_testimonials", true)
            .set("enable_blog", true)
            .set("maintenance_mode", false)
            .set("default_language", DEFAULT_LANGUAGE)
            .set("supported_languages", string_list(&DEFAULT_SUPPORTED_LANGUAGES))
            .set("support_email_name", DEFAULT_SUPPORT_EMAIL_NAME)
            .set("points_per_exercise", DEFAULT_POINTS_PER_EXERCISE)
            .set("points_per_package_complete", DEFAULT_POINTS_PER_PACKAGE)
            .set("max_api_requests_per_hour", DEFAULT_MAX_API_REQUESTS_PER_HOUR)
            .set("enable_public_api", false)
            .set("max_image_size", DEFAULT_MAX_IMAGE_SIZE)
            .set("max_video_size", DEFAULT_MAX_VIDEO_SIZE)
            .set("allowed_image_types", string_list(&DEFAULT_IMAGE_TYPES))
            .set("allowed_video_types", string_list(&DEFAULT_VIDEO_TYPES))
            .set("version", DEFAULT_VERSION)
            .set("last_updated", now())
            .set("updated_by", updated_by.unwrap_or_else(|| "system".to_string()));

        if update.execute("id", id, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_page_config(id).await
    }
}
