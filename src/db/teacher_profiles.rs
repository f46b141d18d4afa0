// src/db/teacher_profiles.rs

use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;

use crate::db::{Database, now, patch::UpdateBuilder, users::AUTHOR_COLUMNS};
use crate::models::teacher_profile::{
    CreateCertificationRequest, CreateEducationRequest, CreateExperienceRequest,
    CreateSectionRequest, ProfileFields, ProfileFilter, ProfileSection, ProfileSortField,
    TeacherCertification, TeacherEducation, TeacherExperience, TeacherProfile,
    UpdateCertificationRequest, UpdateEducationRequest, UpdateExperienceRequest,
    UpdateSectionRequest,
};
use crate::utils::new_id;
use crate::utils::query::{PageRequest, SortOrder};

const PROFILE_COLUMNS: &str = "tp.id, tp.user_id, tp.display_name, tp.tagline, tp.bio, \
     tp.profile_image, tp.cover_image, tp.theme_color, tp.layout_style, tp.phone_number, \
     tp.whatsapp, tp.telegram, tp.instagram, tp.linkedin, tp.website, tp.timezone, \
     tp.years_experience, tp.native_language, tp.teaching_languages, tp.specializations, \
     tp.teaching_style, tp.classroom_rules, tp.availability_tags, tp.hourly_rate, tp.currency, \
     tp.is_public, tp.profile_views, tp.last_active, tp.created_at, tp.updated_at";

/// Public TEACHER profiles; list filters match when any element is shared.
const PROFILE_FILTER: &str = "tp.is_public = 1 AND u.role = 'TEACHER' \
     AND (?1 IS NULL OR tp.display_name LIKE '%' || ?1 || '%' OR tp.tagline LIKE '%' || ?1 || '%' \
          OR tp.bio LIKE '%' || ?1 || '%' OR u.name LIKE '%' || ?1 || '%') \
     AND (?2 IS NULL OR EXISTS (SELECT 1 FROM json_each(tp.teaching_languages) l \
                               WHERE l.value IN (SELECT value FROM json_each(?2)))) \
     AND (?3 IS NULL OR EXISTS (SELECT 1 FROM json_each(tp.specializations) s \
                               WHERE s.value IN (SELECT value FROM json_each(?3)))) \
     AND (?4 IS NULL OR EXISTS (SELECT 1 FROM json_each(tp.availability_tags) a \
                               WHERE a.value IN (SELECT value FROM json_each(?4))))";

fn select_profiles() -> String {
    format!(
        "SELECT {PROFILE_COLUMNS}, {AUTHOR_COLUMNS} FROM teacher_profiles tp JOIN users u ON u.id = tp.user_id"
    )
}

macro_rules! bind_profile_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.q.as_deref())
            .bind($filter.languages.as_deref())
            .bind($filter.specializations.as_deref())
            .bind($filter.availability.as_deref())
    };
}

/// Tables hanging off a teacher profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileChild {
    Education,
    Experience,
    Certification,
    Section,
}

impl ProfileChild {
    fn table(&self) -> &'static str {
        match self {
            ProfileChild::Education => "teacher_education",
            ProfileChild::Experience => "teacher_experience",
            ProfileChild::Certification => "teacher_certifications",
            ProfileChild::Section => "teacher_sections",
        }
    }
}

fn apply_profile_fields(update: &mut UpdateBuilder<'_>, fields: ProfileFields) {
    update
        .set_field("display_name", fields.display_name)
        .set_field("tagline", fields.tagline)
        .set_field("bio", fields.bio)
        .set_field("profile_image", fields.profile_image)
        .set_field("cover_image", fields.cover_image)
        .set_field("theme_color", fields.theme_color)
        .set_field("layout_style", fields.layout_style)
        .set_field("phone_number", fields.phone_number)
        .set_field("whatsapp", fields.whatsapp)
        .set_field("telegram", fields.telegram)
        .set_field("instagram", fields.instagram)
        .set_field("linkedin", fields.linkedin)
        .set_field("website", fields.website)
        .set_field("timezone", fields.timezone)
        .set_field("years_experience", fields.years_experience)
        .set_field("native_language", fields.native_language)
        .set_some("teaching_languages", fields.teaching_languages.map(Json))
        .set_some("specializations", fields.specializations.map(Json))
        .set_field("teaching_style", fields.teaching_style)
        .set_field("classroom_rules", fields.classroom_rules)
        .set_some("availability_tags", fields.availability_tags.map(Json))
        .set_field("hourly_rate", fields.hourly_rate)
        .set_field("currency", fields.currency)
        .set_some("is_public", fields.is_public);
}

impl Database {
    pub async fn list_teacher_profiles(
        &self,
        filter: &ProfileFilter,
        sort: ProfileSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<TeacherProfile>, i64), sqlx::Error> {
        let sql = format!(
            "{} WHERE {PROFILE_FILTER} ORDER BY {} {}, tp.id LIMIT ?5 OFFSET ?6",
            select_profiles(),
            sort.column(),
            order.as_sql()
        );
        let profiles = bind_profile_filter!(sqlx::query_as::<_, TeacherProfile>(&sql), filter)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM teacher_profiles tp JOIN users u ON u.id = tp.user_id WHERE {PROFILE_FILTER}"
        );
        let total: i64 = bind_profile_filter!(sqlx::query_scalar(&count_sql), filter)
            .fetch_one(self.pool())
            .await?;

        Ok((profiles, total))
    }

    /// Public profiles ordered by views, then by latest activity.
    pub async fn search_teacher_profiles(
        &self,
        filter: &ProfileFilter,
        limit: Option<i64>,
    ) -> Result<Vec<TeacherProfile>, sqlx::Error> {
        let sql = format!(
            "{} WHERE {PROFILE_FILTER} \
             ORDER BY tp.profile_views DESC, tp.last_active DESC, tp.id LIMIT ?5",
            select_profiles()
        );
        bind_profile_filter!(sqlx::query_as::<_, TeacherProfile>(&sql), filter)
            .bind(limit.unwrap_or(-1))
            .fetch_all(self.pool())
            .await
    }

    pub async fn find_teacher_profile(&self, user_id: &str) -> Result<Option<TeacherProfile>, sqlx::Error> {
        sqlx::query_as::<_, TeacherProfile>(&format!("{} WHERE tp.user_id = ?", select_profiles()))
            .bind(user_id)
            .fetch_optional(self.pool())
            .await
    }

    /// Inserts the profile row and applies the given fields in one transaction.
    pub async fn create_teacher_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> Result<TeacherProfile, sqlx::Error> {
        let id = new_id();
        let now = now();

        let mut tx = self.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO teacher_profiles (id, user_id, last_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut update = UpdateBuilder::new("teacher_profiles");
        apply_profile_fields(&mut update, fields);
        update.execute("id", &id, &mut *tx).await?;
        tx.commit().await?;

        self.find_teacher_profile(user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Returns `None` when the user has no profile.
    pub async fn update_teacher_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> Result<Option<TeacherProfile>, sqlx::Error> {
        let mut update = UpdateBuilder::new("teacher_profiles");
        apply_profile_fields(&mut update, fields);
        update.set("updated_at", now());

        if update.execute("user_id", user_id, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_teacher_profile(user_id).await
    }

    pub async fn delete_teacher_profile(&self, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teacher_profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `profile_views + 1` and `last_active = now`; false when there is no profile.
    pub async fn record_profile_view(&self, user_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE teacher_profiles SET profile_views = profile_views + 1, last_active = ? WHERE user_id = ?",
        )
        .bind(now())
        .bind(user_id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn profile_education(
        &self,
        profile_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<TeacherEducation>, sqlx::Error> {
        sqlx::query_as::<_, TeacherEducation>(
            "SELECT * FROM teacher_education WHERE profile_id = ? ORDER BY start_year DESC, created_at DESC LIMIT ?",
        )
        .bind(profile_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(self.pool())
        .await
    }

    pub async fn profile_experience(&self, profile_id: &str) -> Result<Vec<TeacherExperience>, sqlx::Error> {
        sqlx::query_as::<_, TeacherExperience>(
            "SELECT * FROM teacher_experience WHERE profile_id = ? ORDER BY start_date DESC, created_at DESC",
        )
        .bind(profile_id)
        .fetch_all(self.pool())
        .await
    }

    pub async fn profile_certifications(
        &self,
        profile_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<TeacherCertification>, sqlx::Error> {
        sqlx::query_as::<_, TeacherCertification>(
            "SELECT * FROM teacher_certifications WHERE profile_id = ? ORDER BY issue_date DESC, created_at DESC LIMIT ?",
        )
        .bind(profile_id)
        .bind(limit.unwrap_or(-1))
        .fetch_all(self.pool())
        .await
    }

    /// Sections in display order; `visible_only` hides the ones switched off.
    pub async fn profile_sections(
        &self,
        profile_id: &str,
        visible_only: bool,
    ) -> Result<Vec<ProfileSection>, sqlx::Error> {
        sqlx::query_as::<_, ProfileSection>(
            "SELECT * FROM teacher_sections WHERE profile_id = ?1 AND (?2 = 0 OR is_visible = 1) \
             ORDER BY sort_order, created_at",
        )
        .bind(profile_id)
        .bind(visible_only)
        .fetch_all(self.pool())
        .await
    }

    async fn find_profile_child<T>(&self, child: ProfileChild, id: &str) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        sqlx::query_as::<_, T>(&format!("SELECT * FROM {} WHERE id = ?", child.table()))
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    /// Deletes a child row only when it belongs to `profile_id`.
    pub async fn delete_profile_child(
        &self,
        child: ProfileChild,
        profile_id: &str,
        id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = ? AND profile_id = ?",
            child.table()
        ))
        .bind(id)
        .bind(profile_id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn add_education(
        &self,
        profile_id: &str,
        payload: CreateEducationRequest,
    ) -> Result<TeacherEducation, sqlx::Error> {
        sqlx::query_as::<_, TeacherEducation>(
            r#"
            INSERT INTO teacher_education (id, profile_id, degree, institution, field, start_year,
                                           end_year, is_ongoing, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(profile_id)
        .bind(payload.degree)
        .bind(payload.institution)
        .bind(payload.field)
        .bind(payload.start_year)
        .bind(payload.end_year)
        .bind(payload.is_ongoing.unwrap_or(false))
        .bind(payload.description)
        .bind(now())
        .fetch_one(self.pool())
        .await
    }

    /// Returns `None` when the entry does not exist on this profile.
    pub async fn update_education(
        &self,
        profile_id: &str,
        id: &str,
        payload: UpdateEducationRequest,
    ) -> Result<Option<TeacherEducation>, sqlx::Error> {
        let mut update = UpdateBuilder::new(ProfileChild::Education.table());
        update
            .set_some("degree", payload.degree)
            .set_some("institution", payload.institution)
            .set_field("field", payload.field)
            .set_some("start_year", payload.start_year)
            .set_field("end_year", payload.end_year)
            .set_some("is_ongoing", payload.is_ongoing)
            .set_field("description", payload.description)
            .scope("profile_id", profile_id);

        self.finish_child_update(ProfileChild::Education, update, profile_id, id)
            .await
    }

    pub async fn add_experience(
        &self,
        profile_id: &str,
        payload: CreateExperienceRequest,
    ) -> Result<TeacherExperience, sqlx::Error> {
        sqlx::query_as::<_, TeacherExperience>(
            r#"
            INSERT INTO teacher_experience (id, profile_id, title, company, location, start_date,
                                            end_date, is_current, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(profile_id)
        .bind(payload.title)
        .bind(payload.company)
        .bind(payload.location)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.is_current.unwrap_or(false))
        .bind(payload.description)
        .bind(now())
        .fetch_one(self.pool())
        .await
    }

    pub async fn update_experience(
        &self,
        profile_id: &str,
        id: &str,
        payload: UpdateExperienceRequest,
    ) -> Result<Option<TeacherExperience>, sqlx::Error> {
        let mut update = UpdateBuilder::new(ProfileChild::Experience.table());
        update
            .set_some("title", payload.title)
            .set_some("company", payload.company)
            .set_field("location", payload.location)
            .set_some("start_date", payload.start_date)
            .set_field("end_date", payload.end_date)
            .set_some("is_current", payload.is_current)
            .set_field("description", payload.description)
            .scope("profile_id", profile_id);

        self.finish_child_update(ProfileChild::Experience, update, profile_id, id)
            .await
    }

    pub async fn add_certification(
        &self,
        profile_id: &str,
        payload: CreateCertificationRequest,
    ) -> Result<TeacherCertification, sqlx::Error> {
        sqlx::query_as::<_, TeacherCertification>(
            r#"
            INSERT INTO teacher_certifications (id, profile_id, name, issuer, issue_date, expiry_date,
                                                credential_id, credential_url, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(profile_id)
        .bind(payload.name)
        .bind(payload.issuer)
        .bind(payload.issue_date)
        .bind(payload.expiry_date)
        .bind(payload.credential_id)
        .bind(payload.credential_url)
        .bind(payload.description)
        .bind(now())
        .fetch_one(self.pool())
        .await
    }

    pub async fn update_certification(
        &self,
        profile_id: &str,
        id: &str,
        payload: UpdateCertificationRequest,
    ) -> Result<Option<TeacherCertification>, sqlx::Error> {
        let mut update = UpdateBuilder::new(ProfileChild::Certification.table());
        update
            .set_some("name", payload.name)
            .set_some("issuer", payload.issuer)
            .set_some("issue_date", payload.issue_date)
            .set_field("expiry_date", payload.expiry_date)
            .set_field("credential_id", payload.credential_id)
            .set_field("credential_url", payload.credential_url)
            .set_field("description", payload.description)
            .scope("profile_id", profile_id);

        self.finish_child_update(ProfileChild::Certification, update, profile_id, id)
            .await
    }

    pub async fn add_section(
        &self,
        profile_id: &str,
        payload: CreateSectionRequest,
    ) -> Result<ProfileSection, sqlx::Error> {
        let now = now();
        sqlx::query_as::<_, ProfileSection>(
            r#"
            INSERT INTO teacher_sections (id, profile_id, section_type, title, content, is_visible,
                                          sort_order, custom_data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(profile_id)
        .bind(payload.section_type)
        .bind(payload.title)
        .bind(payload.content)
        .bind(payload.is_visible.unwrap_or(true))
        .bind(payload.sort_order.unwrap_or(0))
        .bind(payload.custom_data.map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await
    }

    pub async fn update_section(
        &self,
        profile_id: &str,
        id: &str,
        payload: UpdateSectionRequest,
    ) -> Result<Option<ProfileSection>, sqlx::Error> {
        let mut update = UpdateBuilder::new(ProfileChild::Section.table());
        update
            .set_some("section_type", payload.section_type)
            .set_some("title", payload.title)
            .set_field("content", payload.content)
            .set_some("is_visible", payload.is_visible)
            .set_some("sort_order", payload.sort_order)
            .set_field("custom_data", payload.custom_data.map(Json))
            .set("updated_at", now())
            .scope("profile_id", profile_id);

        self.finish_child_update(ProfileChild::Section, update, profile_id, id)
            .await
    }

    /// Runs a child update and reloads the row. An empty update still
    /// checks that the row belongs to the profile.
    async fn finish_child_update<'a, T>(
        &self,
        child: ProfileChild,
        update: UpdateBuilder<'a>,
        profile_id: &str,
        id: &'a str,
    ) -> Result<Option<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        if update.is_empty() {
            let owned: bool = sqlx::query_scalar(&format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ? AND profile_id = ?)",
                child.table()
            ))
            .bind(id)
            .bind(profile_id)
            .fetch_one(self.pool())
            .await?;
            if !owned {
                return Ok(None);
            }
        } else if update.execute("id", id, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_profile_child(child, id).await
    }
}
