// src/db/dynamics.rs

use crate::db::{Database, now, patch::UpdateBuilder, users::AUTHOR_COLUMNS};
use crate::models::dynamic::{CreateDynamicRequest, Dynamic, DynamicFilter, UpdateDynamicRequest};
use crate::utils::new_id;
use crate::utils::query::{PageRequest, SortField, SortOrder};

const DYNAMIC_COLUMNS: &str = "d.id, d.slug, d.title, d.objective, d.description, d.content, \
     d.materials_needed, d.duration, d.min_students, d.max_students, d.age_group, d.difficulty, \
     d.dynamic_type, d.featured, d.published, d.created_at, d.updated_at";

const DYNAMIC_FILTER: &str = "(?1 IS NULL OR d.published = ?1) \
     AND (?2 IS NULL OR d.featured = ?2) \
     AND (?3 IS NULL OR d.dynamic_type = ?3) \
     AND (?4 IS NULL OR d.age_group = ?4) \
     AND (?5 IS NULL OR d.difficulty = ?5) \
     AND (?6 IS NULL OR d.duration >= ?6) \
     AND (?7 IS NULL OR d.duration <= ?7) \
     AND (?8 IS NULL OR d.author_email = ?8)";

fn select_dynamics() -> String {
    format!(
        "SELECT {DYNAMIC_COLUMNS}, {AUTHOR_COLUMNS} FROM dynamics d JOIN users u ON u.email = d.author_email"
    )
}

macro_rules! bind_dynamic_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.published)
            .bind($filter.featured)
            .bind($filter.dynamic_type.as_deref())
            .bind($filter.age_group.as_deref())
            .bind($filter.difficulty)
            .bind($filter.min_duration)
            .bind($filter.max_duration)
            .bind($filter.author_email.as_deref())
    };
}

/// Values written by `create_dynamic` after defaults are applied.
struct NewDynamic {
    materials_needed: Option<String>,
    min_students: i64,
    max_students: Option<i64>,
}

impl NewDynamic {
    fn from_request(payload: &CreateDynamicRequest) -> Self {
        Self {
            materials_needed: payload.materials_needed.clone().filter(|m| !m.is_empty()),
            min_students: payload.min_students.filter(|n| *n != 0).unwrap_or(1),
            max_students: payload.max_students.filter(|n| *n != 0),
        }
    }
}

impl Database {
    pub async fn list_dynamics(
        &self,
        filter: &DynamicFilter,
        sort: SortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<Dynamic>, i64), sqlx::Error> {
        let sql = format!(
            "{} WHERE {DYNAMIC_FILTER} ORDER BY d.{} {}, d.id LIMIT ?9 OFFSET ?10",
            select_dynamics(),
            sort.column(),
            order.as_sql()
        );
        let dynamics = bind_dynamic_filter!(sqlx::query_as::<_, Dynamic>(&sql), filter)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM dynamics d WHERE {DYNAMIC_FILTER}");
        let total: i64 = bind_dynamic_filter!(sqlx::query_scalar(&count_sql), filter)
            .fetch_one(self.pool())
            .await?;

        Ok((dynamics, total))
    }

    /// Dynamics matching the filter, newest first. `limit` of `None` means no limit.
    pub async fn find_dynamics(
        &self,
        filter: &DynamicFilter,
        limit: Option<i64>,
    ) -> Result<Vec<Dynamic>, sqlx::Error> {
        let sql = format!(
            "{} WHERE {DYNAMIC_FILTER} ORDER BY d.created_at DESC, d.id LIMIT ?9",
            select_dynamics()
        );
        bind_dynamic_filter!(sqlx::query_as::<_, Dynamic>(&sql), filter)
            .bind(limit.unwrap_or(-1))
            .fetch_all(self.pool())
            .await
    }

    pub async fn find_dynamic_by_slug(&self, slug: &str) -> Result<Option<Dynamic>, sqlx::Error> {
        sqlx::query_as::<_, Dynamic>(&format!("{} WHERE d.slug = ?", select_dynamics()))
            .bind(slug)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn dynamic_slug_exists(&self, slug: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM dynamics WHERE slug = ?)")
            .bind(slug)
            .fetch_one(self.pool())
            .await
    }

    /// Inserts a dynamic. `featured` must already reflect the author's role.
    pub async fn create_dynamic(
        &self,
        payload: CreateDynamicRequest,
        featured: bool,
    ) -> Result<Dynamic, sqlx::Error> {
        let defaults = NewDynamic::from_request(&payload);
        let now = now();
        let slug = payload.slug.clone();

        sqlx::query(
            r#"
            INSERT INTO dynamics (id, slug, title, objective, description, content, materials_needed,
                                  duration, min_students, max_students, age_group, difficulty,
                                  dynamic_type, featured, published, author_email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_id())
        .bind(payload.slug)
        .bind(payload.title)
        .bind(payload.objective)
        .bind(payload.description)
        .bind(payload.content)
        .bind(defaults.materials_needed)
        .bind(payload.duration.unwrap_or_default())
        .bind(defaults.min_students)
        .bind(defaults.max_students)
        .bind(payload.age_group)
        .bind(payload.difficulty.unwrap_or_default())
        .bind(payload.dynamic_type)
        .bind(featured)
        .bind(payload.published.unwrap_or(true))
        .bind(payload.author_email)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.find_dynamic_by_slug(&slug)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Returns `None` when no dynamic has this slug.
    pub async fn update_dynamic(
        &self,
        slug: &str,
        payload: UpdateDynamicRequest,
    ) -> Result<Option<Dynamic>, sqlx::Error> {
        let truthy = |s: Option<String>| s.filter(|v| !v.is_empty());
        let non_zero = |n: Option<i64>| n.filter(|v| *v != 0);

        let mut update = UpdateBuilder::new("dynamics");
        update
            .set_some("title", truthy(payload.title))
            .set_some("objective", truthy(payload.objective))
            .set_some("description", truthy(payload.description))
            .set_some("content", truthy(payload.content))
            .set_field("materials_needed", payload.materials_needed)
            .set_some("duration", non_zero(payload.duration))
            .set_some("min_students", non_zero(payload.min_students))
            .set_some("age_group", truthy(payload.age_group))
            .set_some("difficulty", payload.difficulty)
            .set_some("dynamic_type", truthy(payload.dynamic_type))
            .set_some("published", payload.published)
            .set_some("featured", payload.featured)
            .set("updated_at", now());

        if let Some(max) = payload.max_students.into_update() {
            update.set("max_students", max.filter(|n| *n != 0));
        }

        if update.execute("slug", slug, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_dynamic_by_slug(slug).await
    }

    pub async fn delete_dynamic(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM dynamics WHERE slug = ?")
            .bind(slug)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(min: Option<i64>, max: Option<i64>, materials: Option<&str>) -> CreateDynamicRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Icebreaker",
            "slug": "icebreaker",
            "objective": "o",
            "description": "d",
            "content": "c",
            "authorEmail": "t@example.com",
            "duration": 10,
            "ageGroup": "ADULTS",
            "dynamicType": "SPEAKING",
            "minStudents": min,
            "maxStudents": max,
            "materialsNeeded": materials,
        }))
        .unwrap()
    }

    #[test]
    fn min_students_defaults_to_one() {
        assert_eq!(NewDynamic::from_request(&request(None, None, None)).min_students, 1);
        assert_eq!(NewDynamic::from_request(&request(Some(0), None, None)).min_students, 1);
        assert_eq!(NewDynamic::from_request(&request(Some(4), None, None)).min_students, 4);
    }

    #[test]
    fn falsy_optionals_become_null() {
        let new = NewDynamic::from_request(&request(None, Some(0), Some("")));
        assert_eq!(new.max_students, None);
        assert_eq!(new.materials_needed, None);

        let new = NewDynamic::from_request(&request(None, Some(30), Some("cards")));
        assert_eq!(new.max_students, Some(30));
        assert_eq!(new.materials_needed.as_deref(), Some("cards"));
    }
}
