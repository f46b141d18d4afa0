// src/db/packages.rs

use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite};

use crate::db::exercises::select_exercises;
use crate::db::{Database, now, patch::UpdateBuilder};
use crate::models::exercise::{Exercise, ExerciseSummary};
use crate::models::exercise_package::{
    CompletionResult, CreatePackageRequest, DEFAULT_MAX_EXERCISES, ExercisePackage, PackageFilter,
    UpdatePackageRequest, UserPackageCompletion, record_completion,
};
use crate::models::level::DifficultyLevel;
use crate::utils::new_id;
use crate::utils::query::PageRequest;

const PACKAGE_COLUMNS: &str = "id, slug, title, description, category, image_url, meta_title, \
     meta_description, max_exercises, is_published, featured, created_at, updated_at";

const PACKAGE_FILTER: &str = "(?1 IS NULL OR category = ?1) \
     AND (?2 IS NULL OR featured = ?2) \
     AND (?3 IS NULL OR is_published = ?3) \
     AND (?4 IS NULL OR title LIKE '%' || ?4 || '%' OR description LIKE '%' || ?4 || '%' \
          OR meta_title LIKE '%' || ?4 || '%')";

const COMPLETION_COLUMNS: &str =
    "user_id, package_id, completed_exercises, completion_rate, last_activity_at, created_at";

/// Exercises matching a free-text package search, before grouping.
#[derive(Debug, Clone)]
pub struct ExerciseMatchQuery<'a> {
    pub q: &'a str,
    pub difficulty: Option<DifficultyLevel>,
    pub category: Option<&'a str>,
}

fn push_published_ids(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[String]) {
    builder.push(" WHERE is_published = 1 AND id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");
}

impl Database {
    pub async fn list_packages(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> Result<(Vec<ExercisePackage>, i64), sqlx::Error> {
        let sql = format!(
            "SELECT {PACKAGE_COLUMNS} FROM exercise_packages WHERE {PACKAGE_FILTER} \
             ORDER BY featured DESC, created_at DESC, id LIMIT ?5 OFFSET ?6"
        );
        let packages = sqlx::query_as::<_, ExercisePackage>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.featured)
            .bind(filter.is_published)
            .bind(filter.search.as_deref())
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM exercise_packages WHERE {PACKAGE_FILTER}"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.featured)
        .bind(filter.is_published)
        .bind(filter.search.as_deref())
        .fetch_one(self.pool())
        .await?;

        Ok((packages, total))
    }

    pub async fn find_package(&self, id: &str) -> Result<Option<ExercisePackage>, sqlx::Error> {
        sqlx::query_as::<_, ExercisePackage>(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM exercise_packages WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    pub async fn find_package_by_slug(&self, slug: &str) -> Result<Option<ExercisePackage>, sqlx::Error> {
        sqlx::query_as::<_, ExercisePackage>(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM exercise_packages WHERE slug = ?"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
    }

    /// True when another package (not `except_id`) already uses the slug.
    pub async fn package_slug_taken(
        &self,
        slug: &str,
        except_id: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM exercise_packages WHERE slug = ?1 AND (?2 IS NULL OR id <> ?2))",
        )
        .bind(slug)
        .bind(except_id)
        .fetch_one(self.pool())
        .await
    }

    pub async fn create_package(&self, payload: CreatePackageRequest) -> Result<ExercisePackage, sqlx::Error> {
        let now = now();
        sqlx::query_as::<_, ExercisePackage>(&format!(
            r#"
            INSERT INTO exercise_packages (id, slug, title, description, category, image_url,
                                           meta_title, meta_description, max_exercises, is_published,
                                           featured, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {PACKAGE_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(payload.slug)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.category)
        .bind(payload.image_url)
        .bind(payload.meta_title)
        .bind(payload.meta_description)
        .bind(
            payload
                .max_exercises
                .filter(|n| *n != 0)
                .unwrap_or(DEFAULT_MAX_EXERCISES),
        )
        .bind(payload.is_published.unwrap_or(false))
        .bind(payload.featured.unwrap_or(false))
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await
    }

    pub async fn update_package(
        &self,
        id: &str,
        payload: UpdatePackageRequest,
    ) -> Result<Option<ExercisePackage>, sqlx::Error> {
        let mut update = UpdateBuilder::new("exercise_packages");
        update
            .set_some("title", payload.title)
            .set_some("slug", payload.slug)
            .set_some("description", payload.description)
            .set_field("category", payload.category)
            .set_field("image_url", payload.image_url)
            .set_field("meta_title", payload.meta_title)
            .set_field("meta_description", payload.meta_description)
            .set_some("max_exercises", payload.max_exercises)
            .set_some("is_published", payload.is_published)
            .set_some("featured", payload.featured)
            .set("updated_at", now());

        if update.execute("id", id, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_package(id).await
    }

    /// Deletes the package; its exercises are detached, not deleted.
    pub async fn delete_package(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exercise_packages WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_package_exercises(&self, package_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM exercises WHERE package_id = ?")
            .bind(package_id)
            .fetch_one(self.pool())
            .await
    }

    /// Full exercises of a package, easiest first, then oldest first.
    pub async fn package_exercises(
        &self,
        package_id: &str,
        difficulty: Option<DifficultyLevel>,
    ) -> Result<Vec<Exercise>, sqlx::Error> {
        let sql = format!(
            "{} WHERE e.package_id = ?1 AND (?2 IS NULL OR e.difficulty = ?2) \
             ORDER BY {}, e.created_at ASC, e.id",
            select_exercises(),
            DifficultyLevel::rank_sql("e.difficulty")
        );
        sqlx::query_as::<_, Exercise>(&sql)
            .bind(package_id)
            .bind(difficulty)
            .fetch_all(self.pool())
            .await
    }

    /// Points the exercise at the package (or detaches it with `None`).
    pub async fn set_exercise_package(
        &self,
        exercise_id: &str,
        package_id: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE exercises SET package_id = ?, updated_at = ? WHERE id = ?")
            .bind(package_id)
            .bind(now())
            .bind(exercise_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_completion(
        &self,
        user_id: &str,
        package_id: &str,
    ) -> Result<Option<UserPackageCompletion>, sqlx::Error> {
        sqlx::query_as::<_, UserPackageCompletion>(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM user_package_completions WHERE user_id = ? AND package_id = ?"
        ))
        .bind(user_id)
        .bind(package_id)
        .fetch_optional(self.pool())
        .await
    }

    /// Completion rows of one user for several packages, keyed by package id.
    pub async fn completions_for_user(
        &self,
        user_email: &str,
        package_ids: &[String],
    ) -> Result<HashMap<String, UserPackageCompletion>, sqlx::Error> {
        if package_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT c.user_id, c.package_id, c.completed_exercises, c.completion_rate, \
             c.last_activity_at, c.created_at FROM user_package_completions c \
             JOIN users u ON u.id = c.user_id WHERE u.email = ",
        );
        builder.push_bind(user_email);
        builder.push(" AND c.package_id IN (");
        let mut separated = builder.separated(", ");
        for id in package_ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows = builder
            .build_query_as::<UserPackageCompletion>()
            .fetch_all(self.pool())
            .await?;
        Ok(rows.into_iter().map(|c| (c.package_id.clone(), c)).collect())
    }

    /// Records one completed exercise for a user.
    ///
    /// Loads or lazily creates the progress row, adds the exercise once,
    /// recomputes the rate from the current exercise count and bumps the
    /// exercise's own completion counter. Concurrent calls for the same
    /// user and package are last-write-wins.
    pub async fn mark_exercise_complete(
        &self,
        user_id: &str,
        package_id: &str,
        exercise_id: &str,
    ) -> Result<CompletionResult, sqlx::Error> {
        let now = now();

        sqlx::query(
            r#"
            INSERT INTO user_package_completions
                (user_id, package_id, completed_exercises, completion_rate, last_activity_at, created_at)
            VALUES (?, ?, '[]', 0, ?, ?)
            ON CONFLICT(user_id, package_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(package_id)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        let progress = self
            .find_completion(user_id, package_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let total = self.count_package_exercises(package_id).await?;
        let result = record_completion(progress.completed_exercises, exercise_id, total);

        sqlx::query(
            r#"
            UPDATE user_package_completions
            SET completed_exercises = ?, completion_rate = ?, last_activity_at = ?
            WHERE user_id = ? AND package_id = ?
            "#,
        )
        .bind(Json(&result.completed_exercises))
        .bind(result.completion_rate)
        .bind(now)
        .bind(user_id)
        .bind(package_id)
        .execute(self.pool())
        .await?;

        self.increment_exercise_completions(exercise_id).await?;

        Ok(result)
    }

    /// Exercise summaries attached to some package that match the search text.
    pub async fn search_package_exercises(
        &self,
        query: &ExerciseMatchQuery<'_>,
    ) -> Result<Vec<ExerciseSummary>, sqlx::Error> {
        sqlx::query_as::<_, ExerciseSummary>(
            r#"
            SELECT id, title, difficulty, type, package_id FROM exercises
            WHERE package_id IS NOT NULL
              AND (title LIKE '%' || ?1 || '%'
                   OR instructions LIKE '%' || ?1 || '%'
                   OR EXISTS (SELECT 1 FROM json_each(exercises.tags) t WHERE t.value = lower(?1)))
              AND (?2 IS NULL OR difficulty = ?2)
              AND (?3 IS NULL OR category = ?3)
            ORDER BY created_at, id
            "#,
        )
        .bind(query.q)
        .bind(query.difficulty)
        .bind(query.category)
        .fetch_all(self.pool())
        .await
    }

    /// One page of the published packages among `ids`, plus their count.
    pub async fn published_packages_among(
        &self,
        ids: &[String],
        page: PageRequest,
    ) -> Result<(Vec<ExercisePackage>, i64), sqlx::Error> {
        if ids.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PACKAGE_COLUMNS} FROM exercise_packages"));
        push_published_ids(&mut builder, ids);
        builder.push(" ORDER BY featured DESC, created_at DESC, id LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());
        let packages = builder
            .build_query_as::<ExercisePackage>()
            .fetch_all(self.pool())
            .await?;

        let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM exercise_packages");
        push_published_ids(&mut count, ids);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool()).await?;

        Ok((packages, total))
    }
}
