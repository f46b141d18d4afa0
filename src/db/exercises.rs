// src/db/exercises.rs

use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::db::{Database, now, patch::UpdateBuilder, users::AUTHOR_COLUMNS};
use crate::models::exercise::{
    CreateExerciseRequest, Exercise, ExerciseFilter, ExerciseSummary, UpdateExerciseRequest,
};
use crate::utils::new_id;
use crate::utils::query::PageRequest;

pub(crate) const EXERCISE_COLUMNS: &str = "e.id, e.title, e.instructions, e.type, e.content, \
     e.difficulty, e.category, e.tags, e.hints, e.explanation, e.is_published, e.times_completed, \
     e.package_id, e.created_at, e.updated_at";

const EXERCISE_FILTER: &str = "(?1 IS NULL OR e.type = ?1) \
     AND (?2 IS NULL OR e.difficulty = ?2) \
     AND (?3 IS NULL OR e.category = ?3) \
     AND (?4 IS NULL OR e.author_email = ?4) \
     AND (?5 IS NULL OR e.is_published = ?5) \
     AND (?6 IS NULL OR EXISTS (SELECT 1 FROM json_each(e.tags) t \
                               WHERE t.value IN (SELECT value FROM json_each(?6)))) \
     AND (?7 IS NULL OR e.title LIKE '%' || ?7 || '%' OR e.instructions LIKE '%' || ?7 || '%')";

pub(crate) fn select_exercises() -> String {
    format!(
        "SELECT {EXERCISE_COLUMNS}, {AUTHOR_COLUMNS} FROM exercises e JOIN users u ON u.email = e.author_email"
    )
}

macro_rules! bind_exercise_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.exercise_type.as_deref())
            .bind($filter.difficulty)
            .bind($filter.category.as_deref())
            .bind($filter.author_email.as_deref())
            .bind($filter.is_published)
            .bind($filter.tags.as_deref())
            .bind($filter.search.as_deref())
    };
}

/// Inserts one exercise with the creation defaults applied; returns its id.
async fn insert_exercise<'e, E>(executor: E, payload: CreateExerciseRequest) -> Result<String, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let id = new_id();
    let now = now();
    sqlx::query(
        r#"
        INSERT INTO exercises (id, title, instructions, type, content, difficulty, category, tags,
                               hints, explanation, is_published, times_completed, author_email,
                               package_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(payload.title)
    .bind(payload.instructions)
    .bind(payload.exercise_type)
    .bind(Json(payload.content.unwrap_or_default()))
    .bind(payload.difficulty.unwrap_or_default())
    .bind(payload.category)
    .bind(Json(payload.tags))
    .bind(Json(payload.hints))
    .bind(payload.explanation)
    .bind(payload.is_published.unwrap_or(false))
    .bind(payload.author_email)
    .bind(payload.package_id)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(id)
}

impl Database {
    pub async fn list_exercises(
        &self,
        filter: &ExerciseFilter,
        page: PageRequest,
    ) -> Result<(Vec<Exercise>, i64), sqlx::Error> {
        let sql = format!(
            "{} WHERE {EXERCISE_FILTER} ORDER BY e.created_at DESC, e.id LIMIT ?8 OFFSET ?9",
            select_exercises()
        );
        let exercises = bind_exercise_filter!(sqlx::query_as::<_, Exercise>(&sql), filter)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM exercises e WHERE {EXERCISE_FILTER}");
        let total: i64 = bind_exercise_filter!(sqlx::query_scalar(&count_sql), filter)
            .fetch_one(self.pool())
            .await?;

        Ok((exercises, total))
    }

    /// Every exercise matching the filter, newest first.
    pub async fn find_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>, sqlx::Error> {
        let sql = format!(
            "{} WHERE {EXERCISE_FILTER} ORDER BY e.created_at DESC, e.id",
            select_exercises()
        );
        bind_exercise_filter!(sqlx::query_as::<_, Exercise>(&sql), filter)
            .fetch_all(self.pool())
            .await
    }

    pub async fn find_exercise(&self, id: &str) -> Result<Option<Exercise>, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(&format!("{} WHERE e.id = ?", select_exercises()))
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    async fn find_exercises_by_ids(&self, ids: &[String]) -> Result<Vec<Exercise>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(select_exercises());
        builder.push(" WHERE e.id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(") ORDER BY e.created_at, e.id");

        builder
            .build_query_as::<Exercise>()
            .fetch_all(self.pool())
            .await
    }

    pub async fn create_exercise(&self, payload: CreateExerciseRequest) -> Result<Exercise, sqlx::Error> {
        let id = insert_exercise(self.pool(), payload).await?;
        self.find_exercise(&id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Creates every exercise in one transaction; any failure rolls back the batch.
    pub async fn create_exercises_bulk(
        &self,
        payloads: Vec<CreateExerciseRequest>,
    ) -> Result<Vec<Exercise>, sqlx::Error> {
        let mut tx = self.begin().await?;
        let mut ids = Vec::with_capacity(payloads.len());
        for payload in payloads {
            ids.push(insert_exercise(&mut *tx, payload).await?);
        }
        tx.commit().await?;

        self.find_exercises_by_ids(&ids).await
    }

    /// Returns `None` when the exercise does not exist.
    pub async fn update_exercise(
        &self,
        id: &str,
        payload: UpdateExerciseRequest,
    ) -> Result<Option<Exercise>, sqlx::Error> {
        let mut update = UpdateBuilder::new("exercises");
        update
            .set_some("title", payload.title)
            .set_field("instructions", payload.instructions)
            .set_some("type", payload.exercise_type)
            .set_some("content", payload.content.map(Json))
            .set_some("difficulty", payload.difficulty)
            .set_field("category", payload.category)
            .set_some("tags", payload.tags.map(Json))
            .set_some("hints", payload.hints.map(Json))
            .set_field("explanation", payload.explanation)
            .set_some("is_published", payload.is_published)
            .set_field("package_id", payload.package_id)
            .set("updated_at", now());

        if update.execute("id", id, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_exercise(id).await
    }

    pub async fn delete_exercise(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomic `times_completed + 1`; returns false when the exercise does not exist.
    pub async fn increment_exercise_completions(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE exercises SET times_completed = times_completed + 1, updated_at = ? WHERE id = ?",
        )
        .bind(now())
        .bind(id)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Summaries of the exercises attached to any of the given packages.
    pub async fn exercise_summaries_for_packages(
        &self,
        package_ids: &[String],
    ) -> Result<Vec<ExerciseSummary>, sqlx::Error> {
        if package_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, title, difficulty, type, package_id FROM exercises WHERE package_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in package_ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(") ORDER BY created_at, id");

        builder
            .build_query_as::<ExerciseSummary>()
            .fetch_all(self.pool())
            .await
    }
}
