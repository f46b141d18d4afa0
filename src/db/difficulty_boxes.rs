// src/db/difficulty_boxes.rs

use sqlx::SqliteExecutor;

use crate::db::{Database, now, patch::UpdateBuilder};
use crate::models::difficulty_box::{
    DifficultyBox, DifficultyBoxEntry, PackageInfo, UpdateDifficultyBoxRequest,
};
use crate::models::level::DifficultyLevel;
use crate::utils::new_id;

const BOX_COLUMNS: &str = "b.id, b.package_id, b.difficulty, b.title, b.article, \
     b.created_at, b.updated_at, p.id AS pkg_id, p.title AS pkg_title, p.slug AS pkg_slug, \
     p.category AS pkg_category";

fn select_boxes() -> String {
    format!(
        "SELECT {BOX_COLUMNS} FROM package_difficulty_boxes b \
         JOIN exercise_packages p ON p.id = b.package_id"
    )
}

async fn insert_box<'e, E>(
    executor: E,
    package_id: &str,
    difficulty: DifficultyLevel,
    title: String,
    article: String,
) -> Result<String, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let id = new_id();
    let now = now();
    sqlx::query(
        r#"
        INSERT INTO package_difficulty_boxes (id, package_id, difficulty, title, article,
                                              created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(package_id)
    .bind(difficulty)
    .bind(title)
    .bind(article)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(id)
}

impl Database {
    /// Ordered by package title, then from easiest to hardest.
    pub async fn list_difficulty_boxes(
        &self,
        package_id: Option<&str>,
    ) -> Result<Vec<DifficultyBox>, sqlx::Error> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR b.package_id = ?1) ORDER BY p.title, {}, b.id",
            select_boxes(),
            DifficultyLevel::rank_sql("b.difficulty")
        );
        sqlx::query_as::<_, DifficultyBox>(&sql)
            .bind(package_id)
            .fetch_all(self.pool())
            .await
    }

    pub async fn find_difficulty_box(&self, id: &str) -> Result<Option<DifficultyBox>, sqlx::Error> {
        sqlx::query_as::<_, DifficultyBox>(&format!("{} WHERE b.id = ?", select_boxes()))
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn find_difficulty_box_for_level(
        &self,
        package_id: &str,
        difficulty: DifficultyLevel,
    ) -> Result<Option<DifficultyBox>, sqlx::Error> {
        sqlx::query_as::<_, DifficultyBox>(&format!(
            "{} WHERE b.package_id = ? AND b.difficulty = ?",
            select_boxes()
        ))
        .bind(package_id)
        .bind(difficulty)
        .fetch_optional(self.pool())
        .await
    }

    pub async fn package_info(&self, package_id: &str) -> Result<Option<PackageInfo>, sqlx::Error> {
        sqlx::query_as::<_, PackageInfo>("SELECT id, title FROM exercise_packages WHERE id = ?")
            .bind(package_id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn create_difficulty_box(
        &self,
        package_id: &str,
        difficulty: DifficultyLevel,
        title: String,
        article: String,
    ) -> Result<DifficultyBox, sqlx::Error> {
        let id = insert_box(self.pool(), package_id, difficulty, title, article).await?;
        self.find_difficulty_box(&id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Creates every box in one transaction; a duplicate level rolls back the batch.
    pub async fn create_difficulty_boxes_bulk(
        &self,
        package_id: &str,
        entries: Vec<DifficultyBoxEntry>,
    ) -> Result<Vec<DifficultyBox>, sqlx::Error> {
        let mut tx = self.begin().await?;
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let difficulty = entry.difficulty.unwrap_or_default();
            ids.push(insert_box(&mut *tx, package_id, difficulty, entry.title, entry.article).await?);
        }
        tx.commit().await?;

        let mut created = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(found) = self.find_difficulty_box(id).await? {
                created.push(found);
            }
        }
        Ok(created)
    }

    /// Returns `None` when the box does not exist.
    pub async fn update_difficulty_box(
        &self,
        id: &str,
        payload: UpdateDifficultyBoxRequest,
    ) -> Result<Option<DifficultyBox>, sqlx::Error> {
        let mut update = UpdateBuilder::new("package_difficulty_boxes");
        update
            .set_some("title", payload.title)
            .set_some("article", payload.article)
            .set("updated_at", now());

        if update.execute("id", id, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_difficulty_box(id).await
    }

    pub async fn delete_difficulty_box(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM package_difficulty_boxes WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
