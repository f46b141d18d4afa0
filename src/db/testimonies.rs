// src/db/testimonies.rs

use crate::db::{Database, now, users::AUTHOR_COLUMNS};
use crate::models::testimony::Testimony;
use crate::utils::new_id;

fn select_testimonies() -> String {
    format!(
        "SELECT t.id, t.content, t.rating, t.user_email, t.featured, t.created_at, t.updated_at, \
         {AUTHOR_COLUMNS} FROM testimonies t JOIN users u ON u.email = t.user_email"
    )
}

impl Database {
    /// Newest first, optionally restricted to featured ones or to one author.
    pub async fn list_testimonies(
        &self,
        featured: Option<bool>,
        user_email: Option<&str>,
    ) -> Result<Vec<Testimony>, sqlx::Error> {
        let sql = format!(
            "{} WHERE (?1 IS NULL OR t.featured = ?1) AND (?2 IS NULL OR t.user_email = ?2) \
             ORDER BY t.created_at DESC, t.id",
            select_testimonies()
        );
        sqlx::query_as::<_, Testimony>(&sql)
            .bind(featured)
            .bind(user_email)
            .fetch_all(self.pool())
            .await
    }

    pub async fn create_testimony(
        &self,
        content: String,
        rating: i64,
        user_email: String,
    ) -> Result<Testimony, sqlx::Error> {
        let id = new_id();
        let now = now();
        sqlx::query(
            r#"
            INSERT INTO testimonies (id, content, rating, user_email, featured, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(content)
        .bind(rating)
        .bind(user_email)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        sqlx::query_as::<_, Testimony>(&format!("{} WHERE t.id = ?", select_testimonies()))
            .bind(&id)
            .fetch_one(self.pool())
            .await
    }
}
