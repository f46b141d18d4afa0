// src/db/users.rs

use crate::db::{Database, now, patch::UpdateBuilder};
use crate::models::user::{CreateUserRequest, UpdateUserRequest, User, UserRole};
use crate::utils::new_id;

/// Author columns for joins against `users u`, matching `AuthorSummary`.
pub const AUTHOR_COLUMNS: &str = "u.id AS author_id, u.email AS author_email, \
     u.name AS author_name, u.picture AS author_picture, u.role AS author_role";

const USER_COLUMNS: &str = "id, email, name, role, country, picture, preferred_color, \
     preferred_language, created_at, updated_at";

impl Database {
    pub async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool())
        .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn create_user(&self, payload: CreateUserRequest) -> Result<User, sqlx::Error> {
        let now = now();
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, name, role, country, picture, preferred_color,
                               preferred_language, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(payload.email)
        .bind(payload.name)
        .bind(payload.role.unwrap_or_default())
        .bind(payload.country)
        .bind(payload.picture)
        .bind(payload.preferred_color)
        .bind(payload.preferred_language)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await
    }

    /// Applies the present fields; returns `None` when no user has this email.
    pub async fn update_user(
        &self,
        email: &str,
        payload: UpdateUserRequest,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut update = UpdateBuilder::new("users");
        update
            .set_some("name", payload.name)
            .set_some("role", payload.role)
            .set_field("country", payload.country)
            .set_field("picture", payload.picture)
            .set_field("preferred_color", payload.preferred_color)
            .set_field("preferred_language", payload.preferred_language)
            .set("updated_at", now());

        if update.execute("email", email, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_user_by_email(email).await
    }

    /// Inserts the admin account on first start; no-op if the email exists.
    pub async fn seed_admin(&self, email: &str, name: &str) -> Result<bool, sqlx::Error> {
        let now = now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(new_id())
        .bind(email)
        .bind(name)
        .bind(UserRole::Admin)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
