// src/db/posts.rs

use crate::db::{Database, now, patch::UpdateBuilder, users::AUTHOR_COLUMNS};
use crate::models::post::{CreatePostRequest, Post, PostFilter, UpdatePostRequest};
use crate::utils::new_id;
use crate::utils::query::{PageRequest, SortField, SortOrder};

const POST_COLUMNS: &str = "p.id, p.slug, p.title, p.summary, p.content, p.cover_image, \
     p.featured, p.published, p.created_at, p.updated_at";

const POST_FILTER: &str = "(?1 IS NULL OR p.published = ?1) \
     AND (?2 IS NULL OR p.featured = ?2) \
     AND (?3 IS NULL OR p.author_email = ?3)";

fn select_posts() -> String {
    format!("SELECT {POST_COLUMNS}, {AUTHOR_COLUMNS} FROM posts p JOIN users u ON u.email = p.author_email")
}

impl Database {
    /// One page of posts plus the total count for the same filter.
    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        sort: SortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<Post>, i64), sqlx::Error> {
        let sql = format!(
            "{} WHERE {POST_FILTER} ORDER BY p.{} {}, p.id LIMIT ?4 OFFSET ?5",
            select_posts(),
            sort.column(),
            order.as_sql()
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(filter.published)
            .bind(filter.featured)
            .bind(filter.author_email.as_deref())
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(self.pool())
            .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM posts p WHERE {POST_FILTER}"))
            .bind(filter.published)
            .bind(filter.featured)
            .bind(filter.author_email.as_deref())
            .fetch_one(self.pool())
            .await?;

        Ok((posts, total))
    }

    /// All posts matching the filter, newest first. `limit` of `None` means no limit.
    pub async fn find_posts(
        &self,
        filter: &PostFilter,
        limit: Option<i64>,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let sql = format!(
            "{} WHERE {POST_FILTER} ORDER BY p.created_at DESC, p.id LIMIT ?4",
            select_posts()
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(filter.published)
            .bind(filter.featured)
            .bind(filter.author_email.as_deref())
            .bind(limit.unwrap_or(-1))
            .fetch_all(self.pool())
            .await
    }

    pub async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(&format!("{} WHERE p.slug = ?", select_posts()))
            .bind(slug)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn post_slug_exists(&self, slug: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = ?)")
            .bind(slug)
            .fetch_one(self.pool())
            .await
    }

    pub async fn create_post(&self, payload: CreatePostRequest) -> Result<Post, sqlx::Error> {
        let now = now();
        let slug = payload.slug.clone();
        sqlx::query(
            r#"
            INSERT INTO posts (id, slug, title, summary, content, cover_image, featured,
                               published, author_email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new_id())
        .bind(payload.slug)
        .bind(payload.title)
        .bind(payload.summary)
        .bind(payload.content)
        .bind(payload.cover_image)
        .bind(payload.featured.unwrap_or(false))
        .bind(payload.published.unwrap_or(true))
        .bind(payload.author_email)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.find_post_by_slug(&slug)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Returns `None` when no post has this slug.
    pub async fn update_post(
        &self,
        slug: &str,
        payload: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        let mut update = UpdateBuilder::new("posts");
        update
            .set_some("title", payload.title)
            .set_some("summary", payload.summary)
            .set_some("content", payload.content)
            .set_field("cover_image", payload.cover_image)
            .set_some("featured", payload.featured)
            .set_some("published", payload.published)
            .set("updated_at", now());

        if update.execute("slug", slug, self.pool()).await? == 0 {
            return Ok(None);
        }
        self.find_post_by_slug(slug).await
    }

    pub async fn delete_post(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE slug = ?")
            .bind(slug)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
