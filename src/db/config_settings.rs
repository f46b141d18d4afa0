// src/db/config_settings.rs

use sqlx::SqliteExecutor;

use crate::db::{Database, now, patch::UpdateBuilder};
use crate::models::config_setting::{
    ConfigSetting, ConfigSettingFilter, CreateConfigSettingRequest, DEFAULT_CATEGORY,
    DEFAULT_DATA_TYPE, UpdateConfigSettingRequest,
};
use crate::utils::new_id;
use crate::utils::query::PageRequest;

const SETTING_COLUMNS: &str =
    "id, key, value, description, category, data_type, is_public, created_at, updated_at";

const SETTING_FILTER: &str = "(?1 IS NULL OR category = ?1) \
     AND (?2 IS NULL OR is_public = ?2) \
     AND (?3 IS NULL OR data_type = ?3)";

async fn insert_setting<'e, E>(
    executor: E,
    payload: CreateConfigSettingRequest,
) -> Result<ConfigSetting, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = now();
    sqlx::query_as::<_, ConfigSetting>(&format!(
        r#"
        INSERT INTO config_settings (id, key, value, description, category, data_type, is_public,
                                     created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {SETTING_COLUMNS}
        "#
    ))
    .bind(new_id())
    .bind(payload.key)
    .bind(payload.value)
    .bind(payload.description)
    .bind(
        payload
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
    )
    .bind(
        payload
            .data_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_TYPE.to_string()),
    )
    .bind(payload.is_public.unwrap_or(false))
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
}

impl Database {
    /// Ordered by category, then key.
    pub async fn list_config_settings(
        &self,
        filter: &ConfigSettingFilter,
        page: PageRequest,
    ) -> Result<(Vec<ConfigSetting>, i64), sqlx::Error> {
        let settings = sqlx::query_as::<_, ConfigSetting>(&format!(
            "SELECT {SETTING_COLUMNS} FROM config_settings WHERE {SETTING_FILTER} \
             ORDER BY category, key LIMIT ?4 OFFSET ?5"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.is_public)
        .bind(filter.data_type.as_deref())
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(self.pool())
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM config_settings WHERE {SETTING_FILTER}"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.is_public)
        .bind(filter.data_type.as_deref())
        .fetch_one(self.pool())
        .await?;

        Ok((settings, total))
    }

    pub async fn public_config_settings(&self) -> Result<Vec<ConfigSetting>, sqlx::Error> {
        sqlx::query_as::<_, ConfigSetting>(&format!(
            "SELECT {SETTING_COLUMNS} FROM config_settings WHERE is_public = 1 ORDER BY category, key"
        ))
        .fetch_all(self.pool())
        .await
    }

    pub async fn config_settings_in_category(
        &self,
        category: &str,
    ) -> Result<Vec<ConfigSetting>, sqlx::Error> {
        sqlx::query_as::<_, ConfigSetting>(&format!(
            "SELECT {SETTING_COLUMNS} FROM config_settings WHERE category = ? ORDER BY key"
        ))
        .bind(category)
        .fetch_all(self.pool())
        .await
    }

    pub async fn find_config_setting(&self, id: &str) -> Result<Option<ConfigSetting>, sqlx::Error> {
        sqlx::query_as::<_, ConfigSetting>(&format!(
            "SELECT {SETTING_COLUMNS} FROM config_settings WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
    }

    pub async fn find_config_setting_by_key(
        &self,
        key: &str,
    ) -> Result<Option<ConfigSetting>, sqlx::Error> {
        sqlx::query_as::<_, ConfigSetting>(&format!(
            "SELECT {SETTING_COLUMNS} FROM config_settings WHERE key = ?"
        ))
        .bind(key)
        .fetch_optional(self.pool())
        .await
    }

    pub async fn create_config_setting(
        &self,
        payload: CreateConfigSettingRequest,
    ) -> Result<ConfigSetting, sqlx::Error> {
        insert_setting(self.pool(), payload).await
    }

    /// All-or-nothing: a duplicate key anywhere in the batch rolls back every row.
    pub async fn create_config_settings_bulk(
        &self,
        payloads: Vec<CreateConfigSettingRequest>,
    ) -> Result<Vec<ConfigSetting>, sqlx::Error> {
        let mut tx = self.begin().await?;
        let mut created = Vec::with_capacity(payloads.len());
        for payload in payloads {
            created.push(insert_setting(&mut *tx, payload).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Updates the setting whose `key_column` (`id` or `key`) equals `key`.
    /// Returns `None` when nothing matched.
    pub async fn update_config_setting(
        &self,
        key_column: SettingKey,
        key: &str,
        payload: UpdateConfigSettingRequest,
    ) -> Result<Option<ConfigSetting>, sqlx::Error> {
        let mut update = UpdateBuilder::new("config_settings");
        update
            .set_some("value", payload.value)
            .set_field("description", payload.description)
            .set_some("category", payload.category)
            .set_some("data_type", payload.data_type)
            .set_some("is_public", payload.is_public)
            .set("updated_at", now());

        if update.execute(key_column.column(), key, self.pool()).await? == 0 {
            return Ok(None);
        }
        match key_column {
            SettingKey::Id => self.find_config_setting(key).await,
            SettingKey::Key => self.find_config_setting_by_key(key).await,
        }
    }

    pub async fn delete_config_setting(
        &self,
        key_column: SettingKey,
        key: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!(
            "DELETE FROM config_settings WHERE {} = ?",
            key_column.column()
        ))
        .bind(key)
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// How a route addresses a config setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Id,
    Key,
}

impl SettingKey {
    fn column(&self) -> &'static str {
        match self {
            SettingKey::Id => "id",
            SettingKey::Key => "key",
        }
    }
}
