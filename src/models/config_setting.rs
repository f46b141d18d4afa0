// src/models/config_setting.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::patch::Field;
use crate::utils::query::bool_flag;

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_DATA_TYPE: &str = "string";

/// Represents the 'config_settings' table. `value` is always stored as
/// text; `data_type` tells clients how to interpret it.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSetting {
    pub id: String,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub category: String,
    pub data_type: String,
    pub is_public: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfigSettingRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Key and value are required"))]
    pub key: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Key and value are required"))]
    pub value: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub data_type: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkConfigSettingRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Settings array is required"), nested)]
    pub settings: Vec<CreateConfigSettingRequest>,
}

/// Any `key` in the body is ignored; keys never change after creation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigSettingRequest {
    #[validate(length(min = 1, message = "Value must not be empty"))]
    pub value: Option<String>,
    #[serde(default)]
    pub description: Field<String>,
    pub category: Option<String>,
    pub data_type: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSettingListParams {
    pub category: Option<String>,
    #[serde(default, deserialize_with = "bool_flag")]
    pub is_public: Option<bool>,
    pub data_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigSettingFilter {
    pub category: Option<String>,
    pub is_public: Option<bool>,
    pub data_type: Option<String>,
}
