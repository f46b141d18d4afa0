// src/utils/query.rs

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

pub const MAX_PAGE_SIZE: i64 = 100;

/// Tri-state boolean query flag: absent means "no filter", otherwise
/// only the literal `true` is true.
pub fn bool_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|v| v == "true"))
}

/// Resolved `page`/`limit` pair for a listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// `page` must be >= 1 and `limit` >= 0; limits above the cap are clamped.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if limit < 0 {
            return Err(AppError::BadRequest("limit must not be negative".to_string()));
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sort key accepted by the `orderBy` parameter of post and dynamic listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SortField {
    #[default]
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "updatedAt")]
    UpdatedAt,
    #[serde(rename = "title")]
    Title,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Title => "title",
        }
    }
}

/// Splits a comma-separated query value, dropping empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// JSON array text for a comma-separated filter, ready to bind against `json_each(?)`.
pub fn json_list(raw: Option<&str>) -> Option<String> {
    let items = split_list(raw?);
    if items.is_empty() {
        return None;
    }
    serde_json::to_string(&items).ok()
}

/// Empty strings count as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Flags {
        #[serde(default, deserialize_with = "bool_flag")]
        published: Option<bool>,
    }

    fn parse(json: &str) -> Option<bool> {
        serde_json::from_str::<Flags>(json).unwrap().published
    }

    #[test]
    fn bool_flag_is_tri_state() {
        assert_eq!(parse("{}"), None);
        assert_eq!(parse(r#"{"published":"true"}"#), Some(true));
        assert_eq!(parse(r#"{"published":"false"}"#), Some(false));
        assert_eq!(parse(r#"{"published":"yes"}"#), Some(false));
    }

    #[test]
    fn page_request_defaults_and_offset() {
        let p = PageRequest::new(None, None, 10).unwrap();
        assert_eq!((p.page, p.limit, p.offset()), (1, 10, 0));

        let p = PageRequest::new(Some(3), Some(20), 10).unwrap();
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn page_request_rejects_bad_values() {
        assert!(PageRequest::new(Some(0), None, 10).is_err());
        assert!(PageRequest::new(Some(1), Some(-1), 10).is_err());
        assert_eq!(PageRequest::new(None, Some(5000), 10).unwrap().limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(None, Some(0), 10).unwrap().limit, 0);
    }

    #[test]
    fn comma_lists() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert_eq!(json_list(Some("grammar,verbs")).as_deref(), Some(r#"["grammar","verbs"]"#));
        assert_eq!(json_list(Some(" , ")), None);
        assert_eq!(json_list(None), None);
    }
}
