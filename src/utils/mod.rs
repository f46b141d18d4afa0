// src/utils/mod.rs

pub mod extract;
pub mod html;
pub mod patch;
pub mod query;

/// New random identifier for a stored row.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
