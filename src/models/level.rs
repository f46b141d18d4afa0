// src/models/level.rs

use serde::{Deserialize, Serialize};

/// Difficulty shared by dynamics, exercises and package difficulty boxes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum DifficultyLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "BEGINNER",
            DifficultyLevel::Intermediate => "INTERMEDIATE",
            DifficultyLevel::Advanced => "ADVANCED",
        }
    }

    /// SQL expression ranking a difficulty column from easiest to hardest.
    pub fn rank_sql(column: &str) -> String {
        format!(
            "CASE {column} WHEN 'BEGINNER' THEN 0 WHEN 'INTERMEDIATE' THEN 1 WHEN 'ADVANCED' THEN 2 ELSE 3 END"
        )
    }
}
