// src/handlers/mod.rs

pub mod config_settings;
pub mod difficulty_boxes;
pub mod dynamics;
pub mod exercise_packages;
pub mod exercises;
pub mod health;
pub mod images;
pub mod page_config;
pub mod posts;
pub mod teacher_profiles;
pub mod testimonies;
pub mod users;
