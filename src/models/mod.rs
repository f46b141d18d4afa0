// src/models/mod.rs

pub mod config_setting;
pub mod difficulty_box;
pub mod dynamic;
pub mod exercise;
pub mod exercise_package;
pub mod level;
pub mod page_config;
pub mod post;
pub mod teacher_profile;
pub mod testimony;
pub mod user;
