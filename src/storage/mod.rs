// src/storage/mod.rs

pub mod images;

pub use images::{ImageStore, ImageUpload, LocalImageStore, StoredImage};
