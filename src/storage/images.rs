// src/storage/images.rs

use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Most images returned by a listing.
pub const MAX_LISTED_IMAGES: usize = 100;

/// Prefix of every public id, mirroring the `/uploads` mount.
const PUBLIC_ID_PREFIX: &str = "uploads/";

/// Image metadata as returned by `/api/images`.
#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    /// Public id, usable with `DELETE /api/images/{id}`.
    pub id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub bytes: u64,
    pub format: String,
    pub display_name: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// An uploaded file, already read into memory.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Where uploaded images live.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Newest first, at most `limit` entries.
    async fn list(&self, limit: usize) -> io::Result<Vec<StoredImage>>;

    async fn upload(&self, upload: ImageUpload) -> io::Result<StoredImage>;

    /// Returns false when nothing with this public id exists.
    async fn delete(&self, public_id: &str) -> io::Result<bool>;
}

/// Stores images as plain files under one directory served at `/uploads`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    /// `base_url` is the public URL of this API, e.g. `http://localhost:3001`.
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn describe(&self, file_name: &str, bytes: u64, modified: SystemTime) -> StoredImage {
        let (stem, format) = match file_name.rsplit_once('.') {
            Some((stem, ext)) => (stem, ext.to_ascii_lowercase()),
            None => (file_name, String::new()),
        };
        StoredImage {
            id: format!("{PUBLIC_ID_PREFIX}{stem}"),
            url: format!("{}/uploads/{}", self.base_url, file_name),
            created_at: DateTime::<Utc>::from(modified),
            bytes,
            format,
            display_name: stem.to_string(),
            width: None,
            height: None,
        }
    }

    /// Finds the stored file whose stem equals the public id's last segment.
    async fn locate(&self, public_id: &str) -> io::Result<Option<PathBuf>> {
        let stem = public_id.strip_prefix(PUBLIC_ID_PREFIX).unwrap_or(public_id);
        if !is_safe_name(stem) {
            return Ok(None);
        }

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(stem) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn list(&self, limit: usize) -> io::Result<Vec<StoredImage>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            images.push(self.describe(&name, metadata.len(), modified));
        }

        images.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        images.truncate(limit);
        Ok(images)
    }

    async fn upload(&self, upload: ImageUpload) -> io::Result<StoredImage> {
        tokio::fs::create_dir_all(&self.root).await?;

        let stem = sanitize_stem(&upload.file_name);
        let format = image_format(&upload.file_name, &upload.content_type);
        let file_name = format!("{}_{}.{}", stem, Utc::now().timestamp_millis(), format);
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, &upload.data).await?;
        tracing::info!("Stored image {} ({} bytes)", file_name, upload.data.len());

        Ok(self.describe(&file_name, upload.data.len() as u64, SystemTime::now()))
    }

    async fn delete(&self, public_id: &str) -> io::Result<bool> {
        match self.locate(public_id).await? {
            Some(path) => {
                tokio::fs::remove_file(&path).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// File stem safe to use on disk and in URLs; falls back to `image`.
fn sanitize_stem(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or_default();
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Extension of the upload, or the MIME subtype when the name has none.
fn image_format(file_name: &str, content_type: &str) -> String {
    let from_name = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        let subtype = content_type.split('/').nth(1).unwrap_or("bin");
        match subtype.split(['+', ';']).next().unwrap_or("bin") {
            "jpeg" => "jpg".to_string(),
            other => other.to_ascii_lowercase(),
        }
    })
}

fn is_safe_name(stem: &str) -> bool {
    !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_are_sanitized() {
        assert_eq!(sanitize_stem("my photo.png"), "my_photo");
        assert_eq!(sanitize_stem("../../etc/passwd"), "image");
        assert_eq!(sanitize_stem("cover-2024.final.jpg"), "cover-2024");
    }

    #[test]
    fn format_prefers_extension() {
        assert_eq!(image_format("a.PNG", "image/png"), "png");
        assert_eq!(image_format("blob", "image/jpeg"), "jpg");
        assert_eq!(image_format("icon", "image/svg+xml"), "svg");
    }

    #[test]
    fn public_ids_cannot_escape_the_directory() {
        assert!(!is_safe_name("../secret"));
        assert!(!is_safe_name(""));
        assert!(is_safe_name("cover_1700000000000"));
    }

    #[tokio::test]
    async fn upload_list_and_delete_round_trip() {
        let dir = std::env::temp_dir().join(format!("eduguiders-images-{}", uuid::Uuid::new_v4()));
        let store = LocalImageStore::new(&dir, "http://localhost:3001/");

        let stored = store
            .upload(ImageUpload {
                file_name: "cover.png".into(),
                content_type: "image/png".into(),
                data: vec![1, 2, 3],
            })
            .await
            .unwrap();
        assert!(stored.id.starts_with("uploads/cover_"));
        assert!(stored.url.starts_with("http://localhost:3001/uploads/cover_"));
        assert_eq!(stored.bytes, 3);
        assert_eq!(stored.format, "png");

        let listed = store.list(MAX_LISTED_IMAGES).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, stored.id);

        assert!(store.delete(&stored.id).await.unwrap());
        assert!(!store.delete(&stored.id).await.unwrap());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
