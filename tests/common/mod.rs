// tests/common/mod.rs

#![allow(dead_code)]

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use eduguiders_backend::{
    config::Config, db::Database, routes, state::AppState, storage::LocalImageStore,
};
use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub const BOT_AGENT: &str = "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";
pub const BROWSER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const SPA_MARKER: &str = "<div id=\"root\"></div>";

pub struct TestApp {
    pub address: String,
    pub db: Database,
    pub client: reqwest::Client,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a user and returns its JSON representation.
    pub async fn create_user(&self, role: &str) -> Value {
        let email = format!("{}@example.com", unique("user"));
        let response = self
            .post_json(
                "/api/users",
                &json!({ "email": email, "name": "Test User", "role": role }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.expect("Invalid JSON");
        body["data"].clone()
    }

    pub async fn create_exercise(&self, author_email: &str, difficulty: &str) -> Value {
        let response = self
            .post_json(
                "/api/exercises",
                &json!({
                    "title": unique("exercise"),
                    "type": "multiple-choice",
                    "content": { "question": "2 + 2?", "options": ["3", "4"] },
                    "authorEmail": author_email,
                    "difficulty": difficulty,
                    "isPublished": true
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.expect("Invalid JSON");
        body["data"].clone()
    }

    pub async fn create_package(&self, max_exercises: i64) -> Value {
        let slug = unique("package");
        let response = self
            .post_json(
                "/api/exercise-packages",
                &json!({
                    "title": "Grammar basics",
                    "slug": slug,
                    "description": "Warm-up exercises",
                    "maxExercises": max_exercises,
                    "isPublished": true
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        let body: Value = response.json().await.expect("Invalid JSON");
        body["data"].clone()
    }
}

/// Short unique token for slugs, keys and emails.
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

/// Spawns the app on a random port over a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    // 1. A single long-lived connection keeps the in-memory database alive
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid database URL")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    // 2. Run migrations
    let db = Database::from_pool(pool);
    db.migrate().await.expect("Failed to migrate database");

    // 3. Static site and upload directories
    let root = std::env::temp_dir().join(unique("eduguiders-test"));
    let static_dir = root.join("public");
    let upload_dir = root.join("uploads");
    std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
    std::fs::create_dir_all(&upload_dir).expect("Failed to create upload dir");
    std::fs::write(
        static_dir.join("index.html"),
        format!("<!DOCTYPE html><html><body>{}</body></html>", SPA_MARKER),
    )
    .expect("Failed to write index.html");

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Create test configuration and state
    let mut config = Config {
        rust_log: "error".to_string(),
        static_dir,
        upload_dir: upload_dir.clone(),
        public_api_url: address.clone(),
        ..Config::default()
    };
    customize(&mut config);

    let state = AppState {
        db: db.clone(),
        images: Arc::new(LocalImageStore::new(&config.upload_dir, &config.public_api_url)),
        config,
    };
    let app = routes::create_router(state);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        db,
        client: reqwest::Client::new(),
        upload_dir,
    }
}
