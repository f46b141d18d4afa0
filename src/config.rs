// src/config.rs

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

const DEFAULT_ORIGINS: [&str; 6] = [
    "http://localhost:3000",
    "http://localhost:3002",
    "https://api.ieduguide.com",
    "https://ieduguide.com",
    "https://www.ieduguide.com",
    "https://edu-text-phi.vercel.app",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Runtime mode. Anything other than `production` echoes error detail to clients.
    pub app_env: String,
    pub rust_log: String,
    /// Built single-page application (must contain `index.html`).
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Public base URL of this API, used to build uploaded image URLs.
    pub public_api_url: String,
    /// Canonical site URL used in SSR meta tags and redirects.
    pub site_url: String,
    pub allowed_origins: Vec<String>,
    /// Also serve SSR documents to requests without a Referer.
    pub ssr_direct_links: bool,
    pub admin_email: Option<String>,
    pub admin_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://eduguiders.db?mode=rwc".to_string(),
            port: 3001,
            app_env: "development".to_string(),
            rust_log: "info".to_string(),
            static_dir: PathBuf::from("public"),
            upload_dir: PathBuf::from("uploads"),
            public_api_url: "http://localhost:3001".to_string(),
            site_url: "https://ieduguide.com".to_string(),
            allowed_origins: DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
            ssr_direct_links: false,
            admin_email: None,
            admin_name: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let app_env = env::var("APP_ENV").unwrap_or(defaults.app_env);

        let rust_log = env::var("RUST_LOG").unwrap_or(defaults.rust_log);

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let public_api_url = env::var("PUBLIC_API_URL").unwrap_or(defaults.public_api_url);

        let site_url = env::var("SITE_URL").unwrap_or(defaults.site_url);

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        let ssr_direct_links = env::var("SSR_DIRECT_LINKS")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        Self {
            database_url,
            port,
            app_env,
            rust_log,
            static_dir,
            upload_dir,
            public_api_url,
            site_url,
            allowed_origins,
            ssr_direct_links,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_name: env::var("ADMIN_NAME").ok(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}
