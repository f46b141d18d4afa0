// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use eduguiders_backend::config::Config;
use eduguiders_backend::db::Database;
use eduguiders_backend::routes;
use eduguiders_backend::state::AppState;
use eduguiders_backend::storage::LocalImageStore;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment (.env included)
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Connect to the database
    let db = match Database::connect(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            return;
        }
    };

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    if let Err(e) = db.migrate().await {
        tracing::error!("Failed to run database migrations: {}", e);
        return;
    }
    tracing::info!("Migrations applied successfully.");

    // Seed Admin User
    if let Some(email) = &config.admin_email {
        let name = config.admin_name.as_deref().unwrap_or("Administrator");
        match db.seed_admin(email, name).await {
            Ok(true) => tracing::info!("Seeded admin user {}", email),
            Ok(false) => tracing::debug!("Admin user {} already exists", email),
            Err(e) => tracing::error!("Failed to seed admin user: {}", e),
        }
    }

    let images = LocalImageStore::new(&config.upload_dir, &config.public_api_url);
    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        images: Arc::new(images),
    };

    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Listening on {} ({})", addr, config.app_env);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
    }

    db.close().await;
    tracing::info!("Database connection closed");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
