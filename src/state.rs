// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::db::Database;
use crate::storage::ImageStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub images: Arc<dyn ImageStore>,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ImageStore> {
    fn from_ref(state: &AppState) -> Self {
        state.images.clone()
    }
}
