use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::Database;

/// Shared by every handler through axum's `State`
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}
