use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::notify::CheckinNotifier;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub notifier: Arc<dyn CheckinNotifier>,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig, notifier: Arc<dyn CheckinNotifier>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
            notifier,
        }
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        lock_db(&self.db)
    }
}

pub fn lock_db(db: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, AppError> {
    db.lock()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("database mutex poisoned")))
}
