//! Biblioteca: library catalog API
//!
//! REST JSON API for books, authors, categories and per-user collections.
//! Collections are listed per owner and may only be changed by their owner.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire services on top of `store`
    pub fn new<S: repository::DataStore>(config: AppConfig, store: Arc<S>) -> Self {
        let services = services::Services::new(store, config.auth.clone());
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
