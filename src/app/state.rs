//! Application state management.

use std::sync::Arc;

use crate::domain::{LogoFetcher, LogoStore};

use super::service::AppService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AppService>,
}

impl AppState {
    /// Create a new application state
    #[must_use]
    pub fn new(store: Arc<dyn LogoStore>, fetcher: Arc<dyn LogoFetcher>) -> Self {
        Self {
            service: Arc::new(AppService::new(store, fetcher)),
        }
    }
}
