//! Get-or-fetch: serve a stored logo, or fetch, persist and serve it on first use.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::domain::{DomainError, Logo, LogoFetcher, LogoStore};

use super::persistence::{find_logo, save_or_load_existing};

/// Read-through resolver over the logo store and the logo service
pub struct LogoResolver {
    store: Arc<dyn LogoStore>,
    fetcher: Arc<dyn LogoFetcher>,
}

impl LogoResolver {
    #[must_use]
    pub fn new(store: Arc<dyn LogoStore>, fetcher: Arc<dyn LogoFetcher>) -> Self {
        Self { store, fetcher }
    }

    /// Return the logo for `identifier`, fetching it from the logo service on a miss.
    ///
    /// A stored logo is returned without contacting the logo service. Fetch failures
    /// are returned exactly as the fetcher classified them.
    #[instrument(skip(self))]
    pub async fn resolve(&self, identifier: &str) -> Result<Logo, DomainError> {
        if let Some(logo) = find_logo(self.store.as_ref(), identifier).await? {
            info!("Returning stored logo");
            return Ok(logo);
        }

        info!("Logo not stored, fetching from logo service");
        let content = self.fetcher.fetch(identifier).await.map_err(|e| {
            warn!(kind = %e.kind(), error = %e, "Logo fetch failed");
            e
        })?;

        let logo = Logo::fetched(identifier, content, Utc::now());
        save_or_load_existing(self.store.as_ref(), logo).await
    }
}
