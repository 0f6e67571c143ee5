//! Get-or-create for caller supplied logos.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::domain::{CreateLogoCommand, DomainError, Logo, LogoStore};

use super::persistence::{find_logo, save_or_load_existing};

/// Idempotent logo creation
pub struct LogoCreator {
    store: Arc<dyn LogoStore>,
}

impl LogoCreator {
    #[must_use]
    pub fn new(store: Arc<dyn LogoStore>) -> Self {
        Self { store }
    }

    /// Return the stored logo for the command's identifier, or persist the supplied one.
    ///
    /// When a logo already exists the supplied content and metadata are discarded.
    #[instrument(skip(self, command), fields(identifier = %command.external_identifier))]
    pub async fn create_or_get(&self, command: CreateLogoCommand) -> Result<Logo, DomainError> {
        if let Some(existing) = find_logo(self.store.as_ref(), &command.external_identifier).await?
        {
            info!("Logo already exists, ignoring supplied content");
            return Ok(existing);
        }

        let logo = Logo::from_command(command, Utc::now());
        let saved = save_or_load_existing(self.store.as_ref(), logo).await?;
        info!("Logo created");
        Ok(saved)
    }
}
