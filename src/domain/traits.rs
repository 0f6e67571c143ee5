//! Domain traits defining contracts for external systems.

use async_trait::async_trait;

use super::error::{DatabaseError, DomainError};
use super::types::Logo;

/// Persistent logo storage.
///
/// `get` distinguishes a missing logo (`Ok(None)`) from a storage failure (`Err`).
#[async_trait]
pub trait LogoStore: Send + Sync {
    /// Check storage connectivity
    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Look up a logo by its external identifier
    async fn get(&self, external_identifier: &str) -> Result<Option<Logo>, DatabaseError>;

    /// Persist a new logo and return the stored record.
    ///
    /// Fails with [`DatabaseError::Duplicate`] when the identifier is already taken.
    async fn save(&self, logo: &Logo) -> Result<Logo, DatabaseError>;
}

/// Upstream source of logo images
#[async_trait]
pub trait LogoFetcher: Send + Sync {
    /// Fetch the image bytes for an identifier.
    ///
    /// Failures are already classified into a [`DomainError`].
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, DomainError>;

    /// Check upstream reachability
    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
