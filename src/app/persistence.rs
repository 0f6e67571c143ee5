//! Store access shared by the resolver and the creator.

use tracing::{error, info};

use crate::domain::{DomainError, DomainErrorKind, Logo, LogoStore};

/// Look up a logo, classifying storage failures.
pub(crate) async fn find_logo(
    store: &dyn LogoStore,
    identifier: &str,
) -> Result<Option<Logo>, DomainError> {
    store.get(identifier).await.map_err(|e| {
        error!(identifier = %identifier, error = %e, "Logo lookup failed");
        DomainError::from(e)
    })
}

/// Persist a new logo.
///
/// A uniqueness conflict means a concurrent request created the same identifier first;
/// that record is read back and returned instead of the one we tried to insert.
pub(crate) async fn save_or_load_existing(
    store: &dyn LogoStore,
    logo: Logo,
) -> Result<Logo, DomainError> {
    match store.save(&logo).await {
        Ok(saved) => Ok(saved),
        Err(e) if e.is_duplicate() => {
            info!(
                identifier = %logo.external_identifier,
                "Logo created concurrently, returning existing record"
            );
            find_logo(store, &logo.external_identifier)
                .await?
                .ok_or_else(|| {
                    error!(
                        identifier = %logo.external_identifier,
                        "Uniqueness conflict reported but no logo found on re-read"
                    );
                    DomainError::with_detail(
                        DomainErrorKind::ExternalServiceError,
                        format!(
                            "Logo '{}' conflicted on save but could not be read back",
                            logo.external_identifier
                        ),
                    )
                    .with_source(e)
                })
        }
        Err(e) => {
            error!(identifier = %logo.external_identifier, error = %e, "Failed to persist logo");
            Err(DomainError::from(e))
        }
    }
}
