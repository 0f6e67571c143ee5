//! Application service layer.

use std::sync::Arc;
use tracing::{instrument, warn};
use validator::Validate;

use crate::domain::{
    AppError, CreateLogoCommand, CreateLogoRequest, HealthResponse, HealthStatus, Logo,
    LogoFetcher, LogoStore, ValidationError, validate_external_identifier,
};

use super::creator::LogoCreator;
use super::resolver::LogoResolver;

/// Application service: request validation in front of the logo use cases
pub struct AppService {
    store: Arc<dyn LogoStore>,
    fetcher: Arc<dyn LogoFetcher>,
    resolver: LogoResolver,
    creator: LogoCreator,
}

impl AppService {
    #[must_use]
    pub fn new(store: Arc<dyn LogoStore>, fetcher: Arc<dyn LogoFetcher>) -> Self {
        Self {
            resolver: LogoResolver::new(Arc::clone(&store), Arc::clone(&fetcher)),
            creator: LogoCreator::new(Arc::clone(&store)),
            store,
            fetcher,
        }
    }

    /// Resolve a logo by external identifier, fetching it upstream on first use.
    pub async fn resolve_logo(&self, identifier: &str) -> Result<Logo, AppError> {
        validate_external_identifier(identifier).map_err(|e| {
            warn!(identifier = ?identifier, error = %e, "Rejected external identifier");
            AppError::Validation(ValidationError::InvalidField {
                field: "external_identifier".to_string(),
                message: e
                    .message
                    .map(|message| message.into_owned())
                    .unwrap_or_else(|| e.code.into_owned()),
            })
        })?;
        Ok(self.resolver.resolve(identifier).await?)
    }

    /// Validate a creation request and store the logo unless one already exists.
    #[instrument(skip(self, request), fields(identifier = %request.external_identifier))]
    pub async fn create_logo(&self, request: CreateLogoRequest) -> Result<Logo, AppError> {
        request.validate().map_err(|e| {
            warn!(error = %e, "Validation failed");
            AppError::Validation(ValidationError::Multiple(e.to_string()))
        })?;

        let command = CreateLogoCommand::from(request);
        Ok(self.creator.create_or_get(command).await?)
    }

    /// Perform health check on all dependencies
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> HealthResponse {
        let db_health = match self.store.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = %e, "Logo store health check failed");
                HealthStatus::Unhealthy
            }
        };
        let upstream_health = match self.fetcher.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => {
                warn!(error = %e, "Logo service health check failed");
                HealthStatus::Unhealthy
            }
        };
        HealthResponse::new(db_health, upstream_health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainErrorKind;
    use crate::test_utils::{MockLogoFetcher, MockLogoStore};

    fn request(identifier: &str) -> CreateLogoRequest {
        CreateLogoRequest {
            external_identifier: identifier.to_string(),
            resource_url: format!("https://img.logo.dev/ticker/{}", identifier),
            file_content: b"logo".to_vec(),
            file_name: format!("{}.png", identifier),
            content_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_logo_rejects_invalid_request_before_storage() {
        let store = Arc::new(MockLogoStore::new());
        let service = AppService::new(Arc::clone(&store) as _, Arc::new(MockLogoFetcher::new()));

        let mut bad = request("AAPL");
        bad.content_type = "text/html".to_string();
        let err = service.create_logo(bad).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(ValidationError::Multiple(_))));
        assert_eq!(store.get_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_then_resolve_uses_stored_logo() {
        let store = Arc::new(MockLogoStore::new());
        let fetcher = Arc::new(MockLogoFetcher::new());
        let service = AppService::new(Arc::clone(&store) as _, Arc::clone(&fetcher) as _);

        let created = service.create_logo(request("AAPL")).await.unwrap();
        let resolved = service.resolve_logo("AAPL").await.unwrap();

        assert_eq!(created, resolved);
        assert_eq!(resolved.content_type, "image/png");
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_logo_rejects_blank_identifier() {
        let fetcher = Arc::new(MockLogoFetcher::new());
        let service = AppService::new(Arc::new(MockLogoStore::new()), Arc::clone(&fetcher) as _);

        let err = service.resolve_logo("  ").await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_logo_rejects_unstorable_identifiers_before_any_call() {
        let store = Arc::new(MockLogoStore::new());
        let fetcher = Arc::new(MockLogoFetcher::new());
        let service = AppService::new(Arc::clone(&store) as _, Arc::clone(&fetcher) as _);

        let too_long = "X".repeat(51);
        for identifier in ["AB\nCD", "AB\u{0}CD", too_long.as_str()] {
            match service.resolve_logo(identifier).await {
                Err(AppError::Validation(ValidationError::InvalidField { field, .. })) => {
                    assert_eq!(field, "external_identifier");
                }
                other => panic!("unexpected result for {:?}: {:?}", identifier, other),
            }
        }

        assert_eq!(store.get_calls(), 0);
        assert_eq!(fetcher.fetch_count(), 0);
        assert!(store.get_all_items().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_logo_wraps_domain_error() {
        let service = AppService::new(
            Arc::new(MockLogoStore::new()),
            Arc::new(MockLogoFetcher::failing(DomainErrorKind::RateLimited)),
        );

        match service.resolve_logo("AMZN").await {
            Err(AppError::Domain(e)) => assert_eq!(e.kind(), DomainErrorKind::RateLimited),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_health_check_reports_each_dependency() {
        let store = Arc::new(MockLogoStore::new());
        let fetcher = Arc::new(MockLogoFetcher::new());
        let service = AppService::new(Arc::clone(&store) as _, Arc::clone(&fetcher) as _);

        assert_eq!(service.health_check().await.status, HealthStatus::Healthy);

        fetcher.set_healthy(false);
        let health = service.health_check().await;
        assert_eq!(health.logo_service, HealthStatus::Unhealthy);
        assert_eq!(health.status, HealthStatus::Degraded);

        store.set_healthy(false);
        assert_eq!(service.health_check().await.status, HealthStatus::Unhealthy);
    }
}
