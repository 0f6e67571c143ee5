//! HTTP request handlers with OpenAPI documentation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;
use utoipa::OpenApi;

use crate::app::AppState;
use crate::domain::{
    AppError, CreateLogoRequest, DatabaseError, DomainErrorKind, ErrorDetail,
    ErrorResponse, HealthResponse, HealthStatus, LogoResponse, RateLimitResponse,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Logo Resolver API",
        version = "0.1.0",
        description = "Serves stored ticker logos and fetches missing ones from logo.dev",
        license(
            name = "MIT"
        )
    ),
    paths(
        create_logo_handler,
        get_logo_handler,
        health_check_handler,
        liveness_handler,
        readiness_handler,
    ),
    components(
        schemas(
            CreateLogoRequest,
            LogoResponse,
            HealthResponse,
            HealthStatus,
            ErrorResponse,
            ErrorDetail,
            RateLimitResponse,
        )
    ),
    tags(
        (name = "logos", description = "Logo storage and retrieval endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Store a logo
///
/// Validates the payload and stores the logo under its external identifier.
/// If a logo already exists for that identifier, the stored logo is returned
/// unchanged and the payload is discarded.
#[utoipa::path(
    post,
    path = "/api/v1/logos",
    tag = "logos",
    request_body = CreateLogoRequest,
    responses(
        (status = 201, description = "Logo stored (or already present)", body = LogoResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = RateLimitResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_logo_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateLogoRequest>,
) -> Result<(StatusCode, Json<LogoResponse>), AppError> {
    let logo = state.service.create_logo(payload).await?;
    Ok((StatusCode::CREATED, Json(LogoResponse::from(logo))))
}

/// Get logo image by external identifier
///
/// Serves the stored image. On first request for an identifier the image is
/// fetched from logo.dev and stored before being returned.
#[utoipa::path(
    get,
    path = "/api/v1/logos/external/{external_id}",
    tag = "logos",
    params(
        ("external_id" = String, Path, description = "External identifier, e.g. a ticker symbol")
    ),
    responses(
        (status = 200, description = "Logo image bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Upstream rejected the identifier", body = ErrorResponse),
        (status = 403, description = "Upstream access denied", body = ErrorResponse),
        (status = 404, description = "No logo exists for the identifier", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Upstream or storage failure", body = ErrorResponse),
        (status = 502, description = "Could not reach the logo service", body = ErrorResponse),
        (status = 503, description = "Logo service unavailable", body = ErrorResponse)
    )
)]
pub async fn get_logo_handler(
    State(state): State<Arc<AppState>>,
    Path(external_id): Path<String>,
) -> Result<Response, AppError> {
    let logo = state.service.resolve_logo(&external_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, logo.content_type),
            (header::CONTENT_DISPOSITION, inline_disposition(&logo.file_name)),
        ],
        logo.content,
    )
        .into_response())
}

/// `inline; filename="..."` with the name as an RFC 9110 quoted-string.
/// Control characters cannot appear in a header value and become `_`.
fn inline_disposition(file_name: &str) -> String {
    let mut quoted = String::with_capacity(file_name.len() + 2);
    for c in file_name.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_control() => quoted.push('_'),
            c => quoted.push(c),
        }
    }
    format!("inline; filename=\"{}\"", quoted)
}

/// Detailed health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status", body = HealthResponse)
    )
)]
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.service.health_check().await;
    Json(health)
}

/// Kubernetes liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Application is alive")
    )
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness check
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Application is ready to serve traffic"),
        (status = 503, description = "Application is not ready")
    )
)]
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let health = state.service.health_check().await;
    match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// HTTP status for each domain error kind
#[must_use]
pub fn status_for_kind(kind: DomainErrorKind) -> StatusCode {
    match kind {
        DomainErrorKind::NotFound => StatusCode::NOT_FOUND,
        DomainErrorKind::AccessDenied => StatusCode::FORBIDDEN,
        DomainErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        DomainErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        DomainErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        DomainErrorKind::CommunicationError => StatusCode::BAD_GATEWAY,
        DomainErrorKind::ExternalServiceError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::Domain(err) => (
                status_for_kind(err.kind()),
                err.kind().as_str(),
                err.to_string(),
            ),
            AppError::Database(db_err) => match db_err {
                DatabaseError::Connection(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "database_error",
                    self.to_string(),
                ),
                DatabaseError::Duplicate(_) => {
                    (StatusCode::CONFLICT, "duplicate", self.to_string())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    self.to_string(),
                ),
            },
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                self.to_string(),
            ),
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                self.to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                self.to_string(),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Rate limit exceeded".to_string(),
            ),
        };

        if status.is_server_error() {
            match std::error::Error::source(&self) {
                Some(cause) => error!(
                    error_type = %error_type,
                    message = %message,
                    cause = %cause,
                    "Server error"
                ),
                None => error!(error_type = %error_type, message = %message, "Server error"),
            }
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, ValidationError};
    use http_body_util::BodyExt;

    async fn error_body(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_every_kind_has_a_distinct_status() {
        let mut statuses: Vec<u16> = DomainErrorKind::ALL
            .iter()
            .map(|kind| status_for_kind(*kind).as_u16())
            .collect();
        statuses.sort_unstable();
        statuses.dedup();
        assert_eq!(statuses.len(), DomainErrorKind::ALL.len());
    }

    #[tokio::test]
    async fn test_domain_error_response_carries_kind_and_detail() {
        let err = AppError::from(DomainError::with_detail(
            DomainErrorKind::NotFound,
            "No logo found for the requested ticker symbol",
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = error_body(response).await;
        assert_eq!(body.error.r#type, "not_found");
        assert!(body.error.message.contains("No logo found"));
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request() {
        let err = AppError::Validation(ValidationError::Multiple("fileName: invalid".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.error.r#type, "validation_error");
    }

    #[test]
    fn test_inline_disposition_quotes_file_name() {
        assert_eq!(inline_disposition("AAPL.png"), "inline; filename=\"AAPL.png\"");
        assert_eq!(
            inline_disposition("A\"B.jpeg"),
            "inline; filename=\"A\\\"B.jpeg\""
        );
        assert_eq!(
            inline_disposition("a\\b.jpeg"),
            "inline; filename=\"a\\\\b.jpeg\""
        );
        assert_eq!(
            inline_disposition("AB\nCD.jpeg"),
            "inline; filename=\"AB_CD.jpeg\""
        );
        assert!(
            header::HeaderValue::try_from(inline_disposition("x\r\n\u{0}.jpeg")).is_ok()
        );
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            error_body(response).await.error.message,
            "Rate limit exceeded"
        );
    }
}
