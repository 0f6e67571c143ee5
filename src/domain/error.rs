//! Error types shared across the application.
//!
//! `DomainError` is what the orchestration layer reports: one of a closed set of
//! [`DomainErrorKind`]s plus optional detail text. The remaining enums describe
//! failures of the surrounding infrastructure (storage, configuration, request
//! validation) and are folded into [`AppError`] at the HTTP boundary.

use std::fmt;

use thiserror::Error;

/// Boxed error used to carry a lower-level cause for diagnostics.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Transport-independent classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainErrorKind {
    /// The requested logo does not exist upstream
    NotFound,
    /// The logo service is temporarily unavailable
    ServiceUnavailable,
    /// The request was rejected because of invalid parameters
    InvalidRequest,
    /// Authentication or authorization with the logo service failed
    AccessDenied,
    /// The logo service (or our own storage) failed unexpectedly
    ExternalServiceError,
    /// Too many requests were sent to the logo service
    RateLimited,
    /// Network or protocol level failure talking to the logo service
    CommunicationError,
}

impl DomainErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::NotFound,
        Self::ServiceUnavailable,
        Self::InvalidRequest,
        Self::AccessDenied,
        Self::ExternalServiceError,
        Self::RateLimited,
        Self::CommunicationError,
    ];

    /// Stable machine-readable identifier, used as the error `type` in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InvalidRequest => "invalid_request",
            Self::AccessDenied => "access_denied",
            Self::ExternalServiceError => "external_service_error",
            Self::RateLimited => "rate_limited",
            Self::CommunicationError => "communication_error",
        }
    }

    /// Human-readable description of the kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "The requested logo was not found",
            Self::ServiceUnavailable => "The logo service is temporarily unavailable",
            Self::InvalidRequest => "The request parameters are invalid",
            Self::AccessDenied => "Access to the logo service was denied",
            Self::ExternalServiceError => "An unexpected error occurred with the logo service",
            Self::RateLimited => "Too many requests to the logo service",
            Self::CommunicationError => "Unable to communicate with the logo service",
        }
    }
}

impl fmt::Display for DomainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure reported by the orchestration layer.
///
/// The wrapped source is kept for logging only; callers branch on [`DomainError::kind`].
#[derive(Debug, Error)]
#[error("{}{}", .kind.message(), detail_suffix(.detail))]
pub struct DomainError {
    kind: DomainErrorKind,
    detail: Option<String>,
    #[source]
    source: Option<BoxError>,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {}", detail))
        .unwrap_or_default()
}

impl DomainError {
    #[must_use]
    pub fn new(kind: DomainErrorKind) -> Self {
        Self {
            kind,
            detail: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_detail(kind: DomainErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
            source: None,
        }
    }

    /// Attach the lower-level cause of this error.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> DomainErrorKind {
        self.kind
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<DomainErrorKind> for DomainError {
    fn from(kind: DomainErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Storage failures are never surfaced raw; they become `ExternalServiceError`.
impl From<DatabaseError> for DomainError {
    fn from(err: DatabaseError) -> Self {
        Self::with_detail(DomainErrorKind::ExternalServiceError, "Logo storage failure")
            .with_source(err)
    }
}

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Query error: {0}")]
    Query(String),
    /// Unique constraint on the external identifier was violated
    #[error("Duplicate entry: {0}")]
    Duplicate(String),
    #[error("Migration error: {0}")]
    Migration(String),
}

impl DatabaseError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Migrate(e) => Self::Migration(e.to_string()),
            other @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                Self::Connection(other.to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}

/// Request validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },
    #[error("{0}")]
    Multiple(String),
}

/// Configuration errors raised while wiring adapters
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Top-level application error, converted into an HTTP response by the API layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Rate limit exceeded")]
    RateLimited,
}
