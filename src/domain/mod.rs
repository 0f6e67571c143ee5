//! Domain layer containing core business types, traits, and error definitions.

pub mod classifier;
pub mod error;
pub mod traits;
pub mod types;

pub use classifier::{TransportFailure, classify, classify_status};
pub use error::{
    AppError, BoxError, ConfigError, DatabaseError, DomainError, DomainErrorKind, ValidationError,
};
pub use traits::{LogoFetcher, LogoStore};
pub use types::{
    CreateLogoCommand, CreateLogoRequest, ErrorDetail, ErrorResponse, HealthResponse,
    HealthStatus, Logo, LogoResponse, MAX_EXTERNAL_IDENTIFIER_CHARS, MAX_LOGO_SIZE_BYTES,
    RateLimitResponse, validate_external_identifier,
};
