//! Domain types with validation support.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Base of the public logo.dev address a fetched logo is attributed to
pub const LOGO_RESOURCE_URL_BASE: &str = "https://img.logo.dev/ticker";

/// Extension given to logos fetched from the logo service
pub const FETCHED_LOGO_EXTENSION: &str = "jpeg";

/// Content type the logo service answers with
pub const FETCHED_LOGO_CONTENT_TYPE: &str = "image/jpeg";

/// Longest external identifier the store accepts
pub const MAX_EXTERNAL_IDENTIFIER_CHARS: usize = 50;

/// Largest logo accepted from callers (10 MiB)
pub const MAX_LOGO_SIZE_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_MEDIA_TYPES: [&str; 2] = ["image", "application"];
const ALLOWED_MEDIA_SUBTYPES: [&str; 7] = [
    "jpeg",
    "jpg",
    "png",
    "gif",
    "svg+xml",
    "pdf",
    "octet-stream",
];

/// A persisted logo, keyed by its external identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    /// Unique business key (ticker symbol or caller supplied id)
    pub external_identifier: String,
    /// Informational origin of the image, never used for lookups
    pub resource_url: String,
    /// Raw image bytes
    pub content: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Logo {
    /// Build a logo from bytes returned by the logo service.
    #[must_use]
    pub fn fetched(identifier: &str, content: Vec<u8>, now: DateTime<Utc>) -> Self {
        Self {
            external_identifier: identifier.to_string(),
            resource_url: Self::resource_url_for(identifier),
            content,
            file_name: format!("{}.{}", identifier, FETCHED_LOGO_EXTENSION),
            content_type: FETCHED_LOGO_CONTENT_TYPE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a logo from caller supplied fields.
    #[must_use]
    pub fn from_command(command: CreateLogoCommand, now: DateTime<Utc>) -> Self {
        Self {
            external_identifier: command.external_identifier,
            resource_url: command.resource_url,
            content: command.content,
            file_name: command.file_name,
            content_type: command.content_type,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public logo.dev URL for an identifier.
    pub fn resource_url_for(identifier: &str) -> String {
        format!("{}/{}", LOGO_RESOURCE_URL_BASE, identifier)
    }
}

/// Input to the get-or-create use case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLogoCommand {
    pub external_identifier: String,
    pub resource_url: String,
    pub content: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Request to store a caller supplied logo
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogoRequest {
    /// Unique business key for the logo
    #[validate(custom(function = "validate_external_identifier"))]
    #[schema(example = "AAPL")]
    pub external_identifier: String,
    /// Where the image originally came from (http or https)
    #[validate(
        length(max = 2048, message = "Resource URL must not exceed 2048 characters"),
        custom(function = "validate_resource_url")
    )]
    #[schema(example = "https://img.logo.dev/ticker/AAPL")]
    pub resource_url: String,
    /// Base64 encoded image bytes (1 byte to 10 MiB decoded)
    #[serde(with = "base64_bytes")]
    #[validate(length(
        min = 1,
        max = 10485760,
        message = "File content must be between 1 byte and 10MB"
    ))]
    #[schema(value_type = String, format = Byte)]
    pub file_content: Vec<u8>,
    /// File name including a 2-4 letter extension
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "File name must be between 1 and 255 characters"
        ),
        custom(function = "validate_file_name")
    )]
    #[schema(example = "AAPL.png")]
    pub file_name: String,
    /// MIME type of the image
    #[validate(custom(function = "validate_content_type"))]
    #[schema(example = "image/png")]
    pub content_type: String,
}

impl From<CreateLogoRequest> for CreateLogoCommand {
    fn from(request: CreateLogoRequest) -> Self {
        Self {
            external_identifier: request.external_identifier,
            resource_url: request.resource_url,
            content: request.file_content,
            file_name: request.file_name,
            content_type: request.content_type,
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> validator::ValidationError {
    validator::ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Rules every external identifier must meet, whether it arrives in a request
/// body or a request path: not blank, at most 50 characters, no control characters.
pub fn validate_external_identifier(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "External identifier is required"));
    }
    if value.chars().count() > MAX_EXTERNAL_IDENTIFIER_CHARS {
        return Err(invalid(
            "length",
            "External identifier must be between 1 and 50 characters",
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(invalid(
            "control_character",
            "External identifier must not contain control characters",
        ));
    }
    Ok(())
}

fn validate_resource_url(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "Resource URL is required"));
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(invalid(
            "url",
            "Resource URL must be a valid HTTP or HTTPS URL",
        ));
    }
    Ok(())
}

fn validate_file_name(value: &str) -> Result<(), validator::ValidationError> {
    let valid = value.rsplit_once('.').is_some_and(|(stem, extension)| {
        !stem.is_empty()
            && stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
            && (2..=4).contains(&extension.len())
            && extension.chars().all(|c| c.is_ascii_alphabetic())
    });
    if !valid {
        return Err(invalid("file_name", "File name must have a valid extension"));
    }
    Ok(())
}

fn validate_content_type(value: &str) -> Result<(), validator::ValidationError> {
    let valid = value.split_once('/').is_some_and(|(media_type, subtype)| {
        ALLOWED_MEDIA_TYPES.contains(&media_type) && ALLOWED_MEDIA_SUBTYPES.contains(&subtype)
    });
    if !valid {
        return Err(invalid(
            "content_type",
            "Content type must be a valid image or application type",
        ));
    }
    Ok(())
}

/// Logo as returned by the creation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoResponse {
    #[schema(example = "AAPL")]
    pub external_identifier: String,
    #[schema(example = "https://img.logo.dev/ticker/AAPL")]
    pub resource_url: String,
    /// Base64 encoded image bytes
    #[serde(with = "base64_bytes")]
    #[schema(value_type = String, format = Byte)]
    pub file_content: Vec<u8>,
    #[schema(example = "AAPL.png")]
    pub file_name: String,
    #[schema(example = "image/png")]
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Logo> for LogoResponse {
    fn from(logo: Logo) -> Self {
        Self {
            external_identifier: logo.external_identifier,
            resource_url: logo.resource_url,
            file_content: logo.content,
            file_name: logo.file_name,
            content_type: logo.content_type,
            created_at: logo.created_at,
            updated_at: logo.updated_at,
        }
    }
}

/// Standard base64 encoding for byte fields in JSON bodies.
mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Health status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Some systems degraded but functional
    Degraded,
    /// Critical systems unavailable
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system status
    pub status: HealthStatus,
    /// Logo storage health status
    pub database: HealthStatus,
    /// Upstream logo service health status
    pub logo_service: HealthStatus,
    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
}

impl HealthResponse {
    /// The store is required to serve anything; the logo service only limits misses.
    #[must_use]
    pub fn new(database: HealthStatus, logo_service: HealthStatus) -> Self {
        let status = match (&database, &logo_service) {
            (HealthStatus::Healthy, HealthStatus::Healthy) => HealthStatus::Healthy,
            (HealthStatus::Unhealthy, _) => HealthStatus::Unhealthy,
            _ => HealthStatus::Degraded,
        };
        Self {
            status,
            database,
            logo_service,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error response structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Error type identifier
    #[schema(example = "not_found")]
    pub r#type: String,
    /// Human-readable error message
    #[schema(example = "The requested logo was not found")]
    pub message: String,
}

/// Rate limit exceeded response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateLimitResponse {
    /// Error details
    pub error: ErrorDetail,
    /// Seconds until rate limit resets
    #[schema(example = 1)]
    pub retry_after: u64,
}
