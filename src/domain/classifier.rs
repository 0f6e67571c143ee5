//! Classification of upstream transport failures into domain errors.
//!
//! Everything the logo service can do wrong, whether it answers with an error status
//! or never answers at all, is reduced to a [`DomainErrorKind`] here. Nothing in
//! this module performs I/O.

use super::error::{BoxError, DomainError, DomainErrorKind};

/// A failure observed at the transport boundary, before classification.
#[derive(Debug)]
pub enum TransportFailure {
    /// The upstream answered with a non-success HTTP status
    Status { code: u16, reason: Option<String> },
    /// No usable response: connect error, timeout, broken body stream
    Connection(BoxError),
    /// The failure was already classified further down the stack
    Classified(DomainError),
}

impl TransportFailure {
    #[must_use]
    pub fn status(code: u16, reason: Option<&str>) -> Self {
        Self::Status {
            code,
            reason: reason.map(str::to_string),
        }
    }

    #[must_use]
    pub fn connection(cause: impl Into<BoxError>) -> Self {
        Self::Connection(cause.into())
    }
}

impl From<DomainError> for TransportFailure {
    fn from(err: DomainError) -> Self {
        Self::Classified(err)
    }
}

/// Map an HTTP status code to a domain error kind.
///
/// Total over `u16`: every code from 500 up counts as a server error, and codes
/// below 400 are unexpected responses that count as communication errors.
pub fn classify_status(code: u16) -> DomainErrorKind {
    match code {
        400 => DomainErrorKind::InvalidRequest,
        401 | 403 => DomainErrorKind::AccessDenied,
        404 => DomainErrorKind::NotFound,
        429 => DomainErrorKind::RateLimited,
        500 => DomainErrorKind::ExternalServiceError,
        502 | 503 => DomainErrorKind::ServiceUnavailable,
        504 => DomainErrorKind::CommunicationError,
        400..=499 => DomainErrorKind::InvalidRequest,
        500.. => DomainErrorKind::ExternalServiceError,
        _ => DomainErrorKind::CommunicationError,
    }
}

fn status_detail(code: u16, reason: &str) -> String {
    match code {
        400 => "Invalid ticker symbol or request parameters".to_string(),
        401 => "Invalid or missing authentication token".to_string(),
        403 => "Access forbidden with current credentials".to_string(),
        404 => "No logo found for the requested ticker symbol".to_string(),
        429 => "API rate limit exceeded".to_string(),
        500 => "Logo service internal server error".to_string(),
        502 | 503 => "Logo service is temporarily unavailable".to_string(),
        504 => "Logo service request timeout".to_string(),
        400..=499 => format!("Client error (HTTP {}): {}", code, reason),
        500.. => format!("Server error (HTTP {}): {}", code, reason),
        _ => format!("Unexpected response (HTTP {}): {}", code, reason),
    }
}

/// Classify a transport failure.
///
/// Already classified errors pass through untouched, so running a failure through
/// this function twice never wraps it again.
pub fn classify(failure: TransportFailure) -> DomainError {
    match failure {
        TransportFailure::Classified(err) => err,
        TransportFailure::Status { code, reason } => {
            let reason = reason.as_deref().unwrap_or("Unknown");
            DomainError::with_detail(classify_status(code), status_detail(code, reason))
        }
        TransportFailure::Connection(cause) => DomainError::with_detail(
            DomainErrorKind::CommunicationError,
            format!(
                "Unexpected error communicating with logo service: {}",
                cause
            ),
        )
        .with_source(cause),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_explicit_status_table() {
        let table = [
            (400, DomainErrorKind::InvalidRequest),
            (401, DomainErrorKind::AccessDenied),
            (403, DomainErrorKind::AccessDenied),
            (404, DomainErrorKind::NotFound),
            (429, DomainErrorKind::RateLimited),
            (500, DomainErrorKind::ExternalServiceError),
            (502, DomainErrorKind::ServiceUnavailable),
            (503, DomainErrorKind::ServiceUnavailable),
            (504, DomainErrorKind::CommunicationError),
        ];

        for (code, kind) in table {
            assert_eq!(classify_status(code), kind, "status {}", code);
        }
    }

    #[test]
    fn test_range_fallbacks() {
        assert_eq!(classify_status(405), DomainErrorKind::InvalidRequest);
        assert_eq!(classify_status(418), DomainErrorKind::InvalidRequest);
        assert_eq!(classify_status(451), DomainErrorKind::InvalidRequest);
        assert_eq!(classify_status(501), DomainErrorKind::ExternalServiceError);
        assert_eq!(classify_status(599), DomainErrorKind::ExternalServiceError);
        assert_eq!(classify_status(600), DomainErrorKind::ExternalServiceError);
        assert_eq!(classify_status(999), DomainErrorKind::ExternalServiceError);
        assert_eq!(classify_status(u16::MAX), DomainErrorKind::ExternalServiceError);
        assert_eq!(classify_status(302), DomainErrorKind::CommunicationError);
        assert_eq!(classify_status(0), DomainErrorKind::CommunicationError);
    }

    #[test]
    fn test_every_error_status_is_in_its_family() {
        for code in 400..=599u16 {
            let kind = classify_status(code);
            let err = classify(TransportFailure::status(code, Some("Reason")));
            assert_eq!(err.kind(), kind);
            assert!(err.detail().is_some(), "status {} has no detail", code);
            if code < 500 {
                assert!(matches!(
                    kind,
                    DomainErrorKind::InvalidRequest
                        | DomainErrorKind::AccessDenied
                        | DomainErrorKind::NotFound
                        | DomainErrorKind::RateLimited
                ));
            } else {
                assert!(matches!(
                    kind,
                    DomainErrorKind::ExternalServiceError
                        | DomainErrorKind::ServiceUnavailable
                        | DomainErrorKind::CommunicationError
                ));
            }
        }
    }

    #[test]
    fn test_fallback_detail_includes_status_and_reason() {
        let err = classify(TransportFailure::status(418, Some("I'm a teapot")));
        assert_eq!(err.detail(), Some("Client error (HTTP 418): I'm a teapot"));

        let err = classify(TransportFailure::status(507, None));
        assert_eq!(err.detail(), Some("Server error (HTTP 507): Unknown"));
    }

    #[test]
    fn test_connection_failure_is_communication_error() {
        let cause = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let err = classify(TransportFailure::connection(cause));
        assert_eq!(err.kind(), DomainErrorKind::CommunicationError);
        assert!(err.detail().unwrap().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_classified_error_passes_through_unchanged() {
        let original = DomainError::with_detail(DomainErrorKind::RateLimited, "slow down");
        let once = classify(original.into());
        let twice = classify(once.into());
        assert_eq!(twice.kind(), DomainErrorKind::RateLimited);
        assert_eq!(twice.detail(), Some("slow down"));
        assert!(std::error::Error::source(&twice).is_none());
    }
}
