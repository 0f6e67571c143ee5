//! Integration tests for the logo.dev image client.
//!
//! Uses `wiremock` to stand in for logo.dev and checks that every upstream
//! outcome reaches the caller as the right domain error kind.

use std::time::Duration;

use secrecy::SecretString;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use logo_resolver::domain::{DomainErrorKind, LogoFetcher};
use logo_resolver::infra::LogoDevClient;

const TOKEN: &str = "pk_test_token";

fn client_for(server: &MockServer) -> LogoDevClient {
    LogoDevClient::new(
        SecretString::from(TOKEN),
        Some(&server.uri()),
        Duration::from_secs(2),
    )
    .expect("client should build")
}

// ============================================================================
// SUCCESSFUL FETCHES
// ============================================================================

mod success_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_image_bytes() {
        let server = MockServer::start().await;
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02];

        Mock::given(method("GET"))
            .and(path("/ticker/AAPL"))
            .and(query_param("token", TOKEN))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(jpeg.clone()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let bytes = client_for(&server).fetch("AAPL").await.unwrap();
        assert_eq!(bytes, jpeg);
    }

    #[tokio::test]
    async fn test_identifier_is_sent_as_single_path_segment() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ticker/BRK%2FB"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let bytes = client_for(&server).fetch("BRK/B").await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_body_is_external_service_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ticker/EMPTY"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch("EMPTY").await.unwrap_err();
        assert_eq!(err.kind(), DomainErrorKind::ExternalServiceError);
    }
}

// ============================================================================
// STATUS CLASSIFICATION
// ============================================================================

mod status_tests {
    use super::*;

    async fn fetch_with_status(status: u16) -> logo_resolver::domain::DomainError {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string("upstream says no"))
            .mount(&server)
            .await;

        client_for(&server).fetch("ZZZZ").await.unwrap_err()
    }

    #[tokio::test]
    async fn test_404_is_not_found() {
        let err = fetch_with_status(404).await;
        assert_eq!(err.kind(), DomainErrorKind::NotFound);
        assert_eq!(
            err.detail(),
            Some("No logo found for the requested ticker symbol")
        );
    }

    #[tokio::test]
    async fn test_401_and_403_are_access_denied() {
        assert_eq!(
            fetch_with_status(401).await.kind(),
            DomainErrorKind::AccessDenied
        );
        assert_eq!(
            fetch_with_status(403).await.kind(),
            DomainErrorKind::AccessDenied
        );
    }

    #[tokio::test]
    async fn test_429_is_rate_limited() {
        assert_eq!(
            fetch_with_status(429).await.kind(),
            DomainErrorKind::RateLimited
        );
    }

    #[tokio::test]
    async fn test_400_is_invalid_request() {
        assert_eq!(
            fetch_with_status(400).await.kind(),
            DomainErrorKind::InvalidRequest
        );
    }

    #[tokio::test]
    async fn test_gateway_errors_are_service_unavailable() {
        for status in [502, 503] {
            assert_eq!(
                fetch_with_status(status).await.kind(),
                DomainErrorKind::ServiceUnavailable,
                "status {}",
                status
            );
        }
    }

    #[tokio::test]
    async fn test_504_is_communication_error() {
        let err = fetch_with_status(504).await;
        assert_eq!(err.kind(), DomainErrorKind::CommunicationError);
        assert_eq!(err.detail(), Some("Logo service request timeout"));
    }

    #[tokio::test]
    async fn test_500_is_external_service_error() {
        assert_eq!(
            fetch_with_status(500).await.kind(),
            DomainErrorKind::ExternalServiceError
        );
    }

    #[tokio::test]
    async fn test_unlisted_client_error_is_invalid_request() {
        let err = fetch_with_status(418).await;
        assert_eq!(err.kind(), DomainErrorKind::InvalidRequest);
        assert!(err.detail().unwrap().contains("418"));
    }
}

// ============================================================================
// TRANSPORT FAILURES
// ============================================================================

mod transport_tests {
    use super::*;

    /// URI of a local port with nothing listening on it
    fn closed_port_uri() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    #[tokio::test]
    async fn test_connection_refused_is_communication_error() {
        let uri = closed_port_uri();

        let client = LogoDevClient::new(
            SecretString::from(TOKEN),
            Some(&uri),
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.fetch("AAPL").await.unwrap_err();
        assert_eq!(err.kind(), DomainErrorKind::CommunicationError);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_timeout_is_communication_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![1])
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = LogoDevClient::new(
            SecretString::from(TOKEN),
            Some(&server.uri()),
            Duration::from_millis(200),
        )
        .unwrap();

        let err = client.fetch("SLOW").await.unwrap_err();
        assert_eq!(err.kind(), DomainErrorKind::CommunicationError);
    }

    #[tokio::test]
    async fn test_error_detail_does_not_leak_token() {
        let uri = closed_port_uri();

        let client = LogoDevClient::new(
            SecretString::from(TOKEN),
            Some(&uri),
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.fetch("AAPL").await.unwrap_err();
        assert!(!err.to_string().contains(TOKEN));
    }
}
