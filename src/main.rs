//! Application entry point.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::SecretString;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use logo_resolver::api::{RateLimitConfig, create_router, create_router_with_rate_limit};
use logo_resolver::app::AppState;
use logo_resolver::infra::fetcher::DEFAULT_LOGO_DEV_API_URL;
use logo_resolver::infra::fetcher::logo_dev::DEFAULT_TIMEOUT;
use logo_resolver::infra::{LogoDevClient, PostgresClient, PostgresConfig};

/// Application configuration
struct Config {
    database_url: String,
    logo_dev_token: SecretString,
    /// logo.dev API base URL (optional - uses production if not set)
    logo_dev_api_url: Option<String>,
    logo_dev_timeout: Duration,
    host: String,
    port: u16,
    enable_rate_limiting: bool,
    rate_limit_config: RateLimitConfig,
    db_max_connections: Option<u32>,
}

impl Config {
    fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let token = env::var("LOGO_DEV_TOKEN").context("LOGO_DEV_TOKEN not set")?;
        if token.trim().is_empty() {
            anyhow::bail!("LOGO_DEV_TOKEN is empty. Please provide a logo.dev publishable token.");
        }
        let logo_dev_token = SecretString::from(token);

        let logo_dev_api_url = env::var("LOGO_DEV_API_URL")
            .ok()
            .filter(|u| !u.is_empty());
        let logo_dev_timeout = env::var("LOGO_DEV_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let enable_rate_limiting = env::var("ENABLE_RATE_LIMITING")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let rate_limit_config = RateLimitConfig::from_env();

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0);

        Ok(Self {
            database_url,
            logo_dev_token,
            logo_dev_api_url,
            logo_dev_timeout,
            host,
            port,
            enable_rate_limiting,
            rate_limit_config,
            db_max_connections,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    info!("🖼️  Logo Resolver v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    info!("📦 Initializing infrastructure...");

    let mut db_config = PostgresConfig::default();
    if let Some(max) = config.db_max_connections {
        db_config.max_connections = max;
        db_config.min_connections = db_config.min_connections.min(max);
    }
    let postgres_client = PostgresClient::new(&config.database_url, db_config)
        .await
        .context("Failed to connect to PostgreSQL")?;
    postgres_client
        .run_migrations()
        .await
        .context("Failed to apply database migrations")?;
    info!("   ✓ Database connected and migrations applied");

    let logo_dev_client = LogoDevClient::new(
        config.logo_dev_token,
        config.logo_dev_api_url.as_deref(),
        config.logo_dev_timeout,
    )
    .context("Failed to create logo.dev client")?;
    info!(
        "   ✓ logo.dev client created ({}, timeout {}s)",
        config
            .logo_dev_api_url
            .as_deref()
            .unwrap_or(DEFAULT_LOGO_DEV_API_URL),
        config.logo_dev_timeout.as_secs()
    );

    let app_state = Arc::new(AppState::new(
        Arc::new(postgres_client),
        Arc::new(logo_dev_client),
    ));

    let router = if config.enable_rate_limiting {
        info!(
            "   ✓ Rate limiting enabled ({} rps, burst {})",
            config.rate_limit_config.requests_per_second, config.rate_limit_config.burst_size
        );
        create_router_with_rate_limit(app_state, config.rate_limit_config)
    } else {
        info!("   ○ Rate limiting disabled");
        create_router(app_state)
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Server starting on http://{}", addr);
    info!("📖 Swagger UI available at http://{}/swagger-ui", addr);
    info!("📄 OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
