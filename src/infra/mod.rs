//! Infrastructure layer implementations.

pub mod database;
pub mod fetcher;

pub use database::{PostgresClient, PostgresConfig};
pub use fetcher::LogoDevClient;
