//! Upstream logo sources.

pub mod logo_dev;

pub use logo_dev::{DEFAULT_LOGO_DEV_API_URL, LogoDevClient};
