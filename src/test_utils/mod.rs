//! Test doubles for the storage and upstream ports.

pub mod mocks;

pub use mocks::{MOCK_LOGO_BYTES, MockConfig, MockLogoFetcher, MockLogoStore};
