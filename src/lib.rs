//! Logo resolver service.
//!
//! Serves ticker logos from PostgreSQL and, on a miss, fetches the image from
//! logo.dev, stores it, and returns it. Concurrent first requests for the same
//! identifier converge on a single stored record.

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
