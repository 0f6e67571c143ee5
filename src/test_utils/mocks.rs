//! Mock implementations for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

use crate::domain::{DatabaseError, DomainError, DomainErrorKind, Logo, LogoFetcher, LogoStore};

/// Bytes returned by [`MockLogoFetcher`] when no per-identifier logo is configured
pub const MOCK_LOGO_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub should_fail: bool,
    pub error_message: Option<String>,
}

impl MockConfig {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
        }
    }

    fn message(&self) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| "Mock error".to_string())
    }
}

/// In-memory logo store enforcing identifier uniqueness
pub struct MockLogoStore {
    storage: Arc<Mutex<HashMap<String, Logo>>>,
    config: MockConfig,
    fail_saves: bool,
    phantom_conflicts: bool,
    is_healthy: AtomicBool,
    get_calls: AtomicUsize,
    save_calls: AtomicUsize,
    /// Lookups with an index below `gated_gets` wait here until all of them arrived
    get_gate: Option<Arc<Barrier>>,
    gated_gets: usize,
}

impl MockLogoStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            storage: Arc::new(Mutex::new(HashMap::new())),
            config,
            fail_saves: false,
            phantom_conflicts: false,
            is_healthy: AtomicBool::new(true),
            get_calls: AtomicUsize::new(0),
            save_calls: AtomicUsize::new(0),
            get_gate: None,
            gated_gets: 0,
        }
    }

    /// Every operation fails with a query error
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Lookups succeed, saves fail with a query error
    #[must_use]
    pub fn failing_saves(message: impl Into<String>) -> Self {
        Self {
            fail_saves: true,
            ..Self::with_config(MockConfig::failure(message))
        }
    }

    /// Saves report a uniqueness conflict without any record becoming visible
    #[must_use]
    pub fn with_phantom_conflicts() -> Self {
        Self {
            phantom_conflicts: true,
            ..Self::new()
        }
    }

    /// Hold the first `callers` lookups until all of them have been issued,
    /// so concurrent requests all observe the same (empty) state.
    #[must_use]
    pub fn with_synchronized_lookups(callers: usize) -> Self {
        Self {
            get_gate: Some(Arc::new(Barrier::new(callers))),
            gated_gets: callers,
            ..Self::new()
        }
    }

    /// Seed a logo without counting it as a save
    pub fn insert(&self, logo: Logo) {
        self.storage
            .lock()
            .unwrap()
            .insert(logo.external_identifier.clone(), logo);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Get all stored items (for testing)
    pub fn get_all_items(&self) -> Vec<Logo> {
        self.storage.lock().unwrap().values().cloned().collect()
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    fn check_should_fail(&self) -> Result<(), DatabaseError> {
        if self.config.should_fail && !self.fail_saves {
            return Err(DatabaseError::Query(self.config.message()));
        }
        Ok(())
    }
}

impl Default for MockLogoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogoStore for MockLogoStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(DatabaseError::Connection("Unhealthy".to_string()));
        }
        self.check_should_fail()
    }

    async fn get(&self, external_identifier: &str) -> Result<Option<Logo>, DatabaseError> {
        let call = self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.get_gate {
            if call < self.gated_gets {
                gate.wait().await;
            }
        }
        self.check_should_fail()?;
        let storage = self.storage.lock().unwrap();
        Ok(storage.get(external_identifier).cloned())
    }

    async fn save(&self, logo: &Logo) -> Result<Logo, DatabaseError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.check_should_fail()?;
        if self.fail_saves {
            return Err(DatabaseError::Query(self.config.message()));
        }
        if self.phantom_conflicts {
            return Err(DatabaseError::Duplicate(logo.external_identifier.clone()));
        }
        let mut storage = self.storage.lock().unwrap();
        if storage.contains_key(&logo.external_identifier) {
            return Err(DatabaseError::Duplicate(logo.external_identifier.clone()));
        }
        storage.insert(logo.external_identifier.clone(), logo.clone());
        Ok(logo.clone())
    }
}

/// Mock logo service recording every fetch
pub struct MockLogoFetcher {
    logos: Mutex<HashMap<String, Vec<u8>>>,
    failure: Option<(DomainErrorKind, Option<String>)>,
    fetched: Arc<Mutex<Vec<String>>>,
    is_healthy: AtomicBool,
}

impl MockLogoFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            logos: Mutex::new(HashMap::new()),
            failure: None,
            fetched: Arc::new(Mutex::new(Vec::new())),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Every fetch fails with the given kind
    #[must_use]
    pub fn failing(kind: DomainErrorKind) -> Self {
        Self {
            failure: Some((kind, None)),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn failing_with_detail(kind: DomainErrorKind, detail: impl Into<String>) -> Self {
        Self {
            failure: Some((kind, Some(detail.into()))),
            ..Self::new()
        }
    }

    /// Serve specific bytes for one identifier
    #[must_use]
    pub fn with_logo(self, identifier: impl Into<String>, content: Vec<u8>) -> Self {
        self.logos.lock().unwrap().insert(identifier.into(), content);
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Identifiers passed to `fetch`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

impl Default for MockLogoFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogoFetcher for MockLogoFetcher {
    async fn fetch(&self, identifier: &str) -> Result<Vec<u8>, DomainError> {
        self.fetched.lock().unwrap().push(identifier.to_string());
        if let Some((kind, detail)) = &self.failure {
            return Err(match detail {
                Some(detail) => DomainError::with_detail(*kind, detail.clone()),
                None => DomainError::new(*kind),
            });
        }
        let logos = self.logos.lock().unwrap();
        Ok(logos
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| MOCK_LOGO_BYTES.to_vec()))
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(DomainError::new(DomainErrorKind::ServiceUnavailable));
        }
        Ok(())
    }
}
