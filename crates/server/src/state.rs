//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Storage;
use crate::services::auth::AuthService;
use crate::services::clock::{Clock, SystemClock};
use crate::services::otp::OtpService;
use crate::services::visits::VisitService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out request-scoped
/// services over the shared storage and clock.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    storage: Storage,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create application state using the system clock.
    #[must_use]
    pub fn new(config: ServerConfig, storage: Storage) -> Self {
        Self::with_clock(config, storage, Arc::new(SystemClock))
    }

    /// Create application state with an explicit time source.
    #[must_use]
    pub fn with_clock(config: ServerConfig, storage: Storage, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                clock,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the persistence handle.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.storage().users())
    }

    #[must_use]
    pub fn otp(&self) -> OtpService<'_> {
        OtpService::new(self.storage().otps(), self.clock(), self.config().otp_ttl)
    }

    #[must_use]
    pub fn visits(&self) -> VisitService<'_> {
        VisitService::new(self.storage().visits(), self.clock())
    }
}
