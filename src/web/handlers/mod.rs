//! API handlers.

pub mod file;

pub use file::*;

use crate::file::FileShareService;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// File sharing service.
    pub service: FileShareService,
    /// Honor `X-Forwarded-Proto` when building download URLs.
    pub trust_proxy: bool,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(service: FileShareService) -> Self {
        Self {
            service,
            trust_proxy: false,
        }
    }

    /// Set whether forwarded headers are trusted.
    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}
