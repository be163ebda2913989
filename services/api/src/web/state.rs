//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use studyhub_core::ports::StorageService;

/// The shared application state, created once at startup and passed to all
/// handlers. The storage backend is injected here as a trait object so the
/// handlers never know which adapter is behind it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StorageService>,
    pub config: Arc<Config>,
}
