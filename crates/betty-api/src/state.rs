//! Shared application state for the API server.

use betty_core::QuestMapService;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. Holds no per-user data; every request resolves afresh.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The quest map service over the configured store.
    pub service: QuestMapService,
}

impl AppState {
    /// Create application state around a service.
    pub const fn new(service: QuestMapService) -> Self {
        Self { service }
    }
}
