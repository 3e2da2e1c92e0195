//! Shared application state.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// State injected into every handler.
///
/// Cloned per request; the service is shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// Fixed prefix for short URLs. When `None`, it is derived from the
    /// request's `Host` and forwarding headers.
    pub base_url: Option<String>,
}

impl AppState {
    /// Creates application state around a link repository.
    pub fn new(link_service: Arc<LinkService>, base_url: Option<String>) -> Self {
        Self {
            link_service,
            base_url,
        }
    }

    /// Convenience constructor wiring a repository into a default service.
    pub fn with_repository(repository: Arc<dyn LinkRepository>, base_url: Option<String>) -> Self {
        Self::new(Arc::new(LinkService::new(repository)), base_url)
    }
}
