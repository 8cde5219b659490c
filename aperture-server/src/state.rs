//! Shared server state

use std::sync::Arc;

use aperture_core::{AuthGate, ImageRepository};

/// Handler state: the auth gate and the gallery repository, both behind
/// `Arc` so the router can be cloned per connection.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub gallery: Arc<dyn ImageRepository>,
}

impl AppState {
    pub fn new(auth: AuthGate, gallery: Arc<dyn ImageRepository>) -> Self {
        Self {
            auth: Arc::new(auth),
            gallery,
        }
    }
}
