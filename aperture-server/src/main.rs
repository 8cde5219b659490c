//! aperture-server: HTTP server for the photography portfolio
//!
//! Serves the public portfolio and the admin panel as static assets, plus
//! the JSON API they call:
//! - Bearer-token login/logout backed by an in-memory session store
//! - Gallery listing, multipart image upload, and deletion on the local
//!   filesystem

mod error;
mod handlers;
mod router;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use aperture_core::{AuthGate, Config, CredentialSet, DiskGallery, MemorySessionStore};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "aperture_server=debug,aperture_core=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}, using defaults", e);
        Config::default()
    });

    let credentials = CredentialSet::new(config.users.clone());
    let usernames: Vec<_> = credentials.usernames().map(str::to_string).collect();

    let auth = AuthGate::new(credentials, Arc::new(MemorySessionStore::new()));
    let gallery = DiskGallery::open(&config.server.gallery_dir, config.server.max_upload_bytes)?;
    let state = AppState::new(auth, Arc::new(gallery));

    let app = router::build_router(state, &config.server.public_dir, config.server.max_upload_bytes);

    let addr = SocketAddr::from((
        config.server.listen_addr.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));
    tracing::info!("aperture-server listening on {}", addr);
    tracing::info!("Portfolio page: http://localhost:{}/", config.server.port);
    tracing::info!("Login page:     http://localhost:{}/login.html", config.server.port);
    tracing::info!("Admin users: {}", usernames.join(", "));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
