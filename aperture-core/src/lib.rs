//! aperture-core: Shared library for the aperture portfolio server
//!
//! This crate provides:
//! - Opaque bearer-token sessions (in-memory, cleared on restart)
//! - Credential verification for the admin panel
//! - Gallery image storage backed by a filesystem directory
//! - Configuration loading

pub mod auth;
pub mod config;
pub mod gallery;

pub use auth::{AuthError, AuthGate, CredentialSet, MemorySessionStore, SessionStore};
pub use config::Config;
pub use gallery::{DiskGallery, GalleryError, ImageRepository};

/// Default HTTP port for aperture-server
pub const DEFAULT_PORT: u16 = 3000;
