//! Bearer-token authentication for the admin panel
//!
//! Sessions are opaque random tokens held in an in-memory store:
//! - No expiry; a token stays valid until logout or process restart
//! - No identity attached; store membership is the whole authorization fact
//! - The store sits behind a trait so route handlers never depend on the
//!   concrete backing (a persistent store can be swapped in later)

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::RngCore;
use thiserror::Error;

/// Token byte length before hex encoding (32 bytes = 64 hex chars).
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Authentication token required.")]
    MissingToken,

    #[error("Invalid or expired token.")]
    InvalidToken,
}

/// Store of currently valid session tokens.
///
/// `issue` mints and registers a fresh token; `revoke` reports whether the
/// token was actually present so callers can log the difference, but logout
/// stays idempotent either way.
pub trait SessionStore: Send + Sync {
    fn issue(&self) -> String;
    fn revoke(&self, token: &str) -> bool;
    fn is_valid(&self, token: &str) -> bool;
}

/// In-memory token set. Restarting the process logs everyone out.
#[derive(Default)]
pub struct MemorySessionStore {
    tokens: Mutex<HashSet<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn issue(&self) -> String {
        let token = generate_token();
        self.tokens.lock().insert(token.clone());
        token
    }

    fn revoke(&self, token: &str) -> bool {
        self.tokens.lock().remove(token)
    }

    fn is_valid(&self, token: &str) -> bool {
        self.tokens.lock().contains(token)
    }
}

/// Generate a random session token (hex-encoded).
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Username -> plaintext password map, fixed at startup.
///
/// Development credentials only; the map comes from configuration and is
/// never written back.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    users: BTreeMap<String, String>,
}

impl CredentialSet {
    pub fn new(users: BTreeMap<String, String>) -> Self {
        Self { users }
    }

    /// Check a username/password pair. Unknown user and wrong password are
    /// indistinguishable to the caller.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|stored| stored == password)
    }

    /// Usernames in the set, for the startup banner.
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }
}

/// Gate in front of every mutating route: verifies credentials, mints and
/// revokes tokens, authorizes bearer headers.
pub struct AuthGate {
    credentials: CredentialSet,
    sessions: Arc<dyn SessionStore>,
}

impl AuthGate {
    pub fn new(credentials: CredentialSet, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            credentials,
            sessions,
        }
    }

    /// Validate a credential pair and mint a session token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if !self.credentials.verify(username, password) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.sessions.issue();
        tracing::info!("User '{}' logged in, token issued", username);
        Ok(token)
    }

    /// Revoke a token. Idempotent: revoking an already-removed token is not
    /// an error.
    pub fn logout(&self, token: &str) {
        if self.sessions.revoke(token) {
            tracing::info!("Token revoked, user logged out");
        }
    }

    /// Check a bearer token extracted from a request, if any.
    pub fn authorize(&self, token: Option<&str>) -> Result<(), AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        if !self.sessions.is_valid(token) {
            return Err(AuthError::InvalidToken);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_gate() -> AuthGate {
        let users = BTreeMap::from([
            ("admin".to_string(), "password123".to_string()),
            ("akhil".to_string(), "akhil".to_string()),
        ]);
        AuthGate::new(
            CredentialSet::new(users),
            Arc::new(MemorySessionStore::new()),
        )
    }

    #[test]
    fn login_mints_distinct_tokens() {
        let gate = dev_gate();

        let a = gate.login("admin", "password123").unwrap();
        let b = gate.login("admin", "password123").unwrap();

        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert_ne!(a, b);
        assert!(gate.authorize(Some(&a)).is_ok());
        assert!(gate.authorize(Some(&b)).is_ok());
    }

    #[test]
    fn login_rejects_bad_pairs() {
        let gate = dev_gate();

        let wrong_password = gate.login("admin", "hunter2");
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

        let unknown_user = gate.login("nobody", "password123");
        assert!(matches!(unknown_user, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn authorize_requires_an_issued_token() {
        let gate = dev_gate();

        assert!(matches!(gate.authorize(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            gate.authorize(Some("deadbeef")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn logout_revokes_and_stays_idempotent() {
        let gate = dev_gate();
        let token = gate.login("akhil", "akhil").unwrap();

        gate.logout(&token);
        assert!(matches!(
            gate.authorize(Some(&token)),
            Err(AuthError::InvalidToken)
        ));

        // Second logout with the same token is a no-op
        gate.logout(&token);
    }

    #[test]
    fn store_revoke_reports_presence() {
        let store = MemorySessionStore::new();
        let token = store.issue();

        assert!(store.is_valid(&token));
        assert!(store.revoke(&token));
        assert!(!store.revoke(&token));
        assert!(!store.is_valid(&token));
    }
}
