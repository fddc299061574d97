// ── Session manager ──
//
// Owns the process's single vendor session. Lazily logs in on first
// use, refreshes in place on expiry, and tears down on shutdown. The
// state mutex is held across the whole check-then-act sequence, so two
// callers can never race into duplicate logins or refreshes.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use calora_api::{AuthSession, CloudClient};

use crate::config::VendorCredentials;
use crate::error::CoreError;

/// Session lifecycle: `Uninitialized → Authenticated → (expiry) →
/// Authenticated`. A failed login or refresh drops back to
/// `Uninitialized` so the next call retries from scratch. No backoff.
enum SessionState {
    Uninitialized,
    Authenticated(AuthSession),
}

/// Manages the single authenticated vendor session.
pub struct SessionManager {
    client: Arc<CloudClient>,
    credentials: VendorCredentials,
    state: Mutex<SessionState>,
}

impl SessionManager {
    pub fn new(client: Arc<CloudClient>, credentials: VendorCredentials) -> Self {
        Self {
            client,
            credentials,
            state: Mutex::new(SessionState::Uninitialized),
        }
    }

    /// Return a session whose token is valid right now.
    ///
    /// Logs in on first use, refreshes when the token expiry is at or
    /// before the current time, and is a cheap no-op otherwise. Safe to
    /// call before every vendor operation.
    pub async fn ensure_authenticated(&self) -> Result<AuthSession, CoreError> {
        let mut state = self.state.lock().await;

        match &*state {
            SessionState::Authenticated(session) if !session.is_expired() => {
                Ok(session.clone())
            }
            SessionState::Authenticated(session) => {
                info!("token expired, refreshing");
                match self.client.refresh(session).await {
                    Ok(refreshed) => {
                        debug!(expires_at = %refreshed.expires_at, "token refreshed");
                        *state = SessionState::Authenticated(refreshed.clone());
                        Ok(refreshed)
                    }
                    Err(e) => {
                        // Dead refresh token: forget the session so the
                        // next call starts a fresh login.
                        *state = SessionState::Uninitialized;
                        Err(e.into())
                    }
                }
            }
            SessionState::Uninitialized => {
                info!(username = %self.credentials.username, "initializing vendor session");
                let session = self
                    .client
                    .login(&self.credentials.username, &self.credentials.password)
                    .await?;
                debug!(expires_at = %session.expires_at, "login successful");
                *state = SessionState::Authenticated(session.clone());
                Ok(session)
            }
        }
    }

    /// Tear down the session: best-effort vendor logout, then reset.
    ///
    /// Called from the gateway's shutdown path; a failed logout is
    /// logged and swallowed since the process is exiting anyway.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;

        if let SessionState::Authenticated(ref session) = *state {
            if let Err(e) = self.client.logout(session).await {
                warn!(error = %e, "vendor logout failed (non-fatal)");
            } else {
                debug!("vendor session closed");
            }
        }

        *state = SessionState::Uninitialized;
    }
}
