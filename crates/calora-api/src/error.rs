use thiserror::Error;

/// Top-level error type for the `calora-api` crate.
///
/// Covers every failure mode at the wire: identity (login/refresh),
/// transport, vendor API rejections, and payload decoding.
/// `calora-core` maps these into domain-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, unknown realm, account locked).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Token refresh was refused (refresh token expired or revoked).
    #[error("Token refresh refused: {message}")]
    RefreshRefused { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Vendor API ──────────────────────────────────────────────────
    /// Non-success response from the vendor API.
    #[error("Vendor API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the access token is no
    /// longer accepted and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::RefreshRefused { .. } | Self::Api { status: 401, .. }
        )
    }

    /// Returns `true` if the vendor rejected the request as not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}
