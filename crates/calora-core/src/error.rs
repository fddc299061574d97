// ── Core error types ──
//
// Domain-level errors from calora-core. Consumers never see HTTP status
// codes or JSON parse failures directly -- the `From<calora_api::Error>`
// impl translates transport-layer errors into domain variants.
//
// Display strings double as the wire-visible error messages: the gateway
// renders any of these as `{"error": "<Display>"}`, so the recoverable
// variants spell out the exact text a caller observes.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    /// Login or token refresh failed. Never retried automatically; the
    /// next operation starts a fresh login attempt.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Recoverable domain results ───────────────────────────────────
    /// Zone index out of range (or no system to look in).
    #[error("Zone not found")]
    ZoneNotFound,

    /// Mode string did not parse; the vendor was never contacted.
    #[error("Invalid mode")]
    InvalidMode,

    /// The zone's circuit reports no current flow temperature.
    #[error("Flow temperature not available for this zone")]
    FlowTemperatureUnavailable,

    /// No boiler device, or no matching consumption bucket.
    #[error("No Devices found in this system.")]
    NoBoilerData,

    /// The account has no system with a pressure reading.
    #[error("No pressure found")]
    PressureUnavailable,

    /// The account has no system with zones.
    #[error("No zones found")]
    ZonesUnavailable,

    /// The account has no system at all.
    #[error("No system found")]
    NoSystem,

    /// A zone mode change was rejected in flight.
    #[error("Failed to update mode for zone {zone}: {cause}")]
    ModeUpdateFailed { zone: String, cause: String },

    /// A zone setpoint change was rejected in flight.
    #[error("Failed to set temperature for zone {zone}: {cause}")]
    SetpointUpdateFailed { zone: String, cause: String },

    // ── Hard failures (read path, propagated once) ───────────────────
    /// Vendor API or transport failure before any cache population.
    #[error("Vendor API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<calora_api::Error> for CoreError {
    fn from(err: calora_api::Error) -> Self {
        match err {
            calora_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            calora_api::Error::RefreshRefused { message } => CoreError::AuthenticationFailed {
                message: format!("token refresh refused: {message}"),
            },
            calora_api::Error::Transport(ref e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            calora_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            calora_api::Error::InvalidUrl(e) => CoreError::Internal(format!("invalid URL: {e}")),
            calora_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
