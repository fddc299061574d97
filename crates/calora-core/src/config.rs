// ── Runtime connection configuration ──
//
// These types describe *how* to reach the vendor cloud. They carry
// credential data and transport tuning, but never touch disk or the
// process environment -- the gateway binary constructs a
// `ServiceConfig` from its own configuration layer and hands it in.

use std::time::Duration;

use secrecy::SecretString;

/// Account credentials for the vendor cloud.
///
/// `brand` and `country` select the identity realm the account lives
/// in; both are required for login to resolve.
#[derive(Debug, Clone)]
pub struct VendorCredentials {
    pub username: String,
    pub password: SecretString,
    /// Brand identifier, e.g. "vaillant" (the default brand).
    pub brand: String,
    /// Lowercase country name, e.g. "germany".
    pub country: String,
}

/// Configuration for constructing a [`HeatingService`](crate::HeatingService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub credentials: VendorCredentials,
    /// Per-request timeout against the vendor.
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn new(credentials: VendorCredentials) -> Self {
        Self {
            credentials,
            timeout: Duration::from_secs(30),
        }
    }
}
