//! Environment-sourced configuration for the calora gateway.
//!
//! Credentials come from `VAILLANT_*` variables (matching the vendor
//! account they unlock), server settings from `CALORA_*`. Nothing is
//! read from disk -- the gateway is a daemon configured by its
//! environment, and this crate translates that environment into
//! `calora_core` runtime types.

use std::net::{IpAddr, SocketAddr};

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use calora_core::VendorCredentials;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {var}")]
    MissingVar { var: &'static str },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Full gateway configuration.
#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub credentials: VendorCredentials,
}

/// HTTP listener settings (`CALORA_HOST`, `CALORA_PORT`).
#[derive(Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}

impl ServerConfig {
    /// The socket address to bind, validating the host field.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| ConfigError::Validation {
            field: "host".into(),
            reason: format!("not an IP address: {}", self.host),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Raw credential fields as they arrive from the environment.
///
/// `user`, `password`, and `country` are required; `brand` defaults to
/// the vendor's own brand.
#[derive(Debug, Deserialize)]
struct RawCredentials {
    user: Option<String>,
    password: Option<String>,
    #[serde(default = "default_brand")]
    brand: String,
    country: Option<String>,
}

fn default_brand() -> String {
    "vaillant".into()
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the full gateway config from the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let server: ServerConfig = Figment::new()
        .merge(Serialized::defaults(ServerConfig::default()))
        .merge(Env::prefixed("CALORA_"))
        .extract()?;

    let raw: RawCredentials = Figment::new()
        .merge(Env::prefixed("VAILLANT_"))
        .extract()?;

    Ok(Config {
        server,
        credentials: resolve_credentials(raw)?,
    })
}

fn resolve_credentials(raw: RawCredentials) -> Result<VendorCredentials, ConfigError> {
    let username = raw.user.ok_or(ConfigError::MissingVar {
        var: "VAILLANT_USER",
    })?;
    let password = raw.password.ok_or(ConfigError::MissingVar {
        var: "VAILLANT_PASSWORD",
    })?;
    let country = raw.country.ok_or(ConfigError::MissingVar {
        var: "VAILLANT_COUNTRY",
    })?;

    if raw.brand.is_empty() {
        return Err(ConfigError::Validation {
            field: "brand".into(),
            reason: "VAILLANT_BRAND must not be empty".into(),
        });
    }

    Ok(VendorCredentials {
        username,
        password: SecretString::from(password),
        brand: raw.brand,
        country: country.to_lowercase(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn loads_credentials_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("VAILLANT_USER", "user@example.com");
            jail.set_env("VAILLANT_PASSWORD", "hunter2");
            jail.set_env("VAILLANT_COUNTRY", "Germany");

            let config = load_config().expect("config should load");
            assert_eq!(config.credentials.username, "user@example.com");
            assert_eq!(config.credentials.brand, "vaillant");
            // Country feeds a realm name, which is lowercase.
            assert_eq!(config.credentials.country, "germany");
            assert_eq!(config.server.port, 5000);
            Ok(())
        });
    }

    #[test]
    fn missing_user_is_reported_by_variable_name() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("VAILLANT_PASSWORD", "hunter2");
            jail.set_env("VAILLANT_COUNTRY", "germany");

            let err = load_config().expect_err("config should fail");
            assert!(err.to_string().contains("VAILLANT_USER"));
            Ok(())
        });
    }

    #[test]
    fn server_overrides_apply() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("VAILLANT_USER", "u");
            jail.set_env("VAILLANT_PASSWORD", "p");
            jail.set_env("VAILLANT_COUNTRY", "austria");
            jail.set_env("CALORA_HOST", "0.0.0.0");
            jail.set_env("CALORA_PORT", "8080");

            let config = load_config().expect("config should load");
            let addr = config.server.bind_addr().expect("addr should parse");
            assert_eq!(addr.to_string(), "0.0.0.0:8080");
            Ok(())
        });
    }

    #[test]
    fn bad_host_is_a_validation_error() {
        let server = ServerConfig {
            host: "not-an-ip".into(),
            port: 5000,
        };
        let err = server.bind_addr().expect_err("should reject host");
        assert!(matches!(err, ConfigError::Validation { .. }));
    }
}
