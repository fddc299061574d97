//! Cached, authenticated query facade over the myVAILLANT cloud.
//!
//! The [`HeatingService`] is the one context object the gateway talks
//! to: it owns the vendor session (lazy login, refresh on expiry), the
//! TTL cache, and the read/write query operations.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod service;
pub mod session;

pub use cache::TtlCache;
pub use config::{ServiceConfig, VendorCredentials};
pub use error::CoreError;
pub use service::HeatingService;
pub use session::SessionManager;
