// calora-api: Async Rust client for the myVAILLANT heating cloud API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::AuthSession;
pub use client::CloudClient;
pub use error::Error;
pub use transport::TransportConfig;
