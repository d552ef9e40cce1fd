// poolside-api: Async Rust client for the Fluidra Pool cloud API

pub mod auth;
pub mod client;
pub mod error;
pub mod rate_limit;
pub mod transport;
pub mod types;

pub use auth::{Authenticator, CognitoConfig, TokenSet};
pub use client::FluidraClient;
pub use error::Error;
pub use rate_limit::RateLimiter;
pub use transport::TransportConfig;
