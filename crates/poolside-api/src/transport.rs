// Shared transport configuration for building reqwest::Client instances.
//
// The Fluidra client and the Cognito authenticator share timeout and
// user-agent settings through this module, avoiding duplicated builder
// logic.

use std::time::Duration;

/// User agent sent on every request. The cloud gateway is picky about
/// unidentified clients.
pub const USER_AGENT: &str = "Fluidra/1.0";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
