// ── Core error types ──
//
// User-facing errors from poolside-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures
// directly. The `From<poolside_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

use crate::model::SetpointError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Cannot reach the Fluidra cloud: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Account session is shut down")]
    SessionClosed,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Component {component_id} not found on device {device_id}")]
    ComponentNotFound { device_id: String, component_id: u32 },

    // ── Operation errors ─────────────────────────────────────────────
    /// A command failed local validation; nothing was transmitted.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// The cloud refused a command. Not retried.
    #[error("Command rejected by the cloud: {message}")]
    Rejected { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Cloud API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` when the failure should flip availability to
    /// reauthentication-required rather than plain unavailable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

impl From<SetpointError> for CoreError {
    fn from(err: SetpointError) -> Self {
        Self::ValidationFailed {
            message: err.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<poolside_api::Error> for CoreError {
    fn from(err: poolside_api::Error) -> Self {
        match err {
            poolside_api::Error::Authentication { message } => {
                Self::AuthenticationFailed { message }
            }
            poolside_api::Error::UnsupportedChallenge { challenge } => {
                Self::AuthenticationFailed {
                    message: format!("unsupported sign-in challenge: {challenge}"),
                }
            }
            poolside_api::Error::SessionExpired => Self::AuthenticationFailed {
                message: "session expired -- re-authentication required".into(),
            },
            poolside_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    Self::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    Self::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            poolside_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid URL: {e}"),
            },
            poolside_api::Error::Timeout { timeout_secs } => Self::Timeout { timeout_secs },
            poolside_api::Error::Tls(msg) => Self::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            poolside_api::Error::RateLimited { retry_after_secs } => Self::Api {
                message: format!("rate limited -- retry after {retry_after_secs}s"),
                status: Some(429),
            },
            poolside_api::Error::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            poolside_api::Error::Deserialization { message, body: _ } => {
                Self::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
