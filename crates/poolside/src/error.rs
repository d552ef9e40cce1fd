//! CLI error type with exit codes and miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use poolside_core::CoreError;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("no configuration found (looked at {path})")]
    #[diagnostic(help("run `poolside config set-credentials` or set POOLSIDE_USERNAME / POOLSIDE_PASSWORD"))]
    NoConfig { path: String },

    #[error("no credentials configured for profile '{profile}'")]
    #[diagnostic(help("run `poolside config set-credentials {profile} --username <email>`"))]
    NoCredentials { profile: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("authentication failed: {message}")]
    #[diagnostic(help("check the account email and password; Fluidra locks accounts after repeated failures"))]
    Auth { message: String },

    #[error("device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("command rejected: {message}")]
    Rejected { message: String },

    #[error(transparent)]
    Core(CoreError),

    #[error(transparent)]
    Config(#[from] poolside_config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code, sysexits-flavoured.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::Rejected { .. } => 2,
            Self::NoConfig { .. } | Self::NoCredentials { .. } | Self::Config(_) => 78,
            Self::Auth { .. } => 77,
            Self::DeviceNotFound { .. } => 66,
            Self::Core(_) | Self::Io(_) => 1,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => Self::Auth { message },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "command".into(),
                reason: message,
            },
            CoreError::Rejected { message } => Self::Rejected { message },
            CoreError::DeviceNotFound { identifier } => Self::DeviceNotFound { identifier },
            other => Self::Core(other),
        }
    }
}
