// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// account routes each variant through the command processor task, which
// validates, transmits, and schedules the post-command quick poll.

use tokio::sync::oneshot;

use crate::error::CoreError;
use crate::model::{HeatPumpMode, Setpoint};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations against a pool controller.
///
/// Mode and setpoint payloads are already-validated domain types, so a
/// command that exists is legal to transmit -- the remaining runtime
/// checks are device/component existence.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Select a heat-pump preset (mode component).
    SetPresetMode {
        device_id: String,
        mode: HeatPumpMode,
    },

    /// Change the target temperature (setpoint component).
    SetTargetTemperature {
        device_id: String,
        setpoint: Setpoint,
    },

    /// Toggle the power relay.
    SetPower { device_id: String, on: bool },

    /// Force an immediate out-of-cycle poll.
    Refresh,
}

impl Command {
    /// The device this command targets, if any.
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::SetPresetMode { device_id, .. }
            | Self::SetTargetTemperature { device_id, .. }
            | Self::SetPower { device_id, .. } => Some(device_id),
            Self::Refresh => None,
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// The cloud acknowledged the write; a quick poll is scheduled to
    /// observe the new state.
    Accepted,
    /// A refresh was queued on the poll loop.
    RefreshQueued,
}
