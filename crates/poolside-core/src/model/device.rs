// ── Device domain types ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known component ids on the heat-pump controller.
///
/// These are the wire contract: the cloud addresses sub-units of a
/// device by small integers.
pub mod component {
    /// Power relay: 0 = off, 1 = on.
    pub const POWER: u32 = 13;
    /// Operating mode, see [`HeatPumpMode`](super::super::HeatPumpMode).
    pub const MODE: u32 = 14;
    /// Target temperature, tenths of °C.
    pub const TARGET_TEMPERATURE: u32 = 15;
    /// Measured water temperature, tenths of °C.
    pub const WATER_TEMPERATURE: u32 = 19;
}

/// Cloud-session connectivity of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Unknown,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub status: ConnectionStatus,
    /// Cloud session identifier, when the controller holds one.
    pub session_id: Option<String>,
    /// Last connectivity transition.
    pub changed_at: Option<DateTime<Utc>>,
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self {
            status: ConnectionStatus::Unknown,
            session_id: None,
            changed_at: None,
        }
    }
}

/// Worst alarm severity currently raised on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmStatus {
    Normal,
    Warning,
    Error,
}

/// Condensed view of the device alarm list: count, worst severity, and
/// the first error's code/message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmSummary {
    pub status: AlarmStatus,
    pub count: u32,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl Default for AlarmSummary {
    fn default() -> Self {
        Self {
            status: AlarmStatus::Normal,
            count: 0,
            error_code: None,
            error_message: None,
        }
    }
}

impl AlarmSummary {
    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// One component: descriptor metadata from the device record plus the
/// reported state last observed on the components endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentState {
    pub id: u32,
    /// Sub-unit type (pump, heater, chlorinator, light) when the
    /// device record declares one.
    pub component_type: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
    pub firmware: Option<String>,
    /// Opaque reported scalar; the mapper interprets it per component.
    pub reported: Option<serde_json::Value>,
    /// Pending desired value, if a write is still settling.
    pub desired: Option<serde_json::Value>,
    pub reported_at: Option<DateTime<Utc>>,
}

/// The canonical device type: one physical pool controller.
///
/// Created on the first successful poll, updated in place on each
/// subsequent poll, and only dropped when the account session is torn
/// down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: Option<String>,
    pub serial_number: Option<String>,
    /// Model family (e.g. the heat-pump product line).
    pub model: Option<String>,
    pub firmware_version: Option<String>,
    pub sku: Option<String>,
    pub pool_id: Option<String>,
    pub connection: ConnectionInfo,
    pub alarm: AlarmSummary,
    /// Component states keyed by component id.
    pub components: BTreeMap<u32, ComponentState>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    pub fn component(&self, id: u32) -> Option<&ComponentState> {
        self.components.get(&id)
    }

    /// Reported value of a component as an integer, if it is one.
    pub fn reported_i64(&self, component_id: u32) -> Option<i64> {
        self.component(component_id)?.reported.as_ref()?.as_i64()
    }

    /// Reported value of a tenths-of-degree component, as °C.
    pub fn reported_temperature(&self, component_id: u32) -> Option<f64> {
        #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
        let to_celsius = |tenths: i64| tenths as f64 / 10.0;
        self.reported_i64(component_id).map(to_celsius)
    }

    /// Display name, falling back to the device id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
