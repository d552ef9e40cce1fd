//! Wire types for the Fluidra Pool cloud API.
//!
//! The cloud contract is observed, not documented, so every type keeps a
//! `#[serde(flatten)]` catch-all for fields we do not model and treats
//! nearly everything as optional. Field names use camelCase via
//! `#[serde(rename_all = "camelCase")]`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Envelope handling ────────────────────────────────────────────────

/// The gateway is inconsistent about list envelopes: some deployments
/// return a bare JSON array, others wrap it as `{"data": [...]}`, and a
/// single-device account has been observed returning the object alone.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
    Single(T),
}

impl<T> ListEnvelope<T> {
    /// Flatten whichever shape arrived into a plain vec.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
            Self::Single(item) => vec![item],
        }
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// One pool controller — from `GET /generic/devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Serial number. Older firmware reports `sn`, newer `serialNumber`.
    #[serde(default, alias = "serialNumber")]
    pub sn: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Firmware version (`vr` on the wire).
    #[serde(default, alias = "currentFirmwareVersion")]
    pub vr: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub thing_type: Option<String>,
    #[serde(default)]
    pub first_connection: Option<Value>,
    #[serde(default)]
    pub pool_id: Option<String>,
    #[serde(default)]
    pub info: Option<DeviceInfoResponse>,
    #[serde(default)]
    pub connectivity: Option<ConnectivityResponse>,
    #[serde(default)]
    pub alarms: Vec<AlarmResponse>,
    /// Component metadata embedded in the device record. Live reported
    /// values come from the components endpoint instead.
    #[serde(default)]
    pub components: Vec<EmbeddedComponentResponse>,
    /// Catch-all for fields not modeled above.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Component descriptor nested in the device record: type, status, and
/// firmware metadata, but no live values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedComponentResponse {
    pub id: u32,
    #[serde(rename = "type", default)]
    pub component_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Nested `info` block with display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfoResponse {
    #[serde(default)]
    pub name: Option<String>,
    /// Model family (e.g. the heat-pump product line).
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub vr: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Connectivity block: whether the controller currently holds a cloud
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityResponse {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub session_identifier: Option<String>,
    /// Epoch milliseconds of the last connectivity transition.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Alarm entry attached to a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmResponse {
    #[serde(rename = "type", default)]
    pub alarm_type: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub default: Option<AlarmTextResponse>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmTextResponse {
    #[serde(default)]
    pub text: Option<String>,
}

// ── Components ───────────────────────────────────────────────────────

/// Reported state of one component — from
/// `GET /generic/devices/{id}/components?deviceType=connected`.
///
/// `reported_value` stays opaque JSON: the scalar type depends on the
/// component (integers for mode/power, tenths-of-degree integers for
/// temperatures). The mapper in `poolside-core` interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStateResponse {
    pub id: u32,
    #[serde(default)]
    pub reported_value: Option<Value>,
    #[serde(default)]
    pub desired_value: Option<Value>,
    /// Report timestamp, epoch milliseconds.
    #[serde(default)]
    pub ts: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Body of the component write —
/// `PUT /generic/devices/{id}/components/{cid}?deviceType=connected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredValueRequest {
    pub desired_value: Value,
}

// ── Account metadata ─────────────────────────────────────────────────

/// Consumer record — from `GET /mobile/consumers/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// User profile — from `GET /generic/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Pool-access grant — from `GET /generic/users/me/pools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPoolResponse {
    #[serde(default)]
    pub pool_id: Option<String>,
    #[serde(default)]
    pub access_level: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub owner: Option<Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
