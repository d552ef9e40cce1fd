// ── Entity types exposed at the consumer boundary ──
//
// An entity is a single observable/controllable value: sensor, binary
// sensor, switch, or the climate control. The mapper builds these from
// a PollSnapshot; unknown or unparseable source fields become
// `EntityValue::Unknown` rather than a default number, so downstream
// automation never acts on fabricated data.

use serde::{Deserialize, Serialize};

use super::heat_pump::HeatPumpMode;

/// A typed entity value, with an explicit unknown state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EntityValue {
    Unknown,
    Number(f64),
    Bool(bool),
    Text(String),
    Preset(HeatPumpMode),
}

impl EntityValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_preset(&self) -> Option<HeatPumpMode> {
        match self {
            Self::Preset(m) => Some(*m),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{}", if *b { "on" } else { "off" }),
            Self::Text(s) => write!(f, "{s}"),
            Self::Preset(m) => write!(f, "{m}"),
        }
    }
}

/// Entity class at the consumer boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sensor,
    BinarySensor,
    Switch,
}

/// A plain single-value entity (sensor, binary sensor, or switch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier derived from device/component identifiers.
    pub unique_id: String,
    pub name: String,
    pub kind: EntityKind,
    pub device_id: String,
    pub value: EntityValue,
}

/// What the heat pump is currently doing, derived from power + preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    Off,
    Heating,
    Cooling,
    /// Smart auto mode: the unit decides heating vs cooling itself.
    Auto,
    Unknown,
}

/// The climate entity: preset + setpoint + measured temperature + power
/// for one heat pump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateEntity {
    pub unique_id: String,
    pub name: String,
    pub device_id: String,
    /// Current preset ([`EntityValue::Preset`] or unknown).
    pub preset: EntityValue,
    /// Target temperature in °C (number or unknown).
    pub target_temperature: EntityValue,
    /// Measured water temperature in °C (number or unknown).
    pub water_temperature: EntityValue,
    /// Power relay state (bool or unknown).
    pub power: EntityValue,
    pub action: HvacAction,
}

/// Everything mapped from one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySet {
    pub climate: Vec<ClimateEntity>,
    pub sensors: Vec<Entity>,
    pub binary_sensors: Vec<Entity>,
    pub switches: Vec<Entity>,
}

impl EntitySet {
    pub fn len(&self) -> usize {
        self.climate.len() + self.sensors.len() + self.binary_sensors.len() + self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up any plain entity by its unique id.
    pub fn entity(&self, unique_id: &str) -> Option<&Entity> {
        self.sensors
            .iter()
            .chain(&self.binary_sensors)
            .chain(&self.switches)
            .find(|e| e.unique_id == unique_id)
    }
}
