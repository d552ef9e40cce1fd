// ── Entity mapper ──
//
// Pure functions from PollSnapshot to typed entity values. No I/O, no
// state: the poll task publishes snapshots and consumers map them on
// demand. Unknown or unparseable source fields become
// `EntityValue::Unknown` -- a mode code outside the contract or a
// non-numeric temperature must never turn into a fabricated reading.

use crate::model::{
    ClimateEntity, Device, Entity, EntityKind, EntitySet, EntityValue, HeatPumpMode, HvacAction,
    PollSnapshot, component,
};

/// Map a full snapshot to the entity set exposed at the consumer
/// boundary.
pub fn map_snapshot(snapshot: &PollSnapshot) -> EntitySet {
    let mut set = EntitySet::default();
    for device in snapshot.devices.values() {
        map_device_into(device, &mut set);
    }
    set
}

/// Map a single device's entities into an existing set.
fn map_device_into(device: &Device, set: &mut EntitySet) {
    set.climate.push(climate_entity(device));

    let sensor = |suffix: &str, name: &str, value: EntityValue| Entity {
        unique_id: unique_id(&device.id, suffix),
        name: format!("{} {name}", device.display_name()),
        kind: EntityKind::Sensor,
        device_id: device.id.clone(),
        value,
    };

    set.sensors.push(sensor(
        "water_temperature",
        "Water Temperature",
        temperature_value(device, component::WATER_TEMPERATURE),
    ));
    set.sensors.push(sensor(
        "target_temperature",
        "Target Temperature",
        temperature_value(device, component::TARGET_TEMPERATURE),
    ));
    set.sensors.push(sensor(
        "firmware",
        "Firmware",
        device
            .firmware_version
            .clone()
            .map_or(EntityValue::Unknown, EntityValue::Text),
    ));
    set.sensors.push(sensor(
        "error",
        "Error",
        error_value(device),
    ));
    set.sensors.push(sensor(
        "alarm_count",
        "Alarm Count",
        EntityValue::Number(f64::from(device.alarm.count)),
    ));

    let binary = |suffix: &str, name: &str, value: EntityValue| Entity {
        unique_id: unique_id(&device.id, suffix),
        name: format!("{} {name}", device.display_name()),
        kind: EntityKind::BinarySensor,
        device_id: device.id.clone(),
        value,
    };

    set.binary_sensors.push(binary(
        "connected",
        "Connected",
        match device.connection.status {
            crate::model::ConnectionStatus::Connected => EntityValue::Bool(true),
            crate::model::ConnectionStatus::Disconnected => EntityValue::Bool(false),
            crate::model::ConnectionStatus::Unknown => EntityValue::Unknown,
        },
    ));
    set.binary_sensors.push(binary(
        "alarm_active",
        "Alarm",
        EntityValue::Bool(device.alarm.is_active()),
    ));

    set.switches.push(Entity {
        unique_id: unique_id(&device.id, "power"),
        name: format!("{} Power", device.display_name()),
        kind: EntityKind::Switch,
        device_id: device.id.clone(),
        value: power_value(device),
    });
}

/// Build the climate entity for one heat pump.
pub fn climate_entity(device: &Device) -> ClimateEntity {
    let preset = preset_value(device);
    let power = power_value(device);

    ClimateEntity {
        unique_id: unique_id(&device.id, "climate"),
        name: format!("{} Heat Pump", device.display_name()),
        device_id: device.id.clone(),
        action: hvac_action(&power, &preset),
        preset,
        target_temperature: temperature_value(device, component::TARGET_TEMPERATURE),
        water_temperature: temperature_value(device, component::WATER_TEMPERATURE),
        power,
    }
}

/// Stable unique id derived from device/component identifiers.
fn unique_id(device_id: &str, suffix: &str) -> String {
    format!("{device_id}:{suffix}")
}

// ── Field interpreters ───────────────────────────────────────────────

/// The mode component as a preset. Codes outside {0..6} are unknown,
/// never clamped.
fn preset_value(device: &Device) -> EntityValue {
    device
        .reported_i64(component::MODE)
        .and_then(HeatPumpMode::from_code)
        .map_or(EntityValue::Unknown, EntityValue::Preset)
}

/// A tenths-of-degree component as °C.
fn temperature_value(device: &Device, component_id: u32) -> EntityValue {
    device
        .reported_temperature(component_id)
        .map_or(EntityValue::Unknown, EntityValue::Number)
}

/// The power relay as a boolean. The wire reports 0/1; anything else
/// is unknown.
fn power_value(device: &Device) -> EntityValue {
    match device.reported_i64(component::POWER) {
        Some(0) => EntityValue::Bool(false),
        Some(1) => EntityValue::Bool(true),
        _ => EntityValue::Unknown,
    }
}

/// The error sensor: code when an error alarm is raised, "No Error"
/// when the alarm list is clean.
fn error_value(device: &Device) -> EntityValue {
    match &device.alarm.error_code {
        Some(code) => EntityValue::Text(code.clone()),
        None if device.alarm.is_active() => EntityValue::Text("Warning".into()),
        None => EntityValue::Text("No Error".into()),
    }
}

/// Derive what the unit is doing from power + preset.
fn hvac_action(power: &EntityValue, preset: &EntityValue) -> HvacAction {
    match power {
        EntityValue::Bool(false) => return HvacAction::Off,
        EntityValue::Bool(true) => {}
        _ => return HvacAction::Unknown,
    }

    match preset.as_preset() {
        Some(HeatPumpMode::Off) => HvacAction::Off,
        Some(HeatPumpMode::SmartHeatingCooling) => HvacAction::Auto,
        Some(m) if m.is_heating() => HvacAction::Heating,
        Some(m) if m.is_cooling() => HvacAction::Cooling,
        _ => HvacAction::Unknown,
    }
}
