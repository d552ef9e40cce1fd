// ── API-to-domain type conversions ──
//
// Bridges raw `poolside_api` response types into canonical
// `poolside_core::model` domain types. Normalizes field fallbacks
// (top-level vs nested `info` block), parses timestamps, and condenses
// the alarm list.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use poolside_api::types::{AlarmResponse, ComponentStateResponse, DeviceResponse};

use crate::model::{
    AlarmStatus, AlarmSummary, ComponentState, ConnectionInfo, ConnectionStatus, Device,
};

/// Convert an optional epoch-milliseconds timestamp to `DateTime<Utc>`.
fn epoch_ms_to_datetime(epoch_ms: Option<i64>) -> Option<DateTime<Utc>> {
    epoch_ms.and_then(DateTime::from_timestamp_millis)
}

/// Condense the device alarm list: count, worst severity, and the
/// first error's code and text.
fn summarize_alarms(alarms: &[AlarmResponse]) -> AlarmSummary {
    if alarms.is_empty() {
        return AlarmSummary::default();
    }

    let has_error = alarms
        .iter()
        .any(|a| a.alarm_type.as_deref() == Some("error"));

    let first_error = alarms
        .iter()
        .find(|a| a.alarm_type.as_deref() == Some("error"));

    AlarmSummary {
        status: if has_error {
            AlarmStatus::Error
        } else {
            AlarmStatus::Warning
        },
        count: u32::try_from(alarms.len()).unwrap_or(u32::MAX),
        error_code: first_error.and_then(|a| a.error_code.clone()),
        error_message: first_error
            .and_then(|a| a.default.as_ref())
            .and_then(|d| d.text.clone()),
    }
}

pub(crate) fn device_from_response(resp: DeviceResponse) -> Device {
    let connection = resp.connectivity.as_ref().map_or_else(
        ConnectionInfo::default,
        |c| ConnectionInfo {
            status: if c.connected {
                ConnectionStatus::Connected
            } else {
                ConnectionStatus::Disconnected
            },
            session_id: c.session_identifier.clone(),
            changed_at: epoch_ms_to_datetime(c.timestamp),
        },
    );

    let alarm = summarize_alarms(&resp.alarms);

    // Display fields live either at the top level or inside `info`,
    // depending on firmware generation.
    let name = resp
        .name
        .clone()
        .or_else(|| resp.info.as_ref().and_then(|i| i.name.clone()));
    let model = resp.info.as_ref().and_then(|i| i.family.clone());
    let firmware_version = resp
        .vr
        .clone()
        .or_else(|| resp.info.as_ref().and_then(|i| i.vr.clone()));

    // Seed the component map from the embedded descriptors; live
    // reported values are merged in by `apply_component_states`.
    let components = resp
        .components
        .into_iter()
        .map(|c| {
            (
                c.id,
                ComponentState {
                    id: c.id,
                    component_type: c.component_type,
                    status: c.status,
                    name: c.name,
                    firmware: c.version,
                    ..ComponentState::default()
                },
            )
        })
        .collect();

    Device {
        id: resp.id,
        name,
        serial_number: resp.sn,
        model,
        firmware_version,
        sku: resp.sku,
        pool_id: resp.pool_id,
        connection,
        alarm,
        components,
        updated_at: Utc::now(),
    }
}

/// Merge reported component states into the device's component map.
/// Components the device record never described still get an entry --
/// the reported value is what the entities are built from.
pub(crate) fn apply_component_states(
    components: &mut BTreeMap<u32, ComponentState>,
    raw: Vec<ComponentStateResponse>,
) {
    for c in raw {
        let entry = components.entry(c.id).or_insert_with(|| ComponentState {
            id: c.id,
            ..ComponentState::default()
        });
        entry.reported = c.reported_value;
        entry.desired = c.desired_value;
        entry.reported_at = epoch_ms_to_datetime(c.ts);
    }
}
