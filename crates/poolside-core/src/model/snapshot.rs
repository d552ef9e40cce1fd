// ── Poll snapshot ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::Device;

/// The complete device state captured by one successful poll.
///
/// Snapshots are immutable once published: each successful poll builds
/// a fresh one and supersedes the previous wholesale. A failed poll
/// publishes nothing, so readers keep seeing the last good state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSnapshot {
    pub fetched_at: DateTime<Utc>,
    /// Devices keyed by cloud device id.
    pub devices: BTreeMap<String, Device>,
}

impl PollSnapshot {
    pub fn new(devices: BTreeMap<String, Device>) -> Self {
        Self {
            fetched_at: Utc::now(),
            devices,
        }
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    /// Look a device up by serial number (the id printed on the unit).
    pub fn device_by_serial(&self, serial: &str) -> Option<&Device> {
        self.devices
            .values()
            .find(|d| d.serial_number.as_deref() == Some(serial))
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
