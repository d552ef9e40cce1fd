// ── Snapshot store ──
//
// Owns the current PollSnapshot and the availability signal. The poll
// task is the only writer; consumers read atomically or subscribe via
// watch channels. A failed poll never touches the stored snapshot --
// it only flips availability.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::model::{Device, PollSnapshot};

/// Whether entity data can currently be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Availability {
    /// No successful poll yet.
    Unknown,
    Available,
    /// Last poll failed transiently; cached snapshot still served.
    Unavailable { since: DateTime<Utc> },
    /// Credentials were rejected; polling cannot recover without new
    /// credentials.
    ReauthRequired,
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Reactive storage for the account's device state.
///
/// The snapshot slot is swapped wholesale on every successful poll
/// (supersede, never merge). The device index is maintained alongside
/// with upsert-and-prune so `Device` records are updated in place and
/// lookups stay O(1).
pub struct SnapshotStore {
    current: ArcSwapOption<PollSnapshot>,
    devices: DashMap<String, Arc<Device>>,
    snapshot_tx: watch::Sender<Option<Arc<PollSnapshot>>>,
    availability_tx: watch::Sender<Availability>,
    last_success: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (availability_tx, _) = watch::channel(Availability::Unknown);
        let (last_success, _) = watch::channel(None);

        Self {
            current: ArcSwapOption::empty(),
            devices: DashMap::new(),
            snapshot_tx,
            availability_tx,
            last_success,
        }
    }

    // ── Writers (poll task only) ─────────────────────────────────────

    /// Publish a successful poll: swap the snapshot atomically, sync
    /// the device index, and mark the account available.
    pub(crate) fn publish(&self, snapshot: PollSnapshot) {
        let snapshot = Arc::new(snapshot);

        // Upsert incoming devices, then prune keys that disappeared.
        for (id, device) in &snapshot.devices {
            self.devices.insert(id.clone(), Arc::new(device.clone()));
        }
        self.devices
            .retain(|id, _| snapshot.devices.contains_key(id));

        self.current.store(Some(Arc::clone(&snapshot)));
        self.snapshot_tx.send_modify(|s| *s = Some(snapshot));
        let _ = self.last_success.send(Some(Utc::now()));
        let _ = self.availability_tx.send(Availability::Available);
    }

    /// A poll failed transiently: keep the snapshot, flip availability.
    /// The original outage timestamp is preserved across repeated
    /// failures.
    pub(crate) fn mark_unavailable(&self) {
        self.availability_tx.send_modify(|a| {
            if matches!(*a, Availability::Unknown | Availability::Available) {
                *a = Availability::Unavailable { since: Utc::now() };
            }
        });
    }

    /// Credentials were rejected. Sticky until a poll succeeds.
    pub(crate) fn mark_reauth_required(&self) {
        let _ = self.availability_tx.send(Availability::ReauthRequired);
    }

    // ── Readers ──────────────────────────────────────────────────────

    /// The current snapshot, if any poll has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<PollSnapshot>> {
        self.current.load_full()
    }

    pub fn availability(&self) -> Availability {
        *self.availability_tx.borrow()
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        *self.last_success.borrow()
    }

    pub fn device(&self, id: &str) -> Option<Arc<Device>> {
        self.devices.get(id).map(|r| Arc::clone(r.value()))
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<Arc<PollSnapshot>>> {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe_availability(&self) -> watch::Receiver<Availability> {
        self.availability_tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::{AlarmSummary, ConnectionInfo, PollSnapshot};

    fn device(id: &str) -> Device {
        Device {
            id: id.to_owned(),
            name: None,
            serial_number: None,
            model: None,
            firmware_version: None,
            sku: None,
            pool_id: None,
            connection: ConnectionInfo::default(),
            alarm: AlarmSummary::default(),
            components: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    fn snapshot(ids: &[&str]) -> PollSnapshot {
        PollSnapshot::new(
            ids.iter()
                .map(|id| ((*id).to_owned(), device(id)))
                .collect(),
        )
    }

    #[test]
    fn publish_makes_snapshot_visible_and_available() {
        let store = SnapshotStore::new();
        assert!(store.snapshot().is_none());
        assert_eq!(store.availability(), Availability::Unknown);

        store.publish(snapshot(&["LX-1"]));

        assert_eq!(store.snapshot().unwrap().device_count(), 1);
        assert!(store.availability().is_available());
        assert!(store.last_success().is_some());
    }

    #[test]
    fn failed_poll_never_clears_a_snapshot() {
        let store = SnapshotStore::new();
        store.publish(snapshot(&["LX-1"]));

        store.mark_unavailable();

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.device_count(), 1);
        assert!(matches!(
            store.availability(),
            Availability::Unavailable { .. }
        ));
    }

    #[test]
    fn repeated_failures_keep_the_original_outage_timestamp() {
        let store = SnapshotStore::new();
        store.publish(snapshot(&["LX-1"]));

        store.mark_unavailable();
        let Availability::Unavailable { since: first } = store.availability() else {
            panic!("expected unavailable");
        };

        store.mark_unavailable();
        let Availability::Unavailable { since: second } = store.availability() else {
            panic!("expected unavailable");
        };
        assert_eq!(first, second);
    }

    #[test]
    fn successful_poll_recovers_availability() {
        let store = SnapshotStore::new();
        store.publish(snapshot(&["LX-1"]));
        store.mark_unavailable();

        store.publish(snapshot(&["LX-1"]));
        assert!(store.availability().is_available());
    }

    #[test]
    fn reauth_required_is_sticky_across_transient_failures() {
        let store = SnapshotStore::new();
        store.mark_reauth_required();
        store.mark_unavailable();
        assert_eq!(store.availability(), Availability::ReauthRequired);
    }

    #[test]
    fn device_index_upserts_and_prunes() {
        let store = SnapshotStore::new();
        store.publish(snapshot(&["LX-1", "LX-2"]));
        assert_eq!(store.device_count(), 2);
        assert!(store.device("LX-2").is_some());

        store.publish(snapshot(&["LX-1"]));
        assert_eq!(store.device_count(), 1);
        assert!(store.device("LX-2").is_none());
    }

    #[test]
    fn snapshot_subscription_sees_publishes() {
        let store = SnapshotStore::new();
        let rx = store.subscribe_snapshot();
        assert!(rx.borrow().is_none());

        store.publish(snapshot(&["LX-1"]));
        assert!(rx.borrow().is_some());
    }
}
