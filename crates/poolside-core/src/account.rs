// ── Account session ──
//
// Full lifecycle management for one Fluidra cloud account.
// `connect()` authenticates, takes the first snapshot, then spawns the
// poll loop and the command processor. `shutdown()` cancels everything
// and joins the tasks. One Account = one session; credentials live
// here and nowhere else.
//
// All polls -- scheduled, post-command quick polls, and manual
// refreshes -- are serialized through a single task draining a single
// channel, so two polls can never interleave partial state. Snapshots
// are replaced wholesale, never merged.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use poolside_api::{Authenticator, FluidraClient, TransportConfig};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::AccountConfig;
use crate::convert;
use crate::error::CoreError;
use crate::mapper;
use crate::model::{EntitySet, PollSnapshot, component};
use crate::store::{Availability, SnapshotStore};
use crate::stream::SnapshotStream;

const COMMAND_CHANNEL_SIZE: usize = 16;
const POLL_CHANNEL_SIZE: usize = 8;

/// In-cycle retry policy for transient fetch failures.
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

// ── SessionState ─────────────────────────────────────────────────────

/// Session lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    ShutDown,
}

/// Why a poll ran. Logging only -- every poll does the same work.
#[derive(Debug, Clone, Copy)]
enum PollReason {
    Scheduled,
    Quick,
    Manual,
}

// ── Account ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<AccountInner>`. Manages authentication,
/// the poll loop, command dispatch, and the reactive snapshot store.
#[derive(Clone)]
pub struct Account {
    inner: Arc<AccountInner>,
}

struct AccountInner {
    config: AccountConfig,
    store: Arc<SnapshotStore>,
    session_state: watch::Sender<SessionState>,
    client: Mutex<Option<Arc<FluidraClient>>>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    poll_tx: mpsc::Sender<PollReason>,
    poll_rx: Mutex<Option<mpsc::Receiver<PollReason>>>,
    /// Deduplicates post-command quick polls: while one is pending,
    /// further accepted commands ride along with it.
    quick_poll_pending: AtomicBool,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Account {
    /// Create an account session from configuration. Does NOT touch the
    /// network -- call [`connect()`](Self::connect) to authenticate and
    /// start the poll loop. Tunables are clamped to their documented
    /// bounds here.
    pub fn new(config: AccountConfig) -> Self {
        let config = config.clamped();
        let (session_state, _) = watch::channel(SessionState::Idle);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (poll_tx, poll_rx) = mpsc::channel(POLL_CHANNEL_SIZE);

        Self {
            inner: Arc::new(AccountInner {
                config,
                store: Arc::new(SnapshotStore::new()),
                session_state,
                client: Mutex::new(None),
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                poll_tx,
                poll_rx: Mutex::new(Some(poll_rx)),
                quick_poll_pending: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the session configuration.
    pub fn config(&self) -> &AccountConfig {
        &self.inner.config
    }

    /// Access the underlying snapshot store.
    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.inner.store
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Connect the session: authenticate, take the first snapshot, and
    /// spawn the poll loop and command processor.
    ///
    /// Fails (and leaves the session idle) if authentication is
    /// rejected or the first poll cannot complete.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self.inner.session_state.send(SessionState::Connecting);

        let config = &self.inner.config;
        let transport = TransportConfig {
            timeout: config.timeout,
        };

        let auth = Arc::new(Authenticator::new(
            config.username.clone(),
            config.password.clone(),
            config.cognito.clone(),
            &transport,
        )?);

        if let Err(e) = auth.authenticate().await {
            let err = CoreError::from(e);
            if err.is_auth_failure() {
                self.inner.store.mark_reauth_required();
            }
            let _ = self.inner.session_state.send(SessionState::Idle);
            return Err(err);
        }
        debug!("cloud authentication successful");

        let client = match &config.base_url {
            Some(url) => FluidraClient::with_base_url(
                url.as_str(),
                Arc::clone(&auth),
                &transport,
                config.api_rate_limit,
            )?,
            None => FluidraClient::new(Arc::clone(&auth), &transport, config.api_rate_limit)?,
        };
        let client = Arc::new(client);
        *self.inner.client.lock().await = Some(Arc::clone(&client));

        // First snapshot. A session that cannot fetch anything is not
        // worth keeping alive.
        if let Err(e) = poll_once(&client, &self.inner.store).await {
            if e.is_auth_failure() {
                self.inner.store.mark_reauth_required();
            } else {
                self.inner.store.mark_unavailable();
            }
            *self.inner.client.lock().await = None;
            let _ = self.inner.session_state.send(SessionState::Idle);
            return Err(e);
        }

        // Spawn background tasks
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let account = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(command_processor_task(account, rx, cancel)));
        }

        if let Some(rx) = self.inner.poll_rx.lock().await.take() {
            let account = self.clone();
            let cancel = self.inner.cancel.clone();
            let interval = self.inner.config.update_interval;
            handles.push(tokio::spawn(poll_task(account, rx, interval, cancel)));
        }
        drop(handles);

        let _ = self.inner.session_state.send(SessionState::Connected);
        info!(
            devices = self.inner.store.device_count(),
            interval_secs = self.inner.config.update_interval.as_secs(),
            "account session connected"
        );
        Ok(())
    }

    /// Tear the session down: cancel the poll loop, the command
    /// processor, and any pending quick-poll timer, then join them.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        *self.inner.client.lock().await = None;
        let _ = self.inner.session_state.send(SessionState::ShutDown);
        debug!("account session shut down");
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a command against the cloud.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.session_state.borrow() != SessionState::Connected {
            return Err(CoreError::SessionClosed);
        }

        let (tx, rx) = oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::SessionClosed)?;

        rx.await.map_err(|_| CoreError::SessionClosed)?
    }

    /// Queue an immediate out-of-cycle poll.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.execute(Command::Refresh).await.map(|_| ())
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: connect, run closure, shut down.
    ///
    /// Optimized for CLI invocations that need a single
    /// request-response cycle rather than a long-lived session.
    pub async fn oneshot<F, Fut, T>(config: AccountConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Account) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let account = Account::new(config);
        account.connect().await?;
        let result = f(account.clone()).await;
        account.shutdown().await;
        result
    }

    // ── State observation ────────────────────────────────────────────

    /// The current snapshot, if any poll has succeeded yet.
    pub fn snapshot(&self) -> Option<Arc<PollSnapshot>> {
        self.inner.store.snapshot()
    }

    /// The mapped entity view of the current snapshot.
    pub fn entities(&self) -> EntitySet {
        self.snapshot()
            .map(|s| mapper::map_snapshot(&s))
            .unwrap_or_default()
    }

    pub fn availability(&self) -> Availability {
        self.inner.store.availability()
    }

    /// Subscribe to snapshot changes.
    pub fn snapshots(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.store.subscribe_snapshot())
    }

    pub fn subscribe_availability(&self) -> watch::Receiver<Availability> {
        self.inner.store.subscribe_availability()
    }

    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.inner.session_state.subscribe()
    }

    // ── Ad-hoc cloud queries ─────────────────────────────────────────
    //
    // These bypass the snapshot store and query the cloud directly.
    // Intended for account metadata that doesn't need reactive
    // subscriptions.

    /// Fetch the signed-in user's profile record.
    pub async fn user_profile(
        &self,
    ) -> Result<poolside_api::types::UserProfileResponse, CoreError> {
        let client = self.require_client().await?;
        Ok(client.user_profile().await?)
    }

    /// Fetch the pools the signed-in account can access.
    pub async fn user_pools(
        &self,
    ) -> Result<Vec<poolside_api::types::UserPoolResponse>, CoreError> {
        let client = self.require_client().await?;
        Ok(client.user_pools().await?)
    }

    /// Fetch the consumer record (the mobile-app profile).
    pub async fn consumer_profile(
        &self,
    ) -> Result<poolside_api::types::ConsumerResponse, CoreError> {
        let client = self.require_client().await?;
        Ok(client.consumer_profile().await?)
    }

    async fn require_client(&self) -> Result<Arc<FluidraClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .as_ref()
            .cloned()
            .ok_or(CoreError::SessionClosed)
    }

    // ── Internal: polling ────────────────────────────────────────────

    async fn poll_and_record(&self, reason: PollReason) {
        let client = { self.inner.client.lock().await.as_ref().cloned() };
        let Some(client) = client else {
            warn!("poll requested without a connected client");
            return;
        };

        debug!(?reason, "poll starting");
        match poll_once(&client, &self.inner.store).await {
            Ok(()) => {
                debug!(
                    ?reason,
                    devices = self.inner.store.device_count(),
                    "poll complete"
                );
            }
            Err(e) if e.is_auth_failure() => {
                warn!(error = %e, "poll failed: credentials rejected");
                self.inner.store.mark_reauth_required();
            }
            Err(e) => {
                warn!(error = %e, "poll failed, keeping cached snapshot");
                self.inner.store.mark_unavailable();
            }
        }
    }

    /// Schedule the post-command quick poll, deduplicated.
    fn schedule_quick_poll(&self) {
        if self.inner.quick_poll_pending.swap(true, Ordering::SeqCst) {
            debug!("quick poll already pending, skipping");
            return;
        }

        let inner = Arc::clone(&self.inner);
        let cancel = self.inner.cancel.clone();
        let delay = self.inner.config.quick_poll_delay;
        info!(delay_secs = delay.as_secs_f64(), "scheduling quick poll");

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("quick poll cancelled by shutdown");
                }
                () = tokio::time::sleep(delay) => {
                    let _ = inner.poll_tx.send(PollReason::Quick).await;
                }
            }
            inner.quick_poll_pending.store(false, Ordering::SeqCst);
        });
    }

    // ── Internal: command processing ─────────────────────────────────

    async fn process_command(&self, command: Command) -> Result<CommandResult, CoreError> {
        debug!(?command, "processing command");
        match command {
            Command::Refresh => {
                self.inner
                    .poll_tx
                    .send(PollReason::Manual)
                    .await
                    .map_err(|_| CoreError::SessionClosed)?;
                Ok(CommandResult::RefreshQueued)
            }
            Command::SetPresetMode { device_id, mode } => {
                self.send_desired_value(&device_id, component::MODE, json!(mode.code()))
                    .await?;
                info!(device = %device_id, %mode, "preset mode command accepted");
                Ok(CommandResult::Accepted)
            }
            Command::SetTargetTemperature {
                device_id,
                setpoint,
            } => {
                self.send_desired_value(
                    &device_id,
                    component::TARGET_TEMPERATURE,
                    json!(setpoint.as_tenths()),
                )
                .await?;
                info!(device = %device_id, %setpoint, "setpoint command accepted");
                Ok(CommandResult::Accepted)
            }
            Command::SetPower { device_id, on } => {
                self.send_desired_value(&device_id, component::POWER, json!(i32::from(on)))
                    .await?;
                info!(device = %device_id, on, "power command accepted");
                Ok(CommandResult::Accepted)
            }
        }
    }

    /// Validate the target against the last snapshot, transmit, and
    /// schedule the quick poll on acceptance. A cloud rejection
    /// surfaces as [`CoreError::Rejected`] and is never retried.
    async fn send_desired_value(
        &self,
        device_id: &str,
        component_id: u32,
        value: serde_json::Value,
    ) -> Result<(), CoreError> {
        let device =
            self.inner
                .store
                .device(device_id)
                .ok_or_else(|| CoreError::DeviceNotFound {
                    identifier: device_id.to_owned(),
                })?;

        if device.component(component_id).is_none() {
            return Err(CoreError::ComponentNotFound {
                device_id: device_id.to_owned(),
                component_id,
            });
        }

        let client = { self.inner.client.lock().await.as_ref().cloned() }
            .ok_or(CoreError::SessionClosed)?;

        client
            .set_desired_value(device_id, component_id, value)
            .await
            .map_err(|e| match CoreError::from(e) {
                CoreError::Api {
                    message,
                    status: Some(status),
                } if (400..500).contains(&status) => CoreError::Rejected { message },
                other => other,
            })?;

        self.schedule_quick_poll();
        Ok(())
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// The single poll loop: drains scheduled ticks and out-of-cycle
/// requests from one place so polls never overlap.
async fn poll_task(
    account: Account,
    mut rx: mpsc::Receiver<PollReason>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        let reason = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            request = rx.recv() => match request {
                Some(reason) => reason,
                None => break,
            },
            _ = ticker.tick() => PollReason::Scheduled,
        };

        account.poll_and_record(reason).await;
    }
    debug!("poll task stopped");
}

async fn command_processor_task(
    account: Account,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = account.process_command(envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
    debug!("command processor stopped");
}

// ── Poll cycle ───────────────────────────────────────────────────────

/// One full poll: device list, then per-device component state.
///
/// A component fetch failing for one device keeps that device's
/// previous component values and does not fail the cycle -- one
/// flaky device must not blank out the others.
async fn poll_once(client: &FluidraClient, store: &SnapshotStore) -> Result<(), CoreError> {
    let raw_devices = fetch_with_retries("devices", || client.list_devices()).await?;

    let previous = store.snapshot();
    let mut devices = BTreeMap::new();

    for raw in raw_devices {
        let mut device = convert::device_from_response(raw);
        let device_id = device.id.clone();

        match fetch_with_retries("components", || client.device_components(&device_id)).await {
            Ok(raw_components) => {
                convert::apply_component_states(&mut device.components, raw_components);
            }
            Err(e) => {
                warn!(device = %device_id, error = %e, "component fetch failed, keeping previous values");
                if let Some(prev) = previous.as_ref().and_then(|s| s.device(&device_id)) {
                    device.components = prev.components.clone();
                }
            }
        }

        devices.insert(device_id, device);
    }

    store.publish(PollSnapshot::new(devices));
    Ok(())
}

/// Retry transient failures within one poll cycle. Auth failures and
/// other permanent errors surface immediately.
async fn fetch_with_retries<T, F, Fut>(what: &'static str, mut fetch: F) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, poolside_api::Error>>,
{
    let mut attempt = 1;
    loop {
        match fetch().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < RETRY_ATTEMPTS => {
                warn!(what, attempt, error = %e, "fetch failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
