//! Reactive data layer between `poolside-api` and consumers (CLI or
//! other host frameworks).
//!
//! This crate owns the business logic, domain model, and reactive data
//! infrastructure for the poolside workspace:
//!
//! - **[`Account`]** — Session facade managing the full lifecycle:
//!   [`connect()`](Account::connect) authenticates, takes the first
//!   snapshot, then spawns the poll loop and command processor.
//!   [`shutdown()`](Account::shutdown) cancels pending polls and
//!   in-flight retries and joins every task.
//!
//! - **[`SnapshotStore`]** — Atomic snapshot slot plus a reactive
//!   device index. Each successful poll supersedes the previous
//!   snapshot wholesale; a failed poll only flips [`Availability`],
//!   never discards cached state.
//!
//! - **[`mapper`]** — Pure snapshot-to-entity translation. Unknown
//!   fields and out-of-contract mode codes become explicit unknown
//!   states, never defaults.
//!
//! - **[`Command`]** — Typed mutation requests routed through an
//!   `mpsc` channel to the command processor. An accepted command
//!   schedules one quick poll (~5 s) so entities catch up sooner than
//!   the regular interval.
//!
//! - **Domain model** ([`model`]) — `Device`, `PollSnapshot`,
//!   [`HeatPumpMode`] (exact wire codes 0-6), and [`Setpoint`]
//!   (validated 10-40 °C in 0.5 °C steps).

pub mod account;
pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod mapper;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use account::{Account, SessionState};
// Account-metadata wire types surfaced by the ad-hoc queries.
pub use poolside_api::types::{ConsumerResponse, UserPoolResponse, UserProfileResponse};
pub use command::{Command, CommandResult};
pub use config::AccountConfig;
pub use error::CoreError;
pub use store::{Availability, SnapshotStore};
pub use stream::SnapshotStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AlarmStatus,
    AlarmSummary,
    ClimateEntity,
    ComponentState,
    ConnectionStatus,
    Device,
    Entity,
    EntityKind,
    EntitySet,
    EntityValue,
    HeatPumpMode,
    HvacAction,
    PollSnapshot,
    Setpoint,
    SetpointError,
    component,
};
