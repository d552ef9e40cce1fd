// ── Domain model ──

pub mod device;
pub mod entity;
pub mod heat_pump;
pub mod setpoint;
pub mod snapshot;

pub use device::{
    AlarmStatus, AlarmSummary, ComponentState, ConnectionInfo, ConnectionStatus, Device,
    component,
};
pub use entity::{ClimateEntity, Entity, EntityKind, EntitySet, EntityValue, HvacAction};
pub use heat_pump::HeatPumpMode;
pub use setpoint::{Setpoint, SetpointError};
pub use snapshot::PollSnapshot;
