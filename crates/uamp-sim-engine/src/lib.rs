//! The simulation engine: scheduler, dispatch fabric, alarms, and the
//! module lifecycle contract.

mod alarm;
mod dispatcher;
mod module;
mod simulator;

pub use alarm::AlarmHandle;
pub use module::{SimModule, SimModuleType, StatsGate};
pub use simulator::{SimContext, Simulator, EVENT_QUEUE_THRESHOLD};
