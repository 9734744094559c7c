//! Shared types for the uamp-sim workspace: the event model, device
//! state, simulated time, and error types every other crate builds on.

mod device;
mod error;
mod event;
mod time;

pub use device::{
    AppUsageEvent, BatteryEnergyState, BatteryPlugState, BatteryState, BatteryStatus,
    BluetoothConnectionEvent, DeviceState, DockState, HeadsetState, NetworkConnectionState,
    NetworkState, NetworkType, NotificationAction, PackageManagementEvent, PhoneState,
    ScreenOrientation, ScreenState, StorageState,
};
pub use error::{ConfigError, HandlerError, ModuleError, ScheduleError, SimError, TraceError};
pub use event::{Event, EventPayload, EventType};
pub use time::Timestamp;
