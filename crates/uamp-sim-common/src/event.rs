//! The event model.
//!
//! Every occurrence the simulator reasons about — a trace record, an
//! alarm firing, a module signaling another module — is represented as
//! an [`Event`]: a wire-name-carrying kind plus a payload. This is a
//! tagged union rather than a class hierarchy: matching on
//! [`EventPayload`] is the only dispatch mechanism modules ever need.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::device::{
    AppUsageEvent, BatteryEnergyState, BatteryPlugState, BatteryStatus, BluetoothConnectionEvent,
    DockState, HeadsetState, NetworkConnectionState, NetworkType, NotificationAction,
    PackageManagementEvent, PhoneState, ScreenOrientation, ScreenState, StorageState,
};
use crate::time::Timestamp;

/// The wire-level kind of an event, stable across serialization.
///
/// These strings match the trace format's `"type"` field; they are
/// also used as map keys when modules subscribe to specific kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "pseudo")]
    Pseudo,
    #[serde(rename = "app.launch")]
    AppLaunch,
    #[serde(rename = "app.activity_usage")]
    AppActivityUsage,
    #[serde(rename = "screen")]
    Screen,
    #[serde(rename = "screen_orientation")]
    ScreenOrientation,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "package")]
    Package,
    #[serde(rename = "notification")]
    Notification,
    #[serde(rename = "network")]
    Network,
    #[serde(rename = "network.type")]
    NetworkType,
    #[serde(rename = "network.status")]
    NetworkStatus,
    #[serde(rename = "battery")]
    Battery,
    #[serde(rename = "battery.level")]
    BatteryLevel,
    #[serde(rename = "battery.temperature")]
    BatteryTemperature,
    #[serde(rename = "battery.status")]
    BatteryStatus,
    #[serde(rename = "battery.plug_status")]
    BatteryPlugStatus,
    #[serde(rename = "battery.energy_state")]
    BatteryEnergyState,
    #[serde(rename = "storage")]
    Storage,
    #[serde(rename = "headset")]
    Headset,
    #[serde(rename = "dock")]
    Dock,
    #[serde(rename = "bluetooth")]
    Bluetooth,
    #[serde(rename = "system.memory_snapshot")]
    SystemMemorySnapshot,
    #[serde(rename = "preload_app")]
    PreloadApp,
    #[serde(rename = "sim")]
    Sim,
    #[serde(rename = "sim.debug")]
    SimDebug,
}

impl EventType {
    /// Every variant, in taxonomy order. Used by modules (e.g. the
    /// frequency counter) that subscribe to the whole event space
    /// rather than one specific type.
    pub const ALL: &'static [EventType] = &[
        EventType::Pseudo,
        EventType::AppLaunch,
        EventType::AppActivityUsage,
        EventType::Screen,
        EventType::ScreenOrientation,
        EventType::Phone,
        EventType::Package,
        EventType::Notification,
        EventType::Network,
        EventType::NetworkType,
        EventType::NetworkStatus,
        EventType::Battery,
        EventType::BatteryLevel,
        EventType::BatteryTemperature,
        EventType::BatteryStatus,
        EventType::BatteryPlugStatus,
        EventType::BatteryEnergyState,
        EventType::Storage,
        EventType::Headset,
        EventType::Dock,
        EventType::Bluetooth,
        EventType::SystemMemorySnapshot,
        EventType::PreloadApp,
        EventType::Sim,
        EventType::SimDebug,
    ];

    /// The wire string used in trace JSON and logging.
    pub fn wire_name(self) -> &'static str {
        match self {
            EventType::Pseudo => "pseudo",
            EventType::AppLaunch => "app.launch",
            EventType::AppActivityUsage => "app.activity_usage",
            EventType::Screen => "screen",
            EventType::ScreenOrientation => "screen_orientation",
            EventType::Phone => "phone",
            EventType::Package => "package",
            EventType::Notification => "notification",
            EventType::Network => "network",
            EventType::NetworkType => "network.type",
            EventType::NetworkStatus => "network.status",
            EventType::Battery => "battery",
            EventType::BatteryLevel => "battery.level",
            EventType::BatteryTemperature => "battery.temperature",
            EventType::BatteryStatus => "battery.status",
            EventType::BatteryPlugStatus => "battery.plug_status",
            EventType::BatteryEnergyState => "battery.energy_state",
            EventType::Storage => "storage",
            EventType::Headset => "headset",
            EventType::Dock => "dock",
            EventType::Bluetooth => "bluetooth",
            EventType::SystemMemorySnapshot => "system.memory_snapshot",
            EventType::PreloadApp => "preload_app",
            EventType::Sim => "sim",
            EventType::SimDebug => "sim.debug",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The payload carried by an [`Event`], one variant per [`EventType`].
///
/// `Pseudo` and `Sim`/`SimDebug` carry no trace data; they exist purely
/// to give the engine and debug tooling something to schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    #[serde(rename = "pseudo")]
    Pseudo,
    #[serde(rename = "app.launch")]
    AppLaunch { app_id: String },
    #[serde(rename = "app.activity_usage")]
    AppActivityUsage {
        app_id: String,
        source_class: String,
        usage_event: AppUsageEvent,
    },
    #[serde(rename = "screen")]
    Screen { state: ScreenState },
    #[serde(rename = "screen_orientation")]
    ScreenOrientation { orientation: ScreenOrientation },
    #[serde(rename = "phone")]
    Phone { state: PhoneState },
    #[serde(rename = "package")]
    Package {
        app_id: String,
        action: PackageManagementEvent,
    },
    #[serde(rename = "notification")]
    Notification {
        app_id: String,
        action: NotificationAction,
        notification_id: String,
        tag: String,
    },
    #[serde(rename = "network")]
    Network {
        network_type: NetworkType,
        connection_state: NetworkConnectionState,
    },
    #[serde(rename = "network.type")]
    NetworkTypeChange { network_type: NetworkType },
    #[serde(rename = "network.status")]
    NetworkStatusChange {
        connection_state: NetworkConnectionState,
    },
    #[serde(rename = "battery")]
    Battery {
        level: Option<u8>,
        temperature: Option<i32>,
        status: BatteryStatus,
        plug_state: BatteryPlugState,
    },
    #[serde(rename = "battery.level")]
    BatteryLevel { level: u8 },
    #[serde(rename = "battery.temperature")]
    BatteryTemperature { temperature: i32 },
    #[serde(rename = "battery.status")]
    BatteryStatus { status: BatteryStatus },
    #[serde(rename = "battery.plug_status")]
    BatteryPlugStatus { plug_state: BatteryPlugState },
    #[serde(rename = "battery.energy_state")]
    BatteryEnergyState { energy_state: BatteryEnergyState },
    #[serde(rename = "storage")]
    Storage { state: StorageState },
    #[serde(rename = "headset")]
    Headset { state: HeadsetState },
    #[serde(rename = "dock")]
    Dock { state: DockState },
    #[serde(rename = "bluetooth")]
    Bluetooth {
        device_id: String,
        action: BluetoothConnectionEvent,
    },
    #[serde(rename = "system.memory_snapshot")]
    SystemMemorySnapshot {
        available_bytes: u64,
        total_bytes: u64,
    },
    #[serde(rename = "preload_app")]
    PreloadApp { app_id: String },
    #[serde(rename = "sim")]
    Sim { label: String },
    #[serde(rename = "sim.debug")]
    SimDebug { message: String },
}

impl EventPayload {
    /// The [`EventType`] this payload corresponds to.
    pub fn event_type(&self) -> EventType {
        match self {
            EventPayload::Pseudo => EventType::Pseudo,
            EventPayload::AppLaunch { .. } => EventType::AppLaunch,
            EventPayload::AppActivityUsage { .. } => EventType::AppActivityUsage,
            EventPayload::Screen { .. } => EventType::Screen,
            EventPayload::ScreenOrientation { .. } => EventType::ScreenOrientation,
            EventPayload::Phone { .. } => EventType::Phone,
            EventPayload::Package { .. } => EventType::Package,
            EventPayload::Notification { .. } => EventType::Notification,
            EventPayload::Network { .. } => EventType::Network,
            EventPayload::NetworkTypeChange { .. } => EventType::NetworkType,
            EventPayload::NetworkStatusChange { .. } => EventType::NetworkStatus,
            EventPayload::Battery { .. } => EventType::Battery,
            EventPayload::BatteryLevel { .. } => EventType::BatteryLevel,
            EventPayload::BatteryTemperature { .. } => EventType::BatteryTemperature,
            EventPayload::BatteryStatus { .. } => EventType::BatteryStatus,
            EventPayload::BatteryPlugStatus { .. } => EventType::BatteryPlugStatus,
            EventPayload::BatteryEnergyState { .. } => EventType::BatteryEnergyState,
            EventPayload::Storage { .. } => EventType::Storage,
            EventPayload::Headset { .. } => EventType::Headset,
            EventPayload::Dock { .. } => EventType::Dock,
            EventPayload::Bluetooth { .. } => EventType::Bluetooth,
            EventPayload::SystemMemorySnapshot { .. } => EventType::SystemMemorySnapshot,
            EventPayload::PreloadApp { .. } => EventType::PreloadApp,
            EventPayload::Sim { .. } => EventType::Sim,
            EventPayload::SimDebug { .. } => EventType::SimDebug,
        }
    }
}

/// A scheduled occurrence: a timestamp plus the payload it carries.
///
/// `Event` does not carry priority-tier or sequence information — that
/// belongs to the queue entry wrapping it, not the event itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(timestamp: Timestamp, payload: EventPayload) -> Self {
        Event { timestamp, payload }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.event_type(), self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_name_round_trips_through_json() {
        let payload = EventPayload::Screen {
            state: ScreenState::UserPresent,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"type\":\"screen\""));
        let decoded: EventPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn event_type_matches_payload() {
        let payload = EventPayload::AppLaunch {
            app_id: "com.example.app".into(),
        };
        assert_eq!(payload.event_type(), EventType::AppLaunch);
    }

    #[test]
    fn all_variants_have_distinct_wire_names() {
        let mut names: Vec<&str> = EventType::ALL.iter().map(|t| t.wire_name()).collect();
        names.sort_unstable();
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
        assert_eq!(EventType::ALL.len(), 25);
    }

    #[test]
    fn event_display_includes_type_and_time() {
        let ts = Timestamp::parse("2020-01-01T00:00:00Z").unwrap();
        let event = Event::new(ts, EventPayload::Pseudo);
        assert_eq!(event.to_string(), "pseudo@2020-01-01T00:00:00+00:00");
    }
}
