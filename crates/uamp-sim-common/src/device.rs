//! Device-state enums and the aggregate [`DeviceState`].
//!
//! These mirror the device facets a trace can report on: screen,
//! orientation, phone call state, headset, dock, network, battery, and
//! storage. The engine owns the aggregate and updates it implicitly as
//! matching events are dispatched; modules only ever read it.

use serde::{Deserialize, Serialize};

/// Screen power/interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenState {
    Unknown,
    Off,
    On,
    UserPresent,
}

impl ScreenState {
    /// True for `On` or `UserPresent`.
    pub fn is_on(self) -> bool {
        matches!(self, ScreenState::On | ScreenState::UserPresent)
    }

    /// True for `Off`.
    pub fn is_off(self) -> bool {
        matches!(self, ScreenState::Off)
    }
}

/// Screen orientation, in degrees of rotation from portrait-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenOrientation {
    Unknown,
    Zero,
    Ninety,
    OneEighty,
    TwoSeventy,
}

impl ScreenOrientation {
    pub fn is_portrait(self) -> bool {
        matches!(self, ScreenOrientation::Zero | ScreenOrientation::OneEighty)
    }

    pub fn is_landscape(self) -> bool {
        matches!(self, ScreenOrientation::Ninety | ScreenOrientation::TwoSeventy)
    }
}

/// Phone call state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneState {
    Unknown,
    Idle,
    OffHook,
    Ringing,
}

/// Wired headset plug state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadsetState {
    Unknown,
    Unplugged,
    Plugged,
}

impl HeadsetState {
    pub fn is_plugged(self) -> bool {
        matches!(self, HeadsetState::Plugged)
    }

    pub fn is_unplugged(self) -> bool {
        matches!(self, HeadsetState::Unplugged)
    }
}

/// Docking state (e.g. car or desk dock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockState {
    Unknown,
    Undocked,
    Car,
    Desk,
    HeDesk,
    LeDesk,
}

impl DockState {
    pub fn is_undocked(self) -> bool {
        matches!(self, DockState::Undocked)
    }
}

/// Active network transport type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Unknown,
    Mobile,
    Ethernet,
    Wifi,
    Bluetooth,
    Wimax,
}

/// Network connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkConnectionState {
    Unknown,
    Disconnected,
    Connecting,
    Connected,
}

/// Aggregate network state: transport type plus connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkState {
    pub network_type: NetworkType,
    pub connection_state: NetworkConnectionState,
}

impl Default for NetworkState {
    fn default() -> Self {
        NetworkState {
            network_type: NetworkType::Unknown,
            connection_state: NetworkConnectionState::Unknown,
        }
    }
}

/// Battery charging status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    Unknown,
    Discharging,
    NotCharging,
    Charging,
    Full,
}

/// What the battery is plugged into, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryPlugState {
    None,
    Ac,
    Usb,
    Wireless,
}

/// Coarse battery energy classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryEnergyState {
    Unknown,
    Low,
    Okay,
}

/// Aggregate battery state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryState {
    pub level: Option<u8>,
    pub temperature: Option<i32>,
    pub status: BatteryStatus,
    pub plug_state: BatteryPlugState,
    pub energy_state: BatteryEnergyState,
}

impl Default for BatteryState {
    fn default() -> Self {
        BatteryState {
            level: None,
            temperature: None,
            status: BatteryStatus::Unknown,
            plug_state: BatteryPlugState::None,
            energy_state: BatteryEnergyState::Unknown,
        }
    }
}

/// Free-storage classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageState {
    Unknown,
    Low,
    Okay,
}

/// Package management action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageManagementEvent {
    Installed,
    Uninstalled,
    Updated,
    Replaced,
}

/// Notification post/removal action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    Posted,
    Removed,
}

/// Bluetooth connect/disconnect action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BluetoothConnectionEvent {
    Disconnected,
    Connected,
}

/// Foreground/background transition recorded by usage accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppUsageEvent {
    MoveBackground,
    MoveForeground,
}

/// Device-wide aggregate state, owned by the engine and updated
/// implicitly as relevant events are dispatched. Modules may read it
/// through [`crate::SimContext::device_state`] but never mutate it
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceState {
    pub screen_state: ScreenState,
    pub screen_orientation: ScreenOrientation,
    pub phone_state: PhoneState,
    pub headset_state: HeadsetState,
    pub dock_state: DockState,
    pub network_state: NetworkState,
    pub battery_state: BatteryState,
}

impl Default for ScreenState {
    fn default() -> Self {
        ScreenState::Unknown
    }
}

impl Default for ScreenOrientation {
    fn default() -> Self {
        ScreenOrientation::Unknown
    }
}

impl Default for PhoneState {
    fn default() -> Self {
        PhoneState::Unknown
    }
}

impl Default for HeadsetState {
    fn default() -> Self {
        HeadsetState::Unknown
    }
}

impl Default for DockState {
    fn default() -> Self {
        DockState::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_state_on_off() {
        assert!(ScreenState::On.is_on());
        assert!(ScreenState::UserPresent.is_on());
        assert!(!ScreenState::Off.is_on());
        assert!(ScreenState::Off.is_off());
    }

    #[test]
    fn orientation_portrait_landscape() {
        assert!(ScreenOrientation::Zero.is_portrait());
        assert!(ScreenOrientation::OneEighty.is_portrait());
        assert!(ScreenOrientation::Ninety.is_landscape());
        assert!(ScreenOrientation::TwoSeventy.is_landscape());
    }

    #[test]
    fn device_state_defaults_unknown() {
        let state = DeviceState::default();
        assert_eq!(state.screen_state, ScreenState::Unknown);
        assert_eq!(state.phone_state, PhoneState::Unknown);
    }
}
