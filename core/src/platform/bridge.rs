//! Platform seams implemented by the host (Android/iOS through UniFFI, or
//! natively in Rust).
//!
//! Every trait here is a thin handle onto one platform subsystem. The bridge
//! never caches platform state: each call is a live query or write.

use crate::error::PlatformError;
use crate::setting::AudioStream;
use std::sync::Arc;

// ============================================================================
// PLATFORM CONSTANTS
// ============================================================================

/// Notification and settings-action identifiers, using Android's names.
pub mod actions {
    pub const VOLUME_CHANGED: &str = "android.media.VOLUME_CHANGED_ACTION";
    pub const WIFI_STATE_CHANGED: &str = "android.net.wifi.WIFI_STATE_CHANGED";
    pub const NETWORK_STATE_CHANGED: &str = "android.net.wifi.STATE_CHANGE";
    pub const CONNECTIVITY_CHANGED: &str = "android.net.conn.CONNECTIVITY_CHANGE";

    pub const WIFI_SETTINGS: &str = "android.settings.WIFI_SETTINGS";
    pub const BLUETOOTH_SETTINGS: &str = "android.settings.BLUETOOTH_SETTINGS";
    pub const LOCATION_SOURCE_SETTINGS: &str = "android.settings.LOCATION_SOURCE_SETTINGS";

    pub const GPS_PROVIDER: &str = "gps";
}

/// Wi-Fi radio state embedded in a Wi-Fi state notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disabling,
    Disabled,
    Enabling,
    Enabled,
    Unknown,
}

impl WifiState {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Disabling,
            1 => Self::Disabled,
            2 => Self::Enabling,
            3 => Self::Enabled,
            _ => Self::Unknown,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::Disabling => 0,
            Self::Disabled => 1,
            Self::Enabling => 2,
            Self::Enabled => 3,
            Self::Unknown => 4,
        }
    }

    /// Only settled states are worth telling the host about
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Enabled | Self::Disabled)
    }
}

/// A raw notification as delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PlatformNotification {
    /// Action the notification was broadcast under
    pub action: String,
    /// Integer state extra, when the notification carries one
    pub state: Option<i32>,
}

impl PlatformNotification {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            state: None,
        }
    }

    pub fn with_state(action: impl Into<String>, state: i32) -> Self {
        Self {
            action: action.into(),
            state: Some(state),
        }
    }
}

// ============================================================================
// PLATFORM TRAITS
// ============================================================================

/// Named integer settings (system settings provider)
#[uniffi::export(with_foreign)]
pub trait SettingsStore: Send + Sync {
    /// Fails with [`PlatformError::NotFound`] when the key was never written
    /// and has no platform default.
    fn get_int(&self, key: String) -> Result<i32, PlatformError>;
    fn put_int(&self, key: String, value: i32);
}

/// Audio stream volume control
#[uniffi::export(with_foreign)]
pub trait AudioService: Send + Sync {
    fn stream_volume(&self, stream: AudioStream) -> i32;
    fn stream_max_volume(&self, stream: AudioStream) -> i32;
    fn set_stream_volume(&self, stream: AudioStream, index: i32, flags: i32);
}

#[uniffi::export(with_foreign)]
pub trait WifiService: Send + Sync {
    fn is_wifi_enabled(&self) -> bool;
    /// Returns whether the platform accepted the request
    fn set_wifi_enabled(&self, enabled: bool) -> bool;
}

#[uniffi::export(with_foreign)]
pub trait LocationService: Send + Sync {
    fn is_provider_enabled(&self, provider: String) -> bool;
}

#[uniffi::export(with_foreign)]
pub trait BluetoothAdapter: Send + Sync {
    fn is_enabled(&self) -> bool;
}

/// Receives notifications from the platform's delivery context.
///
/// Implemented in Rust and handed to the host through [`NotificationHub`].
#[uniffi::export]
pub trait NotificationReceiver: Send + Sync {
    fn on_receive(&self, notification: PlatformNotification);
}

/// Registration point for platform change notifications
#[uniffi::export(with_foreign)]
pub trait NotificationHub: Send + Sync {
    /// Starts delivering notifications whose action is in `actions`.
    /// Returns an identifier for [`NotificationHub::unregister_receiver`].
    fn register_receiver(&self, actions: Vec<String>, receiver: Arc<dyn NotificationReceiver>)
        -> u64;
    fn unregister_receiver(&self, registration: u64);
}

/// Foreground UI used to launch system settings panels
#[uniffi::export(with_foreign)]
pub trait ActivityHost: Send + Sync {
    fn has_foreground_activity(&self) -> bool;
    /// Launches the settings panel; the outcome is reported back later with
    /// the same `request_code`.
    fn start_activity_for_result(&self, action: String, request_code: i32);
}

// ============================================================================
// PLATFORM HANDLES
// ============================================================================

/// The set of platform handles obtained when the module is constructed.
///
/// Wi-Fi and location handles may be missing; that condition is permanent for
/// the lifetime of the module. A missing Bluetooth adapter means the device
/// has no Bluetooth.
#[derive(Clone)]
pub struct Platform {
    pub settings: Arc<dyn SettingsStore>,
    pub audio: Arc<dyn AudioService>,
    pub wifi: Option<Arc<dyn WifiService>>,
    pub location: Option<Arc<dyn LocationService>>,
    pub bluetooth: Option<Arc<dyn BluetoothAdapter>>,
    pub notifications: Arc<dyn NotificationHub>,
    pub activity: Arc<dyn ActivityHost>,
}
