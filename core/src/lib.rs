// System Setting — device settings bridge for mobile hosts
//
// Exposes screen, volume and radio settings to the application layer and
// pushes volume / Wi-Fi change events back to it.

pub mod bridge;
pub mod config;
pub mod error;
pub mod platform;
pub mod setting;

pub use bridge::{
    BroadcastEmitter, ChangeListenerRegistry, EventEmitter, EventPayload, ListenCategory,
    PendingActionTable, PendingToggle, RequestCode, SystemEvent, SystemSetting, MODULE_NAME,
};
pub use config::{BridgeConfig, NotificationFilters, ToggleTarget, ToggleTargets};
pub use error::{PlatformError, ServiceKind, SystemSettingError, REJECT_CODE};
pub use platform::{
    actions, ActivityHost, AudioService, BluetoothAdapter, LocationService, NotificationHub,
    NotificationReceiver, Platform, PlatformNotification, SettingsStore, SimulatedPlatform,
    WifiService, WifiState,
};
pub use setting::{AudioStream, ScreenMode, SettingAccessor, SettingCategory};

uniffi::setup_scaffolding!();

/// Install the fmt subscriber (idempotent). `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
