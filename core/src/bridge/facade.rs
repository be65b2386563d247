//! The `SystemSetting` module: the surface the host application calls.
//!
//! Direct reads/writes go straight through the [`SettingAccessor`]. Wi-Fi,
//! Bluetooth and location toggles that need the user open a system settings
//! panel; each launch is recorded in the [`PendingActionTable`] and the
//! category's completion event fires when the host reports the panel's result.

use crate::bridge::events::{EventEmitter, SystemEvent};
use crate::bridge::listener::{ChangeListenerRegistry, ListenCategory};
use crate::bridge::pending::{PendingActionTable, RequestCode};
use crate::config::BridgeConfig;
use crate::error::{ServiceKind, SystemSettingError};
use crate::platform::{
    ActivityHost, AudioService, BluetoothAdapter, LocationService, NotificationHub, Platform,
    SettingsStore, WifiService,
};
use crate::setting::{ScreenMode, SettingAccessor, SettingCategory};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name the host registers the module under
pub const MODULE_NAME: &str = "SystemSetting";

#[derive(uniffi::Object)]
pub struct SystemSetting {
    config: BridgeConfig,
    accessor: Arc<SettingAccessor>,
    wifi: Option<Arc<dyn WifiService>>,
    location: Option<Arc<dyn LocationService>>,
    bluetooth: Option<Arc<dyn BluetoothAdapter>>,
    activity: Arc<dyn ActivityHost>,
    emitter: Arc<dyn EventEmitter>,
    listeners: ChangeListenerRegistry,
    pending: PendingActionTable,
}

impl SystemSetting {
    /// Build the module and start watching volume changes
    pub fn new(
        platform: Platform,
        emitter: Arc<dyn EventEmitter>,
        config: BridgeConfig,
    ) -> Result<Arc<Self>, SystemSettingError> {
        crate::init_logging();
        config.validate()?;

        if platform.wifi.is_none() {
            warn!("Wifi service unavailable; wifi operations will be rejected or ignored");
        }
        if platform.location.is_none() {
            warn!("Location service unavailable; location checks will be rejected");
        }

        let accessor = Arc::new(SettingAccessor::new(
            platform.settings,
            platform.audio,
            &config,
        ));
        let listeners = ChangeListenerRegistry::new(
            platform.notifications,
            accessor.clone(),
            emitter.clone(),
            &config,
        );

        let module = Arc::new(Self {
            config,
            accessor,
            wifi: platform.wifi,
            location: platform.location,
            bluetooth: platform.bluetooth,
            activity: platform.activity,
            emitter,
            listeners,
            pending: PendingActionTable::new(),
        });

        module.listeners.ensure_subscribed(ListenCategory::Volume);
        info!("{} module ready", MODULE_NAME);
        Ok(module)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn listeners(&self) -> &ChangeListenerRegistry {
        &self.listeners
    }

    pub fn pending(&self) -> &PendingActionTable {
        &self.pending
    }

    /// Launch the settings panel for `category` and record it as pending.
    ///
    /// Fails with `NoForegroundContext` when no activity can host the panel;
    /// nothing is recorded in that case.
    pub fn toggle(&self, category: SettingCategory) -> Result<RequestCode, SystemSettingError> {
        let target = self
            .config
            .toggles
            .get(category)
            .ok_or(SystemSettingError::NotToggleable { category })?;

        if !self.activity.has_foreground_activity() {
            return Err(SystemSettingError::NoForegroundContext {
                action: target.action.clone(),
            });
        }

        let code = self
            .pending
            .register(target.request_code, category, target.completion_event.clone());
        self.activity
            .start_activity_for_result(target.action.clone(), code);
        debug!("Launched {} for {} (request {})", target.action, category, code);
        Ok(code)
    }

    fn launch(&self, category: SettingCategory) {
        if let Err(e) = self.toggle(category) {
            warn!("{}, switch will be ignored", e);
        }
    }

    fn wifi_service(&self) -> Result<&Arc<dyn WifiService>, SystemSettingError> {
        self.wifi
            .as_ref()
            .ok_or_else(|| SystemSettingError::service_unavailable(ServiceKind::Wifi))
    }
}

#[uniffi::export]
impl SystemSetting {
    /// Construct from host-implemented platform handles.
    ///
    /// `config_json` overrides the defaults; `None` keeps them.
    #[allow(clippy::too_many_arguments)]
    #[uniffi::constructor]
    pub fn from_host(
        settings: Arc<dyn SettingsStore>,
        audio: Arc<dyn AudioService>,
        wifi: Option<Arc<dyn WifiService>>,
        location: Option<Arc<dyn LocationService>>,
        bluetooth: Option<Arc<dyn BluetoothAdapter>>,
        notifications: Arc<dyn NotificationHub>,
        activity: Arc<dyn ActivityHost>,
        emitter: Arc<dyn EventEmitter>,
        config_json: Option<String>,
    ) -> Result<Arc<Self>, SystemSettingError> {
        let config = match config_json {
            Some(json) => BridgeConfig::from_json_str(&json)?,
            None => BridgeConfig::default(),
        };
        let platform = Platform {
            settings,
            audio,
            wifi,
            location,
            bluetooth,
            notifications,
            activity,
        };
        Self::new(platform, emitter, config)
    }

    pub fn module_name(&self) -> String {
        MODULE_NAME.to_string()
    }

    // ------------------------------------------------------------------------
    // SCREEN
    // ------------------------------------------------------------------------

    /// `0` selects manual brightness; any other value selects automatic.
    pub fn set_screen_mode(&self, mode: i32) {
        self.accessor.set_screen_mode(ScreenMode::from_raw(mode));
    }

    pub fn get_screen_mode(&self) -> Result<i32, SystemSettingError> {
        self.accessor
            .screen_mode()
            .map_err(|e| SystemSettingError::read_failed(e, "get screen mode fail"))
    }

    pub fn set_brightness(&self, value: f32) {
        self.accessor.set_brightness(value);
    }

    pub fn get_brightness(&self) -> Result<f32, SystemSettingError> {
        self.accessor
            .brightness()
            .map_err(|e| SystemSettingError::read_failed(e, "get brightness fail"))
    }

    // ------------------------------------------------------------------------
    // VOLUME
    // ------------------------------------------------------------------------

    /// The volume listener is unregistered for the duration of the write so
    /// the platform's notification for it never reaches the host.
    pub fn set_volume(&self, value: f32) {
        self.listeners
            .with_suppressed(ListenCategory::Volume, || self.accessor.set_volume(value));
    }

    pub fn get_volume(&self) -> f32 {
        self.accessor.volume()
    }

    // ------------------------------------------------------------------------
    // RADIOS
    // ------------------------------------------------------------------------

    pub fn is_wifi_enabled(&self) -> Result<bool, SystemSettingError> {
        Ok(self.wifi_service()?.is_wifi_enabled())
    }

    /// Flip Wi-Fi in place, without leaving the app. The resulting state
    /// change reaches the host as `EventWifiChange`.
    pub fn switch_wifi_silence(&self) {
        let wifi = match self.wifi_service() {
            Ok(wifi) => wifi,
            Err(_) => {
                warn!("Cannot get wifi manager, switchWifiSilence will be ignored");
                return;
            }
        };

        self.listeners.ensure_subscribed(ListenCategory::Wifi);
        let target = !wifi.is_wifi_enabled();
        if !wifi.set_wifi_enabled(target) {
            warn!("Platform refused to set wifi enabled={}", target);
        }
    }

    pub fn switch_wifi(&self) {
        self.launch(SettingCategory::Wifi);
    }

    pub fn is_location_enabled(&self) -> Result<bool, SystemSettingError> {
        let location = self
            .location
            .as_ref()
            .ok_or_else(|| SystemSettingError::service_unavailable(ServiceKind::Location))?;
        Ok(location.is_provider_enabled(self.config.location_provider.clone()))
    }

    pub fn switch_location(&self) {
        self.launch(SettingCategory::Location);
    }

    /// A device without a Bluetooth adapter reports `false`.
    pub fn is_bluetooth_enabled(&self) -> bool {
        self.bluetooth
            .as_ref()
            .map(|adapter| adapter.is_enabled())
            .unwrap_or(false)
    }

    pub fn switch_bluetooth(&self) {
        self.launch(SettingCategory::Bluetooth);
    }

    // ------------------------------------------------------------------------
    // EXTERNAL FLOW RESULTS & LIFECYCLE
    // ------------------------------------------------------------------------

    /// Called by the host when a launched settings panel returns.
    ///
    /// The result code is not interpreted: the host re-reads the setting on
    /// the completion event. Unknown or already-consumed codes are ignored.
    pub fn report_external_result(&self, request_code: i32, result_code: i32) {
        match self.pending.resolve(request_code) {
            Some(toggle) => {
                debug!(
                    "{} panel returned {} after {} ms",
                    toggle.category,
                    result_code,
                    toggle.age_ms()
                );
                self.emitter.emit(SystemEvent::bare(toggle.completion_event));
            }
            None => debug!("Ignoring result for unknown request {}", request_code),
        }
    }

    pub fn is_listening(&self, category: ListenCategory) -> bool {
        self.listeners.is_subscribed(category)
    }

    /// Release platform subscriptions and abandon pending toggles.
    pub fn teardown(&self) {
        self.listeners.teardown();
        let abandoned = self.pending.clear();
        info!(
            "{} module torn down ({} pending toggle(s) abandoned)",
            MODULE_NAME, abandoned
        );
    }
}
