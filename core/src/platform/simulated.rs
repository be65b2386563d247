//! In-process platform used by desktop hosts and tests.
//!
//! Behaves like the Android services it stands in for: volume writes and
//! Wi-Fi toggles broadcast their change notifications synchronously to every
//! registered receiver, from inside the write call.

use crate::error::PlatformError;
use crate::platform::bridge::{
    actions, ActivityHost, AudioService, BluetoothAdapter, LocationService, NotificationHub,
    NotificationReceiver, Platform, PlatformNotification, SettingsStore, WifiService, WifiState,
};
use crate::setting::AudioStream;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Default maximum index for every audio stream
pub const DEFAULT_MAX_VOLUME: i32 = 15;

struct Registration {
    actions: Vec<String>,
    receiver: Arc<dyn NotificationReceiver>,
}

#[derive(Default)]
struct SimulatedState {
    settings: HashMap<String, i32>,
    volumes: HashMap<AudioStream, i32>,
    max_volumes: HashMap<AudioStream, i32>,
    last_volume_flags: Option<i32>,
    wifi_enabled: bool,
    enabled_providers: HashSet<String>,
    bluetooth_enabled: bool,
    foreground: bool,
    launched: Vec<(String, i32)>,
}

/// Simulated device implementing every platform seam
pub struct SimulatedPlatform {
    state: Mutex<SimulatedState>,
    receivers: Mutex<HashMap<u64, Registration>>,
    next_registration: AtomicU64,
    registrations_made: AtomicUsize,
}

impl SimulatedPlatform {
    /// A freshly provisioned device: no settings written, foreground UI up.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SimulatedState {
                foreground: true,
                ..Default::default()
            }),
            receivers: Mutex::new(HashMap::new()),
            next_registration: AtomicU64::new(1),
            registrations_made: AtomicUsize::new(0),
        })
    }

    /// Handles for every service, all backed by this device
    pub fn platform(self: &Arc<Self>) -> Platform {
        Platform {
            settings: self.clone(),
            audio: self.clone(),
            wifi: Some(self.clone()),
            location: Some(self.clone()),
            bluetooth: Some(self.clone()),
            notifications: self.clone(),
            activity: self.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // DEVICE CONTROL
    // ------------------------------------------------------------------------

    pub fn set_foreground(&self, foreground: bool) {
        self.state.lock().foreground = foreground;
    }

    pub fn set_max_volume(&self, stream: AudioStream, max: i32) {
        self.state.lock().max_volumes.insert(stream, max);
    }

    pub fn set_bluetooth_enabled(&self, enabled: bool) {
        self.state.lock().bluetooth_enabled = enabled;
    }

    pub fn set_provider_enabled(&self, provider: &str, enabled: bool) {
        let mut state = self.state.lock();
        if enabled {
            state.enabled_providers.insert(provider.to_string());
        } else {
            state.enabled_providers.remove(provider);
        }
    }

    /// Changes the volume as if the user pressed a hardware key
    pub fn press_volume_key(&self, stream: AudioStream, index: i32) {
        self.state.lock().volumes.insert(stream, index);
        self.broadcast(PlatformNotification::new(actions::VOLUME_CHANGED));
    }

    /// Delivers a notification to every receiver registered for its action.
    ///
    /// Receivers are invoked without any internal lock held.
    pub fn broadcast(&self, notification: PlatformNotification) {
        let targets: Vec<Arc<dyn NotificationReceiver>> = self
            .receivers
            .lock()
            .values()
            .filter(|r| r.actions.iter().any(|a| *a == notification.action))
            .map(|r| r.receiver.clone())
            .collect();

        for receiver in targets {
            receiver.on_receive(notification.clone());
        }
    }

    // ------------------------------------------------------------------------
    // INSPECTION
    // ------------------------------------------------------------------------

    pub fn raw_setting(&self, key: &str) -> Option<i32> {
        self.state.lock().settings.get(key).copied()
    }

    pub fn raw_volume(&self, stream: AudioStream) -> i32 {
        self.stream_volume(stream)
    }

    pub fn last_volume_flags(&self) -> Option<i32> {
        self.state.lock().last_volume_flags
    }

    /// Total number of receiver registrations ever made
    pub fn registrations_made(&self) -> usize {
        self.registrations_made.load(Ordering::SeqCst)
    }

    /// Receivers currently registered
    pub fn active_receivers(&self) -> usize {
        self.receivers.lock().len()
    }

    /// Settings panels launched, in order
    pub fn launched(&self) -> Vec<(String, i32)> {
        self.state.lock().launched.clone()
    }
}

impl SettingsStore for SimulatedPlatform {
    fn get_int(&self, key: String) -> Result<i32, PlatformError> {
        self.state
            .lock()
            .settings
            .get(&key)
            .copied()
            .ok_or(PlatformError::NotFound { key })
    }

    fn put_int(&self, key: String, value: i32) {
        self.state.lock().settings.insert(key, value);
    }
}

impl AudioService for SimulatedPlatform {
    fn stream_volume(&self, stream: AudioStream) -> i32 {
        self.state.lock().volumes.get(&stream).copied().unwrap_or(0)
    }

    fn stream_max_volume(&self, stream: AudioStream) -> i32 {
        self.state
            .lock()
            .max_volumes
            .get(&stream)
            .copied()
            .unwrap_or(DEFAULT_MAX_VOLUME)
    }

    fn set_stream_volume(&self, stream: AudioStream, index: i32, flags: i32) {
        {
            let mut state = self.state.lock();
            let max = state
                .max_volumes
                .get(&stream)
                .copied()
                .unwrap_or(DEFAULT_MAX_VOLUME);
            state.volumes.insert(stream, index.clamp(0, max));
            state.last_volume_flags = Some(flags);
        }
        self.broadcast(PlatformNotification::new(actions::VOLUME_CHANGED));
    }
}

impl WifiService for SimulatedPlatform {
    fn is_wifi_enabled(&self) -> bool {
        self.state.lock().wifi_enabled
    }

    fn set_wifi_enabled(&self, enabled: bool) -> bool {
        let (transient, settled) = if enabled {
            (WifiState::Enabling, WifiState::Enabled)
        } else {
            (WifiState::Disabling, WifiState::Disabled)
        };

        self.broadcast(PlatformNotification::with_state(
            actions::WIFI_STATE_CHANGED,
            transient.as_raw(),
        ));
        self.state.lock().wifi_enabled = enabled;
        self.broadcast(PlatformNotification::with_state(
            actions::WIFI_STATE_CHANGED,
            settled.as_raw(),
        ));
        self.broadcast(PlatformNotification::new(actions::CONNECTIVITY_CHANGED));
        true
    }
}

impl LocationService for SimulatedPlatform {
    fn is_provider_enabled(&self, provider: String) -> bool {
        self.state.lock().enabled_providers.contains(&provider)
    }
}

impl BluetoothAdapter for SimulatedPlatform {
    fn is_enabled(&self) -> bool {
        self.state.lock().bluetooth_enabled
    }
}

impl NotificationHub for SimulatedPlatform {
    fn register_receiver(
        &self,
        actions: Vec<String>,
        receiver: Arc<dyn NotificationReceiver>,
    ) -> u64 {
        let id = self.next_registration.fetch_add(1, Ordering::SeqCst);
        self.registrations_made.fetch_add(1, Ordering::SeqCst);
        self.receivers
            .lock()
            .insert(id, Registration { actions, receiver });
        id
    }

    fn unregister_receiver(&self, registration: u64) {
        self.receivers.lock().remove(&registration);
    }
}

impl ActivityHost for SimulatedPlatform {
    fn has_foreground_activity(&self) -> bool {
        self.state.lock().foreground
    }

    fn start_activity_for_result(&self, action: String, request_code: i32) {
        self.state.lock().launched.push((action, request_code));
    }
}
