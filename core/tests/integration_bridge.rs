//! Integration tests: the `SystemSetting` module driven end-to-end against the
//! simulated device, the way a host application would drive it.
//!
//! Run with:
//!   cargo test --test integration_bridge

use parking_lot::Mutex;
use std::sync::Arc;
use system_setting_core::{
    AudioStream, BridgeConfig, EventEmitter, ListenCategory, SettingCategory, SimulatedPlatform,
    SystemEvent, SystemSetting,
};

// ============================================================================
// Helpers
// ============================================================================

/// Emitter that records every event in order
#[derive(Default)]
struct RecordingEmitter {
    events: Mutex<Vec<SystemEvent>>,
}

impl RecordingEmitter {
    fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.name.clone()).collect()
    }

    fn take(&self) -> Vec<SystemEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventEmitter for RecordingEmitter {
    fn emit(&self, event: SystemEvent) {
        self.events.lock().push(event);
    }
}

fn make_module(
    config: BridgeConfig,
) -> (Arc<SimulatedPlatform>, Arc<SystemSetting>, Arc<RecordingEmitter>) {
    let device = SimulatedPlatform::new();
    let emitter = Arc::new(RecordingEmitter::default());
    let module = SystemSetting::new(device.platform(), emitter.clone(), config)
        .expect("module construction must succeed");
    (device, module, emitter)
}

// ============================================================================
// Toggle flows
// ============================================================================

#[test]
fn test_every_panel_reports_its_own_completion_event() {
    let (device, module, emitter) = make_module(BridgeConfig::default());

    module.switch_wifi();
    module.switch_bluetooth();
    module.switch_location();
    assert_eq!(module.pending().len(), 3);

    let launched: Vec<i32> = device.launched().into_iter().map(|(_, code)| code).collect();
    assert_eq!(launched, vec![0, 1, 2]);

    // Results arrive in a different order than the launches
    module.report_external_result(2, 0);
    module.report_external_result(0, -1);
    module.report_external_result(1, 0);

    assert_eq!(
        emitter.names(),
        vec![
            "EventLocationModeChange".to_string(),
            "EventWifiChange".to_string(),
            "EventBluetoothChange".to_string(),
        ]
    );
    assert!(module.pending().is_empty());
}

#[test]
fn test_second_toggle_before_result_overwrites() {
    let (device, module, emitter) = make_module(BridgeConfig::default());

    module.switch_wifi();
    module.switch_wifi();
    assert_eq!(device.launched().len(), 2);
    assert_eq!(module.pending().len(), 1);

    module.report_external_result(0, 0);
    module.report_external_result(0, 0);
    assert_eq!(emitter.names(), vec!["EventWifiChange".to_string()]);
}

#[test]
fn test_stale_and_foreign_results_are_ignored() {
    let (_device, module, emitter) = make_module(BridgeConfig::default());

    module.report_external_result(0, 0);
    module.report_external_result(9000, 0);
    assert!(emitter.take().is_empty());
}

#[test]
fn test_backgrounded_app_drops_toggle_then_recovers() {
    let (device, module, emitter) = make_module(BridgeConfig::default());

    device.set_foreground(false);
    module.switch_location();
    assert!(module.pending().pending(SettingCategory::Location).is_none());

    device.set_foreground(true);
    module.switch_location();
    module.report_external_result(2, 0);
    assert_eq!(emitter.names(), vec!["EventLocationModeChange".to_string()]);
}

#[test]
fn test_custom_request_codes_and_events() {
    let mut config = BridgeConfig::default();
    config.toggles.bluetooth.request_code = 4101;
    config.toggles.bluetooth.completion_event = "BluetoothPanelClosed".to_string();
    let (device, module, emitter) = make_module(config);

    module.switch_bluetooth();
    assert_eq!(device.launched()[0].1, 4101);

    module.report_external_result(1, 0);
    assert!(emitter.take().is_empty());

    module.report_external_result(4101, 0);
    assert_eq!(emitter.names(), vec!["BluetoothPanelClosed".to_string()]);
}

// ============================================================================
// Volume
// ============================================================================

#[test]
fn test_volume_writes_never_echo() {
    let (device, module, emitter) = make_module(BridgeConfig::default());

    for step in 0..=10 {
        module.set_volume(step as f32 / 10.0);
    }
    assert!(emitter.take().is_empty());
    assert_eq!(device.raw_volume(AudioStream::Music), 15);

    device.press_volume_key(AudioStream::Music, 5);
    let events = emitter.take();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "EventVolume");
    let value = events[0].payload.expect("volume payload").value;
    assert!((value - 5.0 / 15.0).abs() < f32::EPSILON);
}

#[test]
fn test_volume_event_serializes_like_host_map() {
    let (device, _module, emitter) = make_module(BridgeConfig::default());
    device.press_volume_key(AudioStream::Music, 15);

    let events = emitter.take();
    assert_eq!(events[0].payload_json().as_deref(), Some(r#"{"value":1.0}"#));
}

// ============================================================================
// Wi-Fi
// ============================================================================

#[test]
fn test_silent_wifi_switch_round_trip() {
    let (_device, module, emitter) = make_module(BridgeConfig::default());

    module.switch_wifi_silence();
    assert!(module.is_wifi_enabled().unwrap());
    module.switch_wifi_silence();
    assert!(!module.is_wifi_enabled().unwrap());

    // One event per settled state, none for enabling/disabling or connectivity
    assert_eq!(
        emitter.names(),
        vec!["EventWifiChange".to_string(), "EventWifiChange".to_string()]
    );
    assert!(module.is_listening(ListenCategory::Wifi));
}

#[test]
fn test_teardown_then_rearm() {
    let (device, module, emitter) = make_module(BridgeConfig::default());
    module.switch_wifi_silence();
    emitter.take();

    module.teardown();
    device.press_volume_key(AudioStream::Music, 3);
    assert!(emitter.take().is_empty());

    assert!(module.listeners().ensure_subscribed(ListenCategory::Volume));
    device.press_volume_key(AudioStream::Music, 4);
    assert_eq!(emitter.names(), vec!["EventVolume".to_string()]);
}
