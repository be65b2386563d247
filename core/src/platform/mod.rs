//! Platform integration layer for mobile (iOS/Android) and desktop
//!
//! This module provides:
//! - The platform seams the host implements (settings, audio, radios, notifications, UI)
//! - A simulated device for desktop hosts and tests

pub mod bridge;
pub mod simulated;

pub use bridge::{
    actions, ActivityHost, AudioService, BluetoothAdapter, LocationService, NotificationHub,
    NotificationReceiver, Platform, PlatformNotification, SettingsStore, WifiService, WifiState,
};
pub use simulated::SimulatedPlatform;
