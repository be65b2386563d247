//! Bridge configuration
//!
//! Defaults reproduce the Android module: music stream, GPS provider, fixed
//! request codes per settings panel and the Android broadcast actions.

use crate::error::SystemSettingError;
use crate::platform::actions;
use crate::setting::{AudioStream, SettingCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const EVENT_VOLUME: &str = "EventVolume";
pub const EVENT_WIFI_CHANGE: &str = "EventWifiChange";
pub const EVENT_BLUETOOTH_CHANGE: &str = "EventBluetoothChange";
pub const EVENT_LOCATION_CHANGE: &str = "EventLocationModeChange";

/// Settings panel launched for a toggle, and how its result is announced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleTarget {
    /// Settings action launched in the external flow
    pub action: String,
    /// Correlation token for the launched flow
    pub request_code: i32,
    /// Event emitted once the flow reports back
    pub completion_event: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleTargets {
    pub wifi: ToggleTarget,
    pub bluetooth: ToggleTarget,
    pub location: ToggleTarget,
}

impl ToggleTargets {
    pub fn get(&self, category: SettingCategory) -> Option<&ToggleTarget> {
        match category {
            SettingCategory::Wifi => Some(&self.wifi),
            SettingCategory::Bluetooth => Some(&self.bluetooth),
            SettingCategory::Location => Some(&self.location),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingCategory, &ToggleTarget)> {
        [
            (SettingCategory::Wifi, &self.wifi),
            (SettingCategory::Bluetooth, &self.bluetooth),
            (SettingCategory::Location, &self.location),
        ]
        .into_iter()
    }
}

impl Default for ToggleTargets {
    fn default() -> Self {
        Self {
            wifi: ToggleTarget {
                action: actions::WIFI_SETTINGS.to_string(),
                request_code: 0,
                completion_event: EVENT_WIFI_CHANGE.to_string(),
            },
            bluetooth: ToggleTarget {
                action: actions::BLUETOOTH_SETTINGS.to_string(),
                request_code: 1,
                completion_event: EVENT_BLUETOOTH_CHANGE.to_string(),
            },
            location: ToggleTarget {
                action: actions::LOCATION_SOURCE_SETTINGS.to_string(),
                request_code: 2,
                completion_event: EVENT_LOCATION_CHANGE.to_string(),
            },
        }
    }
}

/// Notification actions each listener subscribes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFilters {
    pub volume: Vec<String>,
    pub wifi: Vec<String>,
    /// The only Wi-Fi action whose state extra is inspected
    pub wifi_state_action: String,
}

impl Default for NotificationFilters {
    fn default() -> Self {
        Self {
            volume: vec![actions::VOLUME_CHANGED.to_string()],
            wifi: vec![
                actions::NETWORK_STATE_CHANGED.to_string(),
                actions::WIFI_STATE_CHANGED.to_string(),
                actions::CONNECTIVITY_CHANGED.to_string(),
            ],
            wifi_state_action: actions::WIFI_STATE_CHANGED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Stream read and written by the volume operations
    pub volume_stream: AudioStream,
    /// Ask the platform to play the feedback sound on volume writes
    pub play_sound_on_volume_change: bool,
    /// Provider queried by the location check
    pub location_provider: String,
    pub volume_event: String,
    pub wifi_change_event: String,
    pub filters: NotificationFilters,
    pub toggles: ToggleTargets,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            volume_stream: AudioStream::Music,
            play_sound_on_volume_change: true,
            location_provider: actions::GPS_PROVIDER.to_string(),
            volume_event: EVENT_VOLUME.to_string(),
            wifi_change_event: EVENT_WIFI_CHANGE.to_string(),
            filters: NotificationFilters::default(),
            toggles: ToggleTargets::default(),
        }
    }
}

impl BridgeConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), SystemSettingError> {
        if self.location_provider.trim().is_empty() {
            return Err(SystemSettingError::invalid_config(
                "location_provider cannot be empty",
            ));
        }
        if self.volume_event.trim().is_empty() || self.wifi_change_event.trim().is_empty() {
            return Err(SystemSettingError::invalid_config(
                "event names cannot be empty",
            ));
        }
        if self.filters.volume.is_empty() || self.filters.wifi.is_empty() {
            return Err(SystemSettingError::invalid_config(
                "notification filters cannot be empty",
            ));
        }
        if !self.filters.wifi.contains(&self.filters.wifi_state_action) {
            return Err(SystemSettingError::invalid_config(format!(
                "wifi filter does not include {}",
                self.filters.wifi_state_action
            )));
        }

        let mut codes = HashSet::new();
        for (category, target) in self.toggles.iter() {
            if target.action.trim().is_empty() || target.completion_event.trim().is_empty() {
                return Err(SystemSettingError::invalid_config(format!(
                    "{} toggle needs an action and a completion event",
                    category
                )));
            }
            if !codes.insert(target.request_code) {
                return Err(SystemSettingError::invalid_config(format!(
                    "request code {} is used by more than one toggle",
                    target.request_code
                )));
            }
        }

        Ok(())
    }

    /// Parse and validate a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SystemSettingError> {
        let config: BridgeConfig = serde_json::from_str(json)
            .map_err(|e| SystemSettingError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file, falling back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SystemSettingError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| SystemSettingError::invalid_config(e.to_string()))?;
        Self::from_json_str(&data)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SystemSettingError> {
        self.validate()?;
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| SystemSettingError::invalid_config(e.to_string()))?;
        std::fs::write(path, data).map_err(|e| SystemSettingError::invalid_config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.toggles.wifi.request_code, 0);
        assert_eq!(config.toggles.bluetooth.request_code, 1);
        assert_eq!(config.toggles.location.request_code, 2);
        assert_eq!(config.location_provider, "gps");
    }

    #[test]
    fn test_duplicate_request_codes_rejected() {
        let mut config = BridgeConfig::default();
        config.toggles.location.request_code = config.toggles.wifi.request_code;
        assert!(matches!(
            config.validate(),
            Err(SystemSettingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_wifi_filter_must_contain_state_action() {
        let mut config = BridgeConfig::default();
        config.filters.wifi = vec![actions::CONNECTIVITY_CHANGED.to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            BridgeConfig::from_json_str(r#"{ "volume_stream": "Ring", "location_provider": "network" }"#)
                .unwrap();
        assert_eq!(config.volume_stream, AudioStream::Ring);
        assert_eq!(config.location_provider, "network");
        assert_eq!(config.toggles, ToggleTargets::default());
        assert!(config.play_sound_on_volume_change);
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(BridgeConfig::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BridgeConfig::load(dir.path().join("bridge.json")).unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.json");

        let mut config = BridgeConfig::default();
        config.play_sound_on_volume_change = false;
        config.toggles.bluetooth.completion_event = "EventBtDone".to_string();
        config.save(&path).unwrap();

        let loaded = BridgeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
