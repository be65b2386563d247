//! Stateless reads and writes of single platform settings.

use crate::config::BridgeConfig;
use crate::error::PlatformError;
use crate::platform::{AudioService, SettingsStore};
use crate::setting::{AudioStream, ScreenMode, SettingCategory};
use std::sync::Arc;
use tracing::warn;

pub const SCREEN_MODE_KEY: &str = "screen_brightness_mode";
pub const BRIGHTNESS_KEY: &str = "screen_brightness";

/// Highest stored brightness value
pub const BRIGHTNESS_LEVELS: i32 = 255;

/// Volume write flag asking the platform to play its feedback sound
pub const FLAG_PLAY_SOUND: i32 = 1 << 2;

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Normalized brightness to the stored 0..=255 value (truncating)
pub fn brightness_to_storage(value: f32) -> i32 {
    (clamp_unit(value) * BRIGHTNESS_LEVELS as f32) as i32
}

pub fn storage_to_brightness(stored: i32) -> f32 {
    stored as f32 / BRIGHTNESS_LEVELS as f32
}

/// Normalized volume to a stream index for a stream with `max` steps
pub fn volume_to_index(value: f32, max: i32) -> i32 {
    (clamp_unit(value) * max as f32) as i32
}

pub fn index_to_volume(index: i32, max: i32) -> f32 {
    if max <= 0 {
        return 0.0;
    }
    index as f32 / max as f32
}

/// Reads and writes individual settings through the platform handles.
///
/// Holds no state of its own beyond the handles and the configured stream.
pub struct SettingAccessor {
    settings: Arc<dyn SettingsStore>,
    audio: Arc<dyn AudioService>,
    volume_stream: AudioStream,
    volume_flags: i32,
}

impl SettingAccessor {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        audio: Arc<dyn AudioService>,
        config: &BridgeConfig,
    ) -> Self {
        let volume_flags = if config.play_sound_on_volume_change {
            FLAG_PLAY_SOUND
        } else {
            0
        };

        Self {
            settings,
            audio,
            volume_stream: config.volume_stream,
            volume_flags,
        }
    }

    /// Raw stored screen mode
    pub fn screen_mode(&self) -> Result<i32, PlatformError> {
        self.settings.get_int(SCREEN_MODE_KEY.to_string())
    }

    pub fn set_screen_mode(&self, mode: ScreenMode) {
        self.settings
            .put_int(SCREEN_MODE_KEY.to_string(), mode.as_raw());
    }

    pub fn brightness(&self) -> Result<f32, PlatformError> {
        let stored = self.settings.get_int(BRIGHTNESS_KEY.to_string())?;
        Ok(storage_to_brightness(stored))
    }

    pub fn set_brightness(&self, value: f32) {
        self.settings
            .put_int(BRIGHTNESS_KEY.to_string(), brightness_to_storage(value));
    }

    /// Live normalized volume of the configured stream
    pub fn volume(&self) -> f32 {
        let current = self.audio.stream_volume(self.volume_stream);
        let max = self.audio.stream_max_volume(self.volume_stream);
        index_to_volume(current, max)
    }

    /// Writes the volume. Callers own echo suppression around this call.
    pub fn set_volume(&self, value: f32) {
        let max = self.audio.stream_max_volume(self.volume_stream);
        self.audio.set_stream_volume(
            self.volume_stream,
            volume_to_index(value, max),
            self.volume_flags,
        );
    }

    /// Normalized value of a stored setting.
    ///
    /// Screen mode reads back as its raw code. Radio categories have no
    /// stored value here and report `NotFound`.
    pub fn get(&self, category: SettingCategory) -> Result<f32, PlatformError> {
        match category {
            SettingCategory::ScreenMode => self.screen_mode().map(|raw| raw as f32),
            SettingCategory::Brightness => self.brightness(),
            SettingCategory::Volume => Ok(self.volume()),
            other => Err(PlatformError::NotFound {
                key: other.to_string(),
            }),
        }
    }

    /// Write a normalized value. Writes to radio categories are ignored.
    pub fn set(&self, category: SettingCategory, value: f32) {
        match category {
            SettingCategory::ScreenMode => {
                self.set_screen_mode(ScreenMode::from_raw(value as i32))
            }
            SettingCategory::Brightness => self.set_brightness(value),
            SettingCategory::Volume => self.set_volume(value),
            other => warn!("{} is not a stored setting, write ignored", other),
        }
    }
}
