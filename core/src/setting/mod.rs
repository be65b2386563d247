//! Setting categories and the stateless accessor that converts between the
//! normalized values the host sees and the platform's storage units.

pub mod accessor;

pub use accessor::{
    SettingAccessor, BRIGHTNESS_KEY, BRIGHTNESS_LEVELS, FLAG_PLAY_SOUND, SCREEN_MODE_KEY,
};

use serde::{Deserialize, Serialize};

/// The six settings domains the bridge exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
pub enum SettingCategory {
    ScreenMode,
    Brightness,
    Volume,
    Wifi,
    Bluetooth,
    Location,
}

impl std::fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScreenMode => write!(f, "ScreenMode"),
            Self::Brightness => write!(f, "Brightness"),
            Self::Volume => write!(f, "Volume"),
            Self::Wifi => write!(f, "Wifi"),
            Self::Bluetooth => write!(f, "Bluetooth"),
            Self::Location => write!(f, "Location"),
        }
    }
}

/// Screen brightness mode as stored by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
pub enum ScreenMode {
    /// Brightness follows the stored brightness value
    Manual,
    /// Brightness follows the ambient light sensor
    Automatic,
}

impl ScreenMode {
    pub const MANUAL_RAW: i32 = 0;
    pub const AUTOMATIC_RAW: i32 = 1;

    /// Anything that is not the manual code is treated as automatic.
    pub fn from_raw(raw: i32) -> Self {
        if raw == Self::MANUAL_RAW {
            Self::Manual
        } else {
            Self::Automatic
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::Manual => Self::MANUAL_RAW,
            Self::Automatic => Self::AUTOMATIC_RAW,
        }
    }
}

/// Audio streams whose volume can be bridged
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum,
)]
pub enum AudioStream {
    VoiceCall,
    System,
    Ring,
    #[default]
    Music,
    Alarm,
    Notification,
}

impl AudioStream {
    /// Platform stream identifier
    pub fn as_raw(self) -> i32 {
        match self {
            Self::VoiceCall => 0,
            Self::System => 1,
            Self::Ring => 2,
            Self::Music => 3,
            Self::Alarm => 4,
            Self::Notification => 5,
        }
    }
}
