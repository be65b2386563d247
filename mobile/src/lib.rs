// system-setting-mobile — Native mobile bindings for iOS and Android
// This crate exports the SystemSetting module via UniFFI

pub use system_setting_core::*;
