//! Error types surfaced to the host application and returned by platform seams.

use crate::setting::SettingCategory;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection code the host layer receives for every failed getter.
pub const REJECT_CODE: &str = "-1";

// ============================================================================
// PLATFORM ERRORS
// ============================================================================

/// Failures reported by a platform implementation
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Error)]
pub enum PlatformError {
    /// The setting was never written and the platform has no default for it
    #[error("Setting not found: {key}")]
    NotFound { key: String },

    #[error("Unexpected platform failure: {reason}")]
    Unexpected { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for PlatformError {
    fn from(err: uniffi::UnexpectedUniFFICallbackError) -> Self {
        PlatformError::Unexpected { reason: err.reason }
    }
}

// ============================================================================
// BRIDGE ERRORS
// ============================================================================

/// Platform services whose handle may be missing at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
pub enum ServiceKind {
    Wifi,
    Location,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wifi => write!(f, "wifi"),
            Self::Location => write!(f, "location"),
        }
    }
}

/// Errors returned by the system-setting bridge
///
/// Getter failures carry the human readable message the host shows next to
/// [`REJECT_CODE`]; there is no structured detail beyond that.
#[derive(Debug, Error, Clone, PartialEq, Eq, uniffi::Error)]
pub enum SystemSettingError {
    #[error("{message}")]
    SettingNotFound { key: String, message: String },

    /// The platform callback itself failed while reading a setting
    #[error("{message}")]
    PlatformFailure { reason: String, message: String },

    #[error("{message}")]
    ServiceUnavailable { service: ServiceKind, message: String },

    #[error("No foreground activity to launch {action}")]
    NoForegroundContext { action: String },

    #[error("{category} has no settings panel to toggle")]
    NotToggleable { category: SettingCategory },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl SystemSettingError {
    /// Code the host application rejects its promise with
    pub fn code(&self) -> &'static str {
        REJECT_CODE
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Map a failed setting read to the operation's host-facing error
    pub(crate) fn read_failed(err: PlatformError, message: &str) -> Self {
        let message = message.to_string();
        match err {
            PlatformError::NotFound { key } => Self::SettingNotFound { key, message },
            PlatformError::Unexpected { reason } => Self::PlatformFailure { reason, message },
        }
    }

    pub(crate) fn service_unavailable(service: ServiceKind) -> Self {
        Self::ServiceUnavailable {
            service,
            message: format!("get {} manager fail", service),
        }
    }
}
