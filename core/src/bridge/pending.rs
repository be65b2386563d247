//! Pending toggle table
//!
//! Correlates a launched settings panel with the result the host reports
//! later. Entries are keyed by the category's request code and consumed
//! exactly once. A panel that never reports back leaves its entry in place
//! until the next toggle of that category overwrites it or the table is
//! cleared on teardown.

use crate::setting::SettingCategory;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Correlation token shared with the platform's activity-result mechanism
pub type RequestCode = i32;

/// A toggle flow that has been launched but has not reported back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub request_code: RequestCode,
    pub category: SettingCategory,
    pub completion_event: String,
    /// Unix milliseconds at registration
    pub created_at_ms: u64,
}

impl PendingToggle {
    /// How long the flow has been outstanding
    pub fn age_ms(&self) -> u64 {
        now_ms().saturating_sub(self.created_at_ms)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Default)]
pub struct PendingActionTable {
    entries: Mutex<HashMap<RequestCode, PendingToggle>>,
}

impl PendingActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a launched flow. A flow still pending under the same request
    /// code is replaced.
    pub fn register(
        &self,
        request_code: RequestCode,
        category: SettingCategory,
        completion_event: impl Into<String>,
    ) -> RequestCode {
        let toggle = PendingToggle {
            request_code,
            category,
            completion_event: completion_event.into(),
            created_at_ms: now_ms(),
        };

        if let Some(previous) = self.entries.lock().insert(request_code, toggle) {
            warn!(
                "{} toggle still pending after {} ms, replaced by a new request",
                previous.category,
                previous.age_ms()
            );
        }
        request_code
    }

    /// Remove and return the entry for `request_code`, if any
    pub fn resolve(&self, request_code: RequestCode) -> Option<PendingToggle> {
        self.entries.lock().remove(&request_code)
    }

    pub fn pending(&self, category: SettingCategory) -> Option<PendingToggle> {
        self.entries
            .lock()
            .values()
            .find(|t| t.category == category)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every pending entry; returns how many were abandoned
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock();
        let abandoned = entries.len();
        entries.clear();
        abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_resolve_consumes_once() {
        let table = PendingActionTable::new();
        let code = table.register(0, SettingCategory::Wifi, "EventWifiChange");

        let entry = table.resolve(code).unwrap();
        assert_eq!(entry.category, SettingCategory::Wifi);
        assert_eq!(entry.completion_event, "EventWifiChange");
        assert!(table.resolve(code).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_code_is_none() {
        let table = PendingActionTable::new();
        table.register(1, SettingCategory::Bluetooth, "EventBluetoothChange");
        assert!(table.resolve(42).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_second_register_overwrites() {
        let table = PendingActionTable::new();
        table.register(2, SettingCategory::Location, "first");
        table.register(2, SettingCategory::Location, "second");

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.pending(SettingCategory::Location).unwrap().completion_event,
            "second"
        );
    }

    #[test]
    fn test_clear_abandons_entries() {
        let table = PendingActionTable::new();
        table.register(0, SettingCategory::Wifi, "a");
        table.register(1, SettingCategory::Bluetooth, "b");
        assert_eq!(table.clear(), 2);
        assert!(table.pending(SettingCategory::Wifi).is_none());
    }

    #[test]
    fn test_concurrent_resolve_yields_single_winner() {
        let table = Arc::new(PendingActionTable::new());
        table.register(0, SettingCategory::Wifi, "EventWifiChange");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = table.clone();
                std::thread::spawn(move || table.resolve(0).is_some())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
