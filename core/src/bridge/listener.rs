//! Change listener registry
//!
//! Subscribes to platform change notifications lazily, at most once per
//! category, and turns the relevant ones into host events:
//! - volume: every notification re-reads the live volume and emits `EventVolume { value }`
//! - Wi-Fi: only settled radio states (enabled/disabled) emit `EventWifiChange`
//!
//! Each subscription carries a generation number. A delivery addressed to a
//! generation that is no longer active (late delivery after an unregister)
//! is dropped, which keeps suppressed writes from leaking their own echo.

use crate::bridge::events::{EventEmitter, SystemEvent};
use crate::config::{BridgeConfig, NotificationFilters};
use crate::platform::{NotificationHub, NotificationReceiver, PlatformNotification, WifiState};
use crate::setting::SettingAccessor;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// No subscription is active for a slot
const INACTIVE: u64 = 0;

/// Categories whose platform changes can be watched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
pub enum ListenCategory {
    Volume,
    Wifi,
}

impl std::fmt::Display for ListenCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Volume => write!(f, "Volume"),
            Self::Wifi => write!(f, "Wifi"),
        }
    }
}

/// One lazily created subscription.
///
/// `active` is the fast-path check; `registration` is the single-writer guard
/// under which the platform registration is created or torn down.
struct SubscriptionSlot {
    active: AtomicU64,
    registration: Mutex<Option<u64>>,
}

impl SubscriptionSlot {
    fn new() -> Self {
        Self {
            active: AtomicU64::new(INACTIVE),
            registration: Mutex::new(None),
        }
    }
}

struct RegistryInner {
    hub: Arc<dyn NotificationHub>,
    accessor: Arc<SettingAccessor>,
    emitter: Arc<dyn EventEmitter>,
    filters: NotificationFilters,
    volume_event: String,
    wifi_event: String,
    volume: SubscriptionSlot,
    wifi: SubscriptionSlot,
    generations: AtomicU64,
    teardowns: AtomicU64,
}

impl RegistryInner {
    fn slot(&self, category: ListenCategory) -> &SubscriptionSlot {
        match category {
            ListenCategory::Volume => &self.volume,
            ListenCategory::Wifi => &self.wifi,
        }
    }

    fn actions(&self, category: ListenCategory) -> Vec<String> {
        match category {
            ListenCategory::Volume => self.filters.volume.clone(),
            ListenCategory::Wifi => self.filters.wifi.clone(),
        }
    }

    fn filter(
        &self,
        category: ListenCategory,
        notification: &PlatformNotification,
    ) -> Option<SystemEvent> {
        match category {
            ListenCategory::Volume => Some(SystemEvent::with_value(
                self.volume_event.clone(),
                self.accessor.volume(),
            )),
            ListenCategory::Wifi => {
                if notification.action != self.filters.wifi_state_action {
                    return None;
                }
                let state = WifiState::from_raw(notification.state?);
                if state.is_terminal() {
                    Some(SystemEvent::bare(self.wifi_event.clone()))
                } else {
                    debug!("Wifi state {:?} is transient, not forwarded", state);
                    None
                }
            }
        }
    }
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        for slot in [&mut self.volume, &mut self.wifi] {
            if let Some(id) = slot.registration.get_mut().take() {
                self.hub.unregister_receiver(id);
            }
        }
    }
}

/// Receiver handed to the platform for one subscription generation
struct CategoryReceiver {
    category: ListenCategory,
    generation: u64,
    registry: Weak<RegistryInner>,
}

impl NotificationReceiver for CategoryReceiver {
    fn on_receive(&self, notification: PlatformNotification) {
        let Some(inner) = self.registry.upgrade() else {
            return;
        };

        if inner.slot(self.category).active.load(Ordering::Acquire) != self.generation {
            debug!(
                "Dropping {} delivery for retired subscription {}",
                notification.action, self.generation
            );
            return;
        }

        if let Some(event) = inner.filter(self.category, &notification) {
            inner.emitter.emit(event);
        }
    }
}

/// Lazily created, idempotent platform subscriptions per [`ListenCategory`]
pub struct ChangeListenerRegistry {
    inner: Arc<RegistryInner>,
}

impl ChangeListenerRegistry {
    pub fn new(
        hub: Arc<dyn NotificationHub>,
        accessor: Arc<SettingAccessor>,
        emitter: Arc<dyn EventEmitter>,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                hub,
                accessor,
                emitter,
                filters: config.filters.clone(),
                volume_event: config.volume_event.clone(),
                wifi_event: config.wifi_change_event.clone(),
                volume: SubscriptionSlot::new(),
                wifi: SubscriptionSlot::new(),
                generations: AtomicU64::new(INACTIVE),
                teardowns: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribe to `category` unless a subscription is already active.
    ///
    /// Returns `true` when this call created the subscription. Concurrent
    /// callers race on the slot guard; exactly one of them claims the slot
    /// and registers. The guard is released while the platform registers, so
    /// a sticky delivery may call back into the registry on this thread.
    pub fn ensure_subscribed(&self, category: ListenCategory) -> bool {
        let slot = self.inner.slot(category);
        if slot.active.load(Ordering::Acquire) != INACTIVE {
            return false;
        }

        let generation = {
            let _registration = slot.registration.lock();
            if slot.active.load(Ordering::Acquire) != INACTIVE {
                return false;
            }
            let generation = self.inner.generations.fetch_add(1, Ordering::SeqCst) + 1;
            // Published before registering so a platform that delivers sticky
            // notifications during registration reaches a live generation.
            slot.active.store(generation, Ordering::Release);
            generation
        };

        let receiver = Arc::new(CategoryReceiver {
            category,
            generation,
            registry: Arc::downgrade(&self.inner),
        });
        let id = self
            .inner
            .hub
            .register_receiver(self.inner.actions(category), receiver);

        let mut registration = slot.registration.lock();
        if slot.active.load(Ordering::Acquire) != generation {
            drop(registration);
            // Retired while the platform was registering it
            self.inner.hub.unregister_receiver(id);
            debug!(
                "{} subscription {} retired during registration",
                category, generation
            );
            return true;
        }
        *registration = Some(id);
        drop(registration);

        info!("Subscribed to {} changes (generation {})", category, generation);
        true
    }

    /// Tear down the subscription for `category`. Returns whether one was
    /// active, including one still being registered.
    pub fn unsubscribe(&self, category: ListenCategory) -> bool {
        let slot = self.inner.slot(category);
        let (was_active, id) = {
            let mut registration = slot.registration.lock();
            let previous = slot.active.swap(INACTIVE, Ordering::AcqRel);
            (previous != INACTIVE, registration.take())
        };

        if let Some(id) = id {
            self.inner.hub.unregister_receiver(id);
        }
        if was_active {
            debug!("Unsubscribed from {} changes", category);
        }
        was_active
    }

    pub fn is_subscribed(&self, category: ListenCategory) -> bool {
        self.inner.slot(category).active.load(Ordering::Acquire) != INACTIVE
    }

    /// Run `write` with the `category` subscription removed, restoring it
    /// afterwards if it was active before.
    ///
    /// A [`teardown`](Self::teardown) that lands while `write` runs, on any
    /// thread, wins: the subscription stays down.
    pub fn with_suppressed<R>(&self, category: ListenCategory, write: impl FnOnce() -> R) -> R {
        let epoch = self.inner.teardowns.load(Ordering::Acquire);
        let was_subscribed = self.unsubscribe(category);
        let result = write();
        if was_subscribed && self.inner.teardowns.load(Ordering::Acquire) == epoch {
            self.ensure_subscribed(category);
            if self.inner.teardowns.load(Ordering::Acquire) != epoch {
                self.unsubscribe(category);
            }
        }
        result
    }

    /// Decide whether a raw notification becomes a host event
    pub fn filter(
        &self,
        category: ListenCategory,
        notification: &PlatformNotification,
    ) -> Option<SystemEvent> {
        self.inner.filter(category, notification)
    }

    /// Unregister every subscription. Suppressed writes in flight do not
    /// restore theirs afterwards.
    pub fn teardown(&self) {
        self.inner.teardowns.fetch_add(1, Ordering::AcqRel);
        for category in [ListenCategory::Volume, ListenCategory::Wifi] {
            self.unsubscribe(category);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::events::BroadcastEmitter;
    use crate::config::{EVENT_VOLUME, EVENT_WIFI_CHANGE};
    use crate::platform::{actions, AudioService, SimulatedPlatform};
    use crate::setting::AudioStream;
    use tokio::sync::broadcast::Receiver;

    fn registry() -> (
        Arc<SimulatedPlatform>,
        ChangeListenerRegistry,
        Receiver<SystemEvent>,
    ) {
        let device = SimulatedPlatform::new();
        let config = BridgeConfig::default();
        let accessor = Arc::new(SettingAccessor::new(device.clone(), device.clone(), &config));
        let emitter = BroadcastEmitter::new();
        let events = emitter.subscribe();
        let registry = ChangeListenerRegistry::new(device.clone(), accessor, emitter, &config);
        (device, registry, events)
    }

    #[test]
    fn test_ensure_subscribed_is_idempotent() {
        let (device, registry, _events) = registry();
        assert!(registry.ensure_subscribed(ListenCategory::Volume));
        assert!(!registry.ensure_subscribed(ListenCategory::Volume));
        assert!(!registry.ensure_subscribed(ListenCategory::Volume));
        assert_eq!(device.registrations_made(), 1);
        assert!(registry.is_subscribed(ListenCategory::Volume));
        assert!(!registry.is_subscribed(ListenCategory::Wifi));
    }

    #[test]
    fn test_volume_notification_carries_live_level() {
        let (device, registry, mut events) = registry();
        registry.ensure_subscribed(ListenCategory::Volume);

        device.press_volume_key(AudioStream::Music, 3);

        let event = events.try_recv().unwrap();
        assert_eq!(event.name, EVENT_VOLUME);
        let value = event.payload.unwrap().value;
        assert!((value - 3.0 / 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_wifi_filter_only_passes_settled_states() {
        let (_device, registry, _events) = registry();
        let category = ListenCategory::Wifi;

        for transient in [WifiState::Enabling, WifiState::Disabling, WifiState::Unknown] {
            let n = PlatformNotification::with_state(actions::WIFI_STATE_CHANGED, transient.as_raw());
            assert!(registry.filter(category, &n).is_none());
        }
        for settled in [WifiState::Enabled, WifiState::Disabled] {
            let n = PlatformNotification::with_state(actions::WIFI_STATE_CHANGED, settled.as_raw());
            let event = registry.filter(category, &n).unwrap();
            assert_eq!(event.name, EVENT_WIFI_CHANGE);
            assert!(event.payload.is_none());
        }

        let missing_state = PlatformNotification::new(actions::WIFI_STATE_CHANGED);
        assert!(registry.filter(category, &missing_state).is_none());

        let other_action = PlatformNotification::with_state(actions::CONNECTIVITY_CHANGED, 3);
        assert!(registry.filter(category, &other_action).is_none());
    }

    #[test]
    fn test_suppressed_write_produces_no_echo() {
        let (device, registry, mut events) = registry();
        registry.ensure_subscribed(ListenCategory::Volume);

        registry.with_suppressed(ListenCategory::Volume, || {
            device.set_stream_volume(AudioStream::Music, 9, 0);
        });

        assert!(events.try_recv().is_err());
        assert!(registry.is_subscribed(ListenCategory::Volume));

        device.press_volume_key(AudioStream::Music, 2);
        assert_eq!(events.try_recv().unwrap().name, EVENT_VOLUME);
    }

    #[test]
    fn test_suppression_does_not_subscribe_when_idle() {
        let (device, registry, _events) = registry();
        registry.with_suppressed(ListenCategory::Volume, || {
            device.set_stream_volume(AudioStream::Music, 1, 0);
        });
        assert!(!registry.is_subscribed(ListenCategory::Volume));
        assert_eq!(device.registrations_made(), 0);
    }

    #[test]
    fn test_retired_receiver_drops_late_delivery() {
        let (device, registry, mut events) = registry();
        registry.ensure_subscribed(ListenCategory::Volume);
        registry.unsubscribe(ListenCategory::Volume);

        // Stands in for a delivery already in flight when the unregister happened
        let stale = CategoryReceiver {
            category: ListenCategory::Volume,
            generation: 1,
            registry: Arc::downgrade(&registry.inner),
        };
        stale.on_receive(PlatformNotification::new(actions::VOLUME_CHANGED));
        assert!(events.try_recv().is_err());

        registry.ensure_subscribed(ListenCategory::Volume);
        stale.on_receive(PlatformNotification::new(actions::VOLUME_CHANGED));
        assert!(events.try_recv().is_err());

        device.press_volume_key(AudioStream::Music, 1);
        assert!(events.try_recv().is_ok());
    }

    #[test]
    fn test_teardown_during_suppressed_write_is_not_undone() {
        let (device, registry, _events) = registry();
        registry.ensure_subscribed(ListenCategory::Volume);

        registry.with_suppressed(ListenCategory::Volume, || {
            device.set_stream_volume(AudioStream::Music, 4, 0);
            registry.teardown();
        });

        assert!(!registry.is_subscribed(ListenCategory::Volume));
        assert_eq!(device.active_receivers(), 0);
        assert_eq!(device.registrations_made(), 1);
    }

    #[test]
    fn test_unsubscribe_reports_whether_active() {
        let (_device, registry, _events) = registry();
        assert!(!registry.unsubscribe(ListenCategory::Wifi));
        registry.ensure_subscribed(ListenCategory::Wifi);
        assert!(registry.unsubscribe(ListenCategory::Wifi));
        assert!(!registry.unsubscribe(ListenCategory::Wifi));
    }

    #[test]
    fn test_teardown_unregisters_everything() {
        let (device, registry, _events) = registry();
        registry.ensure_subscribed(ListenCategory::Volume);
        registry.ensure_subscribed(ListenCategory::Wifi);
        assert_eq!(device.active_receivers(), 2);

        registry.teardown();
        assert_eq!(device.active_receivers(), 0);
        assert!(!registry.is_subscribed(ListenCategory::Volume));
        assert!(!registry.is_subscribed(ListenCategory::Wifi));
    }

    #[test]
    fn test_drop_releases_platform_registrations() {
        let (device, registry, _events) = registry();
        registry.ensure_subscribed(ListenCategory::Wifi);
        drop(registry);
        assert_eq!(device.active_receivers(), 0);
    }

    #[test]
    fn test_concurrent_first_access_registers_once() {
        let (device, registry, _events) = registry();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.ensure_subscribed(ListenCategory::Wifi))
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();

        assert_eq!(created, 1);
        assert_eq!(device.registrations_made(), 1);
    }
}
