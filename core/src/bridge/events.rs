//! Events pushed to the host application
//!
//! `EventVolume` carries `{ "value": <0.0..=1.0> }`; every other event is
//! emitted without a payload.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Default capacity of a [`BroadcastEmitter`] channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct EventPayload {
    pub value: f32,
}

/// A named event on its way to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, uniffi::Record)]
pub struct SystemEvent {
    pub name: String,
    pub payload: Option<EventPayload>,
}

impl SystemEvent {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: f32) -> Self {
        Self {
            name: name.into(),
            payload: Some(EventPayload { value }),
        }
    }

    /// Payload as the JSON object the host's event channel expects
    pub fn payload_json(&self) -> Option<String> {
        self.payload
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok())
    }
}

/// Named event channel into the host application
#[uniffi::export(with_foreign)]
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: SystemEvent);
}

/// Rust-side emitter fanning events out over a tokio broadcast channel
pub struct BroadcastEmitter {
    tx: broadcast::Sender<SystemEvent>,
}

impl BroadcastEmitter {
    pub fn new() -> Arc<Self> {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(capacity);
        Arc::new(Self { tx })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SystemEvent> {
        self.tx.subscribe()
    }
}

impl EventEmitter for BroadcastEmitter {
    fn emit(&self, event: SystemEvent) {
        if let Err(broadcast::error::SendError(event)) = self.tx.send(event) {
            debug!("No listeners for {}, event dropped", event.name);
        }
    }
}
