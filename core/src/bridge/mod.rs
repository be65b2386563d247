//! Notification and callback bridging between the platform and the host
//!
//! - `listener`: lazy platform subscriptions turned into host events
//! - `pending`: request-code correlation for launched settings panels
//! - `events`: the events and the emitter seam
//! - `facade`: the `SystemSetting` module composing the above

pub mod events;
pub mod facade;
pub mod listener;
pub mod pending;

pub use events::{BroadcastEmitter, EventEmitter, EventPayload, SystemEvent};
pub use facade::{SystemSetting, MODULE_NAME};
pub use listener::{ChangeListenerRegistry, ListenCategory};
pub use pending::{PendingActionTable, PendingToggle, RequestCode};
