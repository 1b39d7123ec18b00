//! Event infrastructure for the planner core.
//!
//! Provides `PlannerEvent` for hosts that need to refresh their view and
//! `EventBus` for subscriptions. Platform-specific implementations handle
//! thread safety:
//! - Native: `Arc<EventBus>` with `RwLock`
//! - WASM: `Rc<EventBus>` with `RefCell` for the single-threaded browser

use serde::Serialize;

use crate::sync::PullReason;

/// Events emitted by the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlannerEvent {
    /// A pull finished; `applied` tells whether local data was replaced.
    #[serde(rename_all = "camelCase")]
    PullCompleted {
        applied: bool,
        reason: PullReason,
        /// Remote `meta.updatedAt` in milliseconds since Unix epoch.
        remote_updated: i64,
        /// Local `meta.updatedAt` in milliseconds since Unix epoch.
        local_updated: i64,
        timestamp: f64,
    },
    /// The local document was written to the remote.
    PushCompleted { timestamp: f64 },
    /// A pull or push failed. Local data is untouched.
    SyncFailed {
        /// "pull" or "push".
        operation: String,
        message: String,
        timestamp: f64,
    },
}

// ============================================================================
// Native (multi-threaded) implementation
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod platform {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock, Weak};

    /// Shared handle to an event bus.
    pub type SharedEventBus = Arc<EventBus>;

    /// Subscription handle that unsubscribes automatically when dropped.
    pub struct Subscription {
        bus: Weak<EventBus>,
        id: usize,
    }

    impl Drop for Subscription {
        fn drop(&mut self) {
            if let Some(bus) = self.bus.upgrade() {
                bus.unsubscribe(self.id);
            }
        }
    }

    type Callback = Arc<dyn Fn(PlannerEvent) + Send + Sync>;

    /// Event bus for publishing planner events. Wrap in `Arc` to subscribe.
    #[derive(Default)]
    pub struct EventBus {
        callbacks: RwLock<Vec<(usize, Callback)>>,
        next_id: AtomicUsize,
    }

    impl EventBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn shared() -> SharedEventBus {
            Arc::new(Self::new())
        }

        /// Subscribe to events. Returns `Subscription` that unsubscribes on drop.
        pub fn subscribe(
            self: &Arc<Self>,
            callback: impl Fn(PlannerEvent) + Send + Sync + 'static,
        ) -> Subscription {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            self.callbacks
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .push((id, Arc::new(callback)));
            Subscription {
                bus: Arc::downgrade(self),
                id,
            }
        }

        fn unsubscribe(&self, id: usize) {
            // try_write: Drop may run while emit holds the read lock
            if let Ok(mut guard) = self.callbacks.try_write() {
                guard.retain(|(i, _)| *i != id);
            }
        }

        /// Emit an event to all subscribers.
        pub fn emit(&self, event: PlannerEvent) {
            // Snapshot so a callback may subscribe without deadlocking
            let callbacks: Vec<_> = self
                .callbacks
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .map(|(_, cb)| Arc::clone(cb))
                .collect();

            for callback in callbacks {
                callback(event.clone());
            }
        }
    }
}

// ============================================================================
// WASM (single-threaded) implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
mod platform {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};

    /// Shared handle to an event bus.
    pub type SharedEventBus = Rc<EventBus>;

    /// Subscription handle that unsubscribes automatically when dropped.
    pub struct Subscription {
        bus: Weak<EventBus>,
        id: usize,
    }

    impl Drop for Subscription {
        fn drop(&mut self) {
            if let Some(bus) = self.bus.upgrade() {
                bus.unsubscribe(self.id);
            }
        }
    }

    type Callback = Rc<dyn Fn(PlannerEvent)>;

    /// Event bus for publishing planner events. Wrap in `Rc` to subscribe.
    #[derive(Default)]
    pub struct EventBus {
        callbacks: RefCell<Vec<(usize, Callback)>>,
        next_id: Cell<usize>,
    }

    impl EventBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn shared() -> SharedEventBus {
            Rc::new(Self::new())
        }

        /// Subscribe to events. Returns `Subscription` that unsubscribes on drop.
        pub fn subscribe(
            self: &Rc<Self>,
            callback: impl Fn(PlannerEvent) + 'static,
        ) -> Subscription {
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            self.callbacks.borrow_mut().push((id, Rc::new(callback)));
            Subscription {
                bus: Rc::downgrade(self),
                id,
            }
        }

        fn unsubscribe(&self, id: usize) {
            if let Ok(mut callbacks) = self.callbacks.try_borrow_mut() {
                callbacks.retain(|(i, _)| *i != id);
            }
        }

        /// Emit an event to all subscribers.
        pub fn emit(&self, event: PlannerEvent) {
            let callbacks: Vec<_> = self
                .callbacks
                .borrow()
                .iter()
                .map(|(_, cb)| Rc::clone(cb))
                .collect();

            for callback in callbacks {
                callback(event.clone());
            }
        }
    }
}

pub use platform::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    use std::sync::{Arc, Mutex};

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_subscriber_receives_events_until_dropped() {
        let bus = EventBus::shared();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let sub = bus.subscribe(move |event| sink.lock().unwrap().push(event));
        bus.emit(PlannerEvent::PushCompleted { timestamp: 1.0 });

        drop(sub);
        bus.emit(PlannerEvent::PushCompleted { timestamp: 2.0 });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![PlannerEvent::PushCompleted { timestamp: 1.0 }]
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_callback_may_subscribe_during_emit() {
        let bus = EventBus::shared();
        let inner_bus = Arc::clone(&bus);
        let extra = Arc::new(Mutex::new(Vec::new()));
        let extra_sink = Arc::clone(&extra);

        let _sub = bus.subscribe(move |_| {
            let sub = inner_bus.subscribe(|_| {});
            extra_sink.lock().unwrap().push(sub);
        });
        bus.emit(PlannerEvent::PushCompleted { timestamp: 0.0 });

        assert_eq!(extra.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_pull_event_serialization() {
        let event = PlannerEvent::PullCompleted {
            applied: false,
            reason: PullReason::LocalNewer,
            remote_updated: 1,
            local_updated: 2,
            timestamp: 3.0,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"pullCompleted\""));
        assert!(json.contains("\"reason\":\"local-newer\""));
        assert!(json.contains("\"remoteUpdated\":1"));
        assert!(json.contains("\"localUpdated\":2"));
    }
}
