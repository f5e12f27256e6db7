//! L3 Molecular Layer: Progress subscription and per-frame fan-out
//!
//! Subscribers are plain callbacks. Each broadcast walks a snapshot of the
//! registry, so a callback may subscribe or unsubscribe while it runs. A
//! callback that panics is logged and skipped; the rest still receive the
//! frame.

use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::warn;

use super::state::ProgressSnapshot;

type Callback = Rc<dyn Fn(&ProgressSnapshot)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Sorted by id, which is registration order
    entries: Vec<(u64, Callback)>,
}

impl Registry {
    fn insert(&mut self, callback: Callback) -> u64 {
        self.next_id += 1;
        self.entries.push((self.next_id, callback));
        self.next_id
    }

    fn remove(&mut self, id: u64) -> bool {
        match self.entries.binary_search_by_key(&id, |(entry_id, _)| *entry_id) {
            Ok(index) => {
                self.entries.remove(index);
                true
            }
            Err(_) => false,
        }
    }
}

/// Outcome of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Ordered set of progress subscribers
#[derive(Clone, Default)]
pub struct ScrollBus {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for ScrollBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl ScrollBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it runs every frame until the returned
    /// handle is unsubscribed or dropped
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ProgressSnapshot) + 'static,
    {
        let id = self.registry.borrow_mut().insert(Rc::new(callback));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
            active: true.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every subscriber
    pub fn clear(&self) {
        self.registry.borrow_mut().entries.clear();
    }

    /// Invoke every subscriber in registration order
    pub fn broadcast(&self, snapshot: &ProgressSnapshot) -> BroadcastReport {
        let callbacks: Vec<(u64, Callback)> = self.registry.borrow().entries.clone();
        let mut report = BroadcastReport::default();

        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(snapshot))) {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    report.failed += 1;
                    warn!(
                        subscriber = id,
                        error = panic_message(payload.as_ref()),
                        "Scroll subscriber failed, continuing with remaining subscribers"
                    );
                }
            }
        }

        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Handle returned by [`ScrollBus::subscribe`]
///
/// Unsubscribing is idempotent. Dropping the handle unsubscribes too; call
/// [`Subscription::detach`] to keep the callback for the life of the bus.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
    active: std::cell::Cell<bool>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}

impl Subscription {
    /// Remove this callback; later calls do nothing
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
            && self
                .registry
                .upgrade()
                .is_some_and(|r| r.borrow().entries.iter().any(|(id, _)| *id == self.id))
    }

    /// Keep the callback registered without holding the handle
    pub fn detach(self) {
        self.active.set(false);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
