//! Typed change listeners
//!
//! An emitter owns a [`ListenerList`]; interested parties register a callback
//! and keep the returned [`Subscription`]. Dropping the subscription removes
//! the callback. Callbacks run synchronously inside [`ListenerList::emit`], in
//! registration order.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Slots<E> {
    next_id: u64,
    callbacks: Vec<(u64, Callback<E>)>,
}

/// A list of callbacks interested in events of type `E`
pub struct ListenerList<E: 'static> {
    slots: Rc<RefCell<Slots<E>>>,
}

impl<E: 'static> Default for ListenerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> ListenerList<E> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }

    /// Register a callback. It stays registered for as long as the returned
    /// subscription is alive.
    #[must_use = "dropping the subscription unregisters the callback"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let mut slots = self.slots.borrow_mut();
        let id = slots.next_id;
        slots.next_id += 1;
        let callback: Callback<E> = Rc::new(RefCell::new(callback));
        slots.callbacks.push((id, callback));

        let weak: Weak<RefCell<Slots<E>>> = Rc::downgrade(&self.slots);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    slots.borrow_mut().callbacks.retain(|(slot_id, _)| *slot_id != id);
                }
            })),
        }
    }

    /// Call every registered callback with `event`.
    ///
    /// Callbacks may subscribe or unsubscribe while the event is delivered;
    /// a callback removed during delivery is not called afterwards. A callback
    /// that triggers a nested emit of the same list is skipped for the nested
    /// event.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<(u64, Callback<E>)> = self.slots.borrow().callbacks.clone();

        for (id, callback) in snapshot {
            let still_registered = self
                .slots
                .borrow()
                .callbacks
                .iter()
                .any(|(slot_id, _)| *slot_id == id);

            if !still_registered {
                continue;
            }

            if let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)(event);
            }
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.slots.borrow().callbacks.len()
    }

    /// Whether nobody is listening
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a callback registered; unregisters it when dropped
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unregister now
    pub fn cancel(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
