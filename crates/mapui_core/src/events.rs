//! Named-event subscription hub
//!
//! An [`EventHub`] maps a *set* of event kinds to a handler. Subscribing with
//! several kinds at once replaces string keys like `"zooming rotate pitch"`
//! with an explicit list, so emission never parses anything.
//!
//! # Example
//!
//! ```rust
//! use mapui_core::events::EventHub;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Kind { Zooming, Rotate, ZoomEnd }
//!
//! let hub = EventHub::new();
//! let hits = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&hits);
//! let key = hub.on(&[Kind::Zooming, Kind::Rotate], move |_| counter.set(counter.get() + 1));
//!
//! hub.emit(Kind::Rotate);
//! hub.emit(Kind::ZoomEnd);
//! assert_eq!(hits.get(), 1);
//!
//! hub.off(key);
//! hub.emit(Kind::Zooming);
//! assert_eq!(hits.get(), 1);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Handle to a registered listener, used to unsubscribe
    pub struct ListenerKey;
}

/// Marker for types usable as event kinds
pub trait EventKind: Copy + Eq + Hash + fmt::Debug + 'static {}

impl<T: Copy + Eq + Hash + fmt::Debug + 'static> EventKind for T {}

/// Shared event handler; receives the kind that fired
pub type EventHandler<K> = Rc<dyn Fn(K)>;

struct Listener<K: EventKind> {
    kinds: SmallVec<[K; 4]>,
    handler: EventHandler<K>,
}

/// Single-threaded subscription hub keyed by event kind
pub struct EventHub<K: EventKind> {
    listeners: RefCell<SlotMap<ListenerKey, Listener<K>>>,
}

impl<K: EventKind> Default for EventHub<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EventKind> fmt::Debug for EventHub<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.len())
            .finish()
    }
}

impl<K: EventKind> EventHub<K> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(SlotMap::with_key()),
        }
    }

    /// Subscribe `handler` to every kind in `kinds`
    pub fn on<F>(&self, kinds: &[K], handler: F) -> ListenerKey
    where
        F: Fn(K) + 'static,
    {
        self.on_shared(kinds, Rc::new(handler))
    }

    /// Subscribe an already shared handler
    pub fn on_shared(&self, kinds: &[K], handler: EventHandler<K>) -> ListenerKey {
        self.listeners.borrow_mut().insert(Listener {
            kinds: SmallVec::from_slice(kinds),
            handler,
        })
    }

    /// Unsubscribe a listener. Returns false if it was not registered.
    pub fn off(&self, key: ListenerKey) -> bool {
        self.listeners.borrow_mut().remove(key).is_some()
    }

    /// Check whether `key` is still subscribed
    pub fn is_subscribed(&self, key: ListenerKey) -> bool {
        self.listeners.borrow().contains_key(key)
    }

    /// Check whether anyone listens for `kind`
    pub fn listens(&self, kind: K) -> bool {
        self.listeners
            .borrow()
            .values()
            .any(|l| l.kinds.contains(&kind))
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Invoke every handler subscribed to `kind`
    ///
    /// Handlers may subscribe or unsubscribe while the event is being
    /// delivered. A listener removed by an earlier handler is skipped.
    /// Returns the number of handlers invoked.
    pub fn emit(&self, kind: K) -> usize {
        let targets: SmallVec<[(ListenerKey, EventHandler<K>); 8]> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, l)| l.kinds.contains(&kind))
            .map(|(key, l)| (key, Rc::clone(&l.handler)))
            .collect();

        let mut invoked = 0;
        for (key, handler) in targets {
            if !self.is_subscribed(key) {
                continue;
            }
            handler(kind);
            invoked += 1;
        }
        invoked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Kind {
        A,
        B,
        C,
    }

    #[test]
    fn test_emit_matches_kinds() {
        let hub = EventHub::new();
        let seen: Rc<RefCell<Vec<Kind>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        hub.on(&[Kind::A, Kind::B], move |k| seen_clone.borrow_mut().push(k));

        assert_eq!(hub.emit(Kind::A), 1);
        assert_eq!(hub.emit(Kind::C), 0);
        assert_eq!(hub.emit(Kind::B), 1);
        assert_eq!(*seen.borrow(), vec![Kind::A, Kind::B]);
        assert!(hub.listens(Kind::A));
        assert!(!hub.listens(Kind::C));
    }

    #[test]
    fn test_off_and_is_subscribed() {
        let hub = EventHub::new();
        let key = hub.on(&[Kind::A], |_| {});
        assert!(hub.is_subscribed(key));
        assert!(hub.off(key));
        assert!(!hub.off(key));
        assert!(hub.is_empty());
    }

    #[test]
    fn test_handler_can_unsubscribe_others_during_emit() {
        let hub = Rc::new(EventHub::new());
        let second_hits = Rc::new(Cell::new(0));
        let victim: Rc<Cell<Option<ListenerKey>>> = Rc::new(Cell::new(None));

        let hub_clone = Rc::clone(&hub);
        let victim_clone = Rc::clone(&victim);
        hub.on(&[Kind::A], move |_| {
            if let Some(key) = victim_clone.get() {
                hub_clone.off(key);
            }
        });
        let hits = Rc::clone(&second_hits);
        let key = hub.on(&[Kind::A], move |_| hits.set(hits.get() + 1));
        victim.set(Some(key));

        assert_eq!(hub.emit(Kind::A), 1);
        assert_eq!(second_hits.get(), 0);
    }

    #[test]
    fn test_handler_can_subscribe_during_emit() {
        let hub = Rc::new(EventHub::new());
        let hub_clone = Rc::clone(&hub);
        hub.on(&[Kind::A], move |_| {
            hub_clone.on(&[Kind::A], |_| {});
        });

        // The listener added mid-emit only sees later events
        assert_eq!(hub.emit(Kind::A), 1);
        assert_eq!(hub.len(), 2);
    }
}
