//! Collision queue
//!
//! Overlays with `collision` enabled register their buffered box here while
//! visible. The resolution algorithm belongs to the host: it is handed the
//! entries (heaviest first) and answers with per-overlay visibility, which
//! the map applies back through [`Overlay::set_collision_visible`].
//!
//! [`Overlay::set_collision_visible`]: crate::overlay::Overlay::set_collision_visible

use std::cell::{Cell, RefCell};
use std::fmt;

use indexmap::IndexMap;
use mapui_core::Rect;

use crate::overlay::{OverlayId, WeakOverlay};

/// A registered overlay box
#[derive(Clone, Debug)]
pub struct CollisionEntry {
    pub overlay_id: OverlayId,
    pub overlay: WeakOverlay,
    /// Overlay box grown by `collisionBufferSize`
    pub bbox: Rect,
    /// Priority, higher wins
    pub weight: f64,
    /// Fade in when revealed
    pub fade_in: bool,
}

/// Visibility decided by the resolver for one overlay
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionVerdict {
    pub overlay_id: OverlayId,
    pub visible: bool,
}

/// Collision resolution algorithm supplied by the host
pub trait CollisionResolver {
    /// Decide visibility for `entries`, given heaviest first
    fn resolve(&self, entries: &[CollisionEntry]) -> Vec<CollisionVerdict>;
}

impl<F> CollisionResolver for F
where
    F: Fn(&[CollisionEntry]) -> Vec<CollisionVerdict>,
{
    fn resolve(&self, entries: &[CollisionEntry]) -> Vec<CollisionVerdict> {
        self(entries)
    }
}

/// Registered collision participants of one map
#[derive(Default)]
pub struct CollisionQueue {
    entries: RefCell<IndexMap<OverlayId, CollisionEntry>>,
    revision: Cell<u64>,
}

impl fmt::Debug for CollisionQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionQueue")
            .field("entries", &self.len())
            .field("revision", &self.revision.get())
            .finish()
    }
}

impl CollisionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or refresh an entry
    pub fn insert(&self, entry: CollisionEntry) {
        self.entries.borrow_mut().insert(entry.overlay_id, entry);
        self.bump();
    }

    /// Deregister an overlay. Returns false if it was not registered.
    pub fn remove(&self, overlay_id: OverlayId) -> bool {
        let removed = self
            .entries
            .borrow_mut()
            .shift_remove(&overlay_id)
            .is_some();
        if removed {
            self.bump();
        }
        removed
    }

    pub fn contains(&self, overlay_id: OverlayId) -> bool {
        self.entries.borrow().contains_key(&overlay_id)
    }

    pub fn get(&self, overlay_id: OverlayId) -> Option<CollisionEntry> {
        self.entries.borrow().get(&overlay_id).cloned()
    }

    /// Entries ordered by weight, heaviest first; ties keep registration order
    pub fn entries(&self) -> Vec<CollisionEntry> {
        let mut entries: Vec<_> = self.entries.borrow().values().cloned().collect();
        entries.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        entries
    }

    /// Bumped on every registration change
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bump(&self) {
        self.revision.set(self.revision.get() + 1);
    }
}
