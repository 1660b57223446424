//! Per-class singleton slots
//!
//! Overlays configured with `single` share one live element per class per
//! map. The slot remembers which overlay put its element there so a new
//! `show` can evict the previous occupant whoever it is.

use rustc_hash::FxHashMap;

use crate::element::Element;
use crate::overlay::{Overlay, OverlayId, WeakOverlay};

/// Current holder of a class slot
#[derive(Clone, Debug)]
pub struct SingletonOccupant {
    pub overlay_id: OverlayId,
    pub overlay: WeakOverlay,
    pub element: Element,
}

impl SingletonOccupant {
    pub fn new(overlay: &Overlay, element: Element) -> Self {
        Self {
            overlay_id: overlay.id(),
            overlay: overlay.downgrade(),
            element,
        }
    }
}

/// Result of evicting a slot, with the obligations the caller must honor
#[derive(Clone, Debug)]
pub struct Eviction {
    /// The evicted occupant
    pub previous: SingletonOccupant,
    /// The incoming overlay evicted its own element
    pub replaces_self: bool,
    /// The previous occupant was visible and must be told it is hidden
    pub notify_hide: bool,
}

/// Class-keyed slots of one map
#[derive(Debug, Default)]
pub struct SingletonSlots {
    slots: FxHashMap<String, SingletonOccupant>,
}

impl SingletonSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self, class: &str) -> Option<&SingletonOccupant> {
        self.slots.get(class)
    }

    pub fn is_occupied_by(&self, class: &str, overlay_id: OverlayId) -> bool {
        self.slots
            .get(class)
            .is_some_and(|o| o.overlay_id == overlay_id)
    }

    /// Empty the class slot ahead of `incoming` taking it
    ///
    /// Returns `None` when the slot was already empty.
    pub fn evict(&mut self, class: &str, incoming: OverlayId) -> Option<Eviction> {
        let previous = self.slots.remove(class)?;
        let replaces_self = previous.overlay_id == incoming;
        let notify_hide = !replaces_self
            && previous
                .overlay
                .upgrade()
                .is_some_and(|overlay| overlay.is_visible());

        tracing::debug!(
            "SingletonSlots::evict - class {:?}: {:?} -> {:?}",
            class,
            previous.overlay_id,
            incoming
        );

        Some(Eviction {
            previous,
            replaces_self,
            notify_hide,
        })
    }

    /// Put `occupant` in the class slot
    ///
    /// The slot must have been evicted first; a leftover occupant is
    /// returned so the caller can tear it down.
    pub fn occupy(&mut self, class: &str, occupant: SingletonOccupant) -> Option<SingletonOccupant> {
        occupant.element.set_owner_tag(Some(occupant.overlay_id));
        self.slots.insert(class.to_string(), occupant)
    }

    /// Release the slot if `overlay_id` holds it
    pub fn release(&mut self, class: &str, overlay_id: OverlayId) -> Option<SingletonOccupant> {
        if self.is_occupied_by(class, overlay_id) {
            self.slots.remove(class)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
