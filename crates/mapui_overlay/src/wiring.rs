//! Event wiring
//!
//! Connects an overlay to the notifications that move it:
//!
//! - map events, bound while the overlay is visible or mid-hide
//! - owner events, bound from `add_to` until `remove`
//! - resize observation of the rendered element
//!
//! Map events map to a [`Reaction`] through [`MAP_REACTIONS`]. Every
//! reaction ends in [`Overlay::reposition`], so pose updates have a single
//! entry point whatever triggered them.

use std::fmt;
use std::rc::{Rc, Weak};

use mapui_core::{FrameKey, ListenerKey};
use smallvec::SmallVec;

use crate::element::{Element, ResizeEntry};
use crate::host::{Capabilities, Geometry, MapEvent, MapHost, Owner, OwnerEvent, WeakMapHost};
use crate::overlay::{Overlay, WeakOverlay};

/// Frame queue scope of deferred repositions
pub const REPOSITION_SCOPE: &str = "overlay.reposition";

/// How an overlay responds to a map event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    /// Reposition on the next frame
    Deferred,
    /// Reposition on the next frame, only while the viewport transforms
    DeferredWhileTransforming,
    /// Reposition now
    Immediate,
    /// Reapply the zoom filter, then reposition now
    ZoomSettled,
}

/// Map event to reaction table
pub const MAP_REACTIONS: &[(&[MapEvent], Reaction)] = &[
    (
        &[MapEvent::Zooming, MapEvent::Rotate, MapEvent::Pitch],
        Reaction::Deferred,
    ),
    (
        &[MapEvent::Moving, MapEvent::MoveEnd],
        Reaction::DeferredWhileTransforming,
    ),
    (&[MapEvent::ZoomEnd], Reaction::ZoomSettled),
    (&[MapEvent::Resize], Reaction::Immediate),
];

/// Owner events the engine reacts to
const OWNER_EVENTS: &[OwnerEvent] = &[
    OwnerEvent::PositionChange,
    OwnerEvent::ShapeChange,
    OwnerEvent::SymbolChange,
    OwnerEvent::Remove,
];

/// Look up the reaction for `event`
pub fn reaction_for(event: MapEvent) -> Option<Reaction> {
    MAP_REACTIONS
        .iter()
        .find(|(kinds, _)| kinds.contains(&event))
        .map(|&(_, reaction)| reaction)
}

// =============================================================================
// Map bindings
// =============================================================================

/// Active map subscriptions of one overlay
pub(crate) struct MapBindings {
    map: WeakMapHost,
    keys: SmallVec<[ListenerKey; 6]>,
}

impl fmt::Debug for MapBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapBindings")
            .field("listeners", &self.keys.len())
            .finish()
    }
}

impl MapBindings {
    /// Unsubscribe everything. Returns the number of listeners removed.
    pub(crate) fn unbind(self) -> usize {
        let Some(map) = self.map.upgrade() else {
            return 0;
        };
        self.keys
            .into_iter()
            .filter(|&key| map.events().off(key))
            .count()
    }
}

pub(crate) fn bind_map_events(overlay: &Overlay, map: &MapHost) -> MapBindings {
    let mut keys = SmallVec::new();

    for &(kinds, reaction) in MAP_REACTIONS {
        let weak = overlay.downgrade();
        keys.push(map.events().on(kinds, move |_| {
            if let Some(overlay) = weak.upgrade() {
                react(&overlay, reaction);
            }
        }));
    }

    for binding in overlay.component().map_events() {
        let weak = overlay.downgrade();
        let handler = binding.handler;
        keys.push(map.events().on(&binding.kinds, move |event| {
            if let Some(overlay) = weak.upgrade() {
                handler(&overlay, event);
            }
        }));
    }

    tracing::trace!(
        "bind_map_events - {:?}: {} listeners",
        overlay.id(),
        keys.len()
    );

    MapBindings {
        map: map.downgrade(),
        keys,
    }
}

fn react(overlay: &Overlay, reaction: Reaction) {
    let Some(map) = overlay.map() else {
        return;
    };

    match reaction {
        Reaction::Deferred => {
            request_reposition(overlay, &map);
        }
        Reaction::DeferredWhileTransforming => {
            if map.viewport().is_transforming() {
                request_reposition(overlay, &map);
            }
        }
        Reaction::Immediate => {
            overlay.reposition();
            overlay.collides();
        }
        Reaction::ZoomSettled => {
            overlay.apply_zoom_filter();
            overlay.reposition();
            overlay.collides();
        }
    }
}

/// Queue a reposition for the next frame
///
/// Requests for the same overlay within one frame collapse into one.
pub(crate) fn request_reposition(overlay: &Overlay, map: &MapHost) -> bool {
    let weak = overlay.downgrade();
    let queued = map.frames().enqueue(
        FrameKey::new(REPOSITION_SCOPE, overlay.id().raw()),
        move || {
            if let Some(overlay) = weak.upgrade() {
                overlay.reposition();
                overlay.collides();
            }
        },
    );
    if queued {
        tracing::trace!("request_reposition - {:?} queued", overlay.id());
    }
    queued
}

// =============================================================================
// Owner bindings
// =============================================================================

/// Active owner subscriptions of one overlay
pub(crate) struct OwnerBindings {
    owner: Weak<dyn Geometry>,
    keys: SmallVec<[ListenerKey; 2]>,
}

impl fmt::Debug for OwnerBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerBindings")
            .field("listeners", &self.keys.len())
            .finish()
    }
}

impl OwnerBindings {
    pub(crate) fn unbind(self) -> usize {
        let Some(owner) = self.owner.upgrade() else {
            return 0;
        };
        self.keys
            .into_iter()
            .filter(|&key| owner.events().off(key))
            .count()
    }
}

/// Subscribe to owner changes. Map owners have nothing to bind.
pub(crate) fn bind_owner_events(overlay: &Overlay, owner: &Owner) -> Option<OwnerBindings> {
    let geometry = owner.as_geometry()?;
    let mut keys = SmallVec::new();

    let weak = overlay.downgrade();
    keys.push(geometry.events().on(OWNER_EVENTS, move |event| {
        if let Some(overlay) = weak.upgrade() {
            on_owner_event(&overlay, event);
        }
    }));

    for binding in overlay.component().owner_events() {
        let weak = overlay.downgrade();
        let handler = binding.handler;
        keys.push(geometry.events().on(&binding.kinds, move |event| {
            if let Some(overlay) = weak.upgrade() {
                handler(&overlay, event);
            }
        }));
    }

    Some(OwnerBindings {
        owner: Rc::downgrade(&geometry),
        keys,
    })
}

fn on_owner_event(overlay: &Overlay, event: OwnerEvent) {
    match event {
        OwnerEvent::Remove => overlay.remove(),
        _ if !overlay.is_visible() => {}
        OwnerEvent::PositionChange | OwnerEvent::ShapeChange => {
            let center = overlay.owner().and_then(|owner| owner.center());
            overlay.reshow(center);
        }
        OwnerEvent::SymbolChange => overlay.reshow(None),
    }
}

// =============================================================================
// Resize observation
// =============================================================================

/// Observe `element` resizes on behalf of `overlay`
///
/// Returns false when the platform cannot observe resizes or an observer is
/// already attached.
pub(crate) fn observe_resize(
    overlay: &Overlay,
    element: &Element,
    capabilities: Capabilities,
) -> bool {
    if !capabilities.resize_observer {
        tracing::trace!("observe_resize - no resize observation on this platform");
        return false;
    }

    let weak: WeakOverlay = overlay.downgrade();
    element.observe_resize(Rc::new(move |entries: &[ResizeEntry]| {
        if let Some(overlay) = weak.upgrade() {
            overlay.resized(entries);
        }
    }))
}
