//! Component capability set
//!
//! A concrete overlay (info window, tooltip, menu, marker label...) plugs
//! into the lifecycle engine by implementing [`UiComponent`]. Only
//! [`UiComponent::class_name`] and [`UiComponent::build_on`] are required;
//! every other hook has a default that opts out, so the engine can call them
//! unconditionally.

use std::fmt;
use std::rc::Rc;

use mapui_core::{Point, Size};
use smallvec::SmallVec;

use crate::config::OverlayConfig;
use crate::element::Element;
use crate::host::{MapEvent, MapHost, OwnerEvent};
use crate::overlay::Overlay;

/// What a component sees while building its element
pub struct BuildContext<'a> {
    pub map: &'a MapHost,
    pub overlay: &'a Overlay,
    pub config: &'a OverlayConfig,
}

/// Handler for an extra event binding
pub type BindingHandler<K> = Rc<dyn Fn(&Overlay, K)>;

/// Extra event binding a component asks for
///
/// Bound and unbound together with the engine's own bindings for the same
/// source.
pub struct EventBinding<K> {
    pub kinds: SmallVec<[K; 4]>,
    pub handler: BindingHandler<K>,
}

impl<K: Copy> EventBinding<K> {
    pub fn new<F>(kinds: &[K], handler: F) -> Self
    where
        F: Fn(&Overlay, K) + 'static,
    {
        Self {
            kinds: SmallVec::from_slice(kinds),
            handler: Rc::new(handler),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for EventBinding<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Content and hooks of a concrete overlay type
pub trait UiComponent {
    /// Class name; singleton slots are keyed by it
    fn class_name(&self) -> &str;

    /// Build the element to display
    ///
    /// Returning `None` is allowed: the show completes but nothing is
    /// displayed.
    fn build_on(&self, cx: &BuildContext<'_>) -> Option<Element>;

    /// Pixel offset of the content anchor for an element of `size`
    ///
    /// Evaluated on every pose computation.
    fn offset(&self, _size: Size) -> Option<Point> {
        None
    }

    /// Extra map bindings, active while map events are bound
    fn map_events(&self) -> Vec<EventBinding<MapEvent>> {
        Vec::new()
    }

    /// Extra owner bindings, active between `add_to` and `remove`
    fn owner_events(&self) -> Vec<EventBinding<OwnerEvent>> {
        Vec::new()
    }

    /// Called after the overlay is attached to an owner
    fn on_add(&self, _overlay: &Overlay) {}

    /// Called before the overlay tears down on `remove`
    fn on_remove(&self, _overlay: &Overlay) {}

    /// Called after this component's element left the document
    fn on_dom_remove(&self, _overlay: &Overlay) {}

    /// Transform origin for an element of `size`, relative to its top-left
    fn transform_origin(&self, _size: Size) -> Option<Point> {
        None
    }

    /// Whether `minZoom`/`maxZoom` apply to this component
    fn supports_zoom_filter(&self) -> bool {
        false
    }
}
