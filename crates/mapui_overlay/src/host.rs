//! Host collaborators
//!
//! The overlay engine does not own the map. Hosts describe their viewport
//! through the [`Viewport`] trait and wrap it in a [`MapHost`], which carries
//! the shared runtime pieces overlays coordinate through:
//!
//! - map event hub ([`MapEvent`])
//! - next-frame queue and animation timers
//! - named panels hosting overlay elements
//! - per-class singleton slots
//! - overlay tracking and the collision queue
//!
//! Owners are either the map itself or a [`Geometry`] placed on it. Overlays
//! only ever hold weak references to their owner.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use mapui_core::{Coordinate, EventHub, FrameKey, FrameQueue, Point, Size, TimerQueue};
use rustc_hash::FxHashMap;

use crate::collision::{CollisionQueue, CollisionResolver};
use crate::config::DEFAULT_CONTAINER;
use crate::element::Panel;
use crate::overlay::{Overlay, OverlayId, WeakOverlay};
use crate::singleton::SingletonSlots;

// =============================================================================
// Viewport
// =============================================================================

/// The host's view onto the map: projection plus camera state
///
/// View points are relative to the panel hosting overlays; container points
/// are relative to the map container's top-left corner.
pub trait Viewport {
    /// Project a coordinate at `altitude` into view space
    fn coordinate_to_view_point(&self, coordinate: &Coordinate, altitude: f64) -> Point;

    /// Convert a view point into container space
    fn view_point_to_container_point(&self, point: Point) -> Point;

    /// Current map center
    fn center(&self) -> Coordinate;

    /// Current zoom level
    fn zoom(&self) -> f64;

    /// Current bearing in degrees
    fn bearing(&self) -> f64;

    /// Current pitch in degrees
    fn pitch(&self) -> f64;

    /// True while zooming, rotating or pitching
    fn is_transforming(&self) -> bool;

    /// True while panning or while a pan animation runs
    fn is_moving(&self) -> bool;

    /// Container size in pixels
    fn size(&self) -> Size;

    /// Pan by `offset` pixels: content under the viewport moves by `offset`
    fn pan_by(&self, offset: Point, duration_ms: u32);
}

impl<T: Viewport + ?Sized> Viewport for Rc<T> {
    fn coordinate_to_view_point(&self, coordinate: &Coordinate, altitude: f64) -> Point {
        (**self).coordinate_to_view_point(coordinate, altitude)
    }

    fn view_point_to_container_point(&self, point: Point) -> Point {
        (**self).view_point_to_container_point(point)
    }

    fn center(&self) -> Coordinate {
        (**self).center()
    }

    fn zoom(&self) -> f64 {
        (**self).zoom()
    }

    fn bearing(&self) -> f64 {
        (**self).bearing()
    }

    fn pitch(&self) -> f64 {
        (**self).pitch()
    }

    fn is_transforming(&self) -> bool {
        (**self).is_transforming()
    }

    fn is_moving(&self) -> bool {
        (**self).is_moving()
    }

    fn size(&self) -> Size {
        (**self).size()
    }

    fn pan_by(&self, offset: Point, duration_ms: u32) {
        (**self).pan_by(offset, duration_ms)
    }
}

/// Platform capabilities the engine degrades around
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// 3D CSS-style transforms (`translate3d`, `rotateX`, `rotateZ`)
    pub transform_3d: bool,
    /// Asynchronous element resize observation
    pub resize_observer: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            transform_3d: true,
            resize_observer: true,
        }
    }
}

impl Capabilities {
    /// Plain 2D platform without resize observation
    pub fn minimal() -> Self {
        Self {
            transform_3d: false,
            resize_observer: false,
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// Viewport notifications overlays react to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapEvent {
    /// Zoom in progress
    Zooming,
    /// Rotation in progress
    Rotate,
    /// Pitch change in progress
    Pitch,
    /// Zoom settled
    ZoomEnd,
    /// Pan in progress
    Moving,
    /// Pan settled
    MoveEnd,
    /// Container resized
    Resize,
}

/// Owner notifications overlays react to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OwnerEvent {
    /// The owner moved
    PositionChange,
    /// The owner's shape changed
    ShapeChange,
    /// The owner's symbol changed
    SymbolChange,
    /// The owner left the map
    Remove,
}

// =============================================================================
// MapHost
// =============================================================================

/// Identifies a map instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(u64);

impl MapId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

struct MapInner {
    id: MapId,
    viewport: Box<dyn Viewport>,
    capabilities: Cell<Capabilities>,
    events: EventHub<MapEvent>,
    frames: FrameQueue,
    timers: TimerQueue,
    panels: RefCell<FxHashMap<String, Panel>>,
    singletons: RefCell<SingletonSlots>,
    overlays: RefCell<IndexMap<OverlayId, WeakOverlay>>,
    collision: CollisionQueue,
    resolver: RefCell<Option<Rc<dyn CollisionResolver>>>,
}

/// Shared handle onto a map and the runtime state overlays use on it
#[derive(Clone)]
pub struct MapHost {
    inner: Rc<MapInner>,
}

impl fmt::Debug for MapHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapHost")
            .field("id", &self.inner.id)
            .field("capabilities", &self.inner.capabilities.get())
            .field("overlays", &self.inner.overlays.borrow().len())
            .finish()
    }
}

impl MapHost {
    /// Wrap a viewport. The default `"ui"` panel is created up front.
    pub fn new(viewport: impl Viewport + 'static) -> Self {
        let id = MapId(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed));
        let mut panels = FxHashMap::default();
        panels.insert(
            DEFAULT_CONTAINER.to_string(),
            Panel::new(DEFAULT_CONTAINER),
        );

        tracing::debug!("MapHost::new - map {:?}", id);

        Self {
            inner: Rc::new(MapInner {
                id,
                viewport: Box::new(viewport),
                capabilities: Cell::new(Capabilities::default()),
                events: EventHub::new(),
                frames: FrameQueue::new(),
                timers: TimerQueue::new(),
                panels: RefCell::new(panels),
                singletons: RefCell::new(SingletonSlots::new()),
                overlays: RefCell::new(IndexMap::new()),
                collision: CollisionQueue::new(),
                resolver: RefCell::new(None),
            }),
        }
    }

    /// Builder-style capability override
    pub fn with_capabilities(self, capabilities: Capabilities) -> Self {
        self.set_capabilities(capabilities);
        self
    }

    pub fn id(&self) -> MapId {
        self.inner.id
    }

    pub fn viewport(&self) -> &dyn Viewport {
        self.inner.viewport.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities.get()
    }

    pub fn set_capabilities(&self, capabilities: Capabilities) {
        self.inner.capabilities.set(capabilities);
    }

    /// Map event hub
    pub fn events(&self) -> &EventHub<MapEvent> {
        &self.inner.events
    }

    /// Deliver a viewport notification to every subscriber
    pub fn fire(&self, event: MapEvent) -> usize {
        self.inner.events.emit(event)
    }

    pub fn frames(&self) -> &FrameQueue {
        &self.inner.frames
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.inner.timers
    }

    /// Run one rendering frame's worth of deferred tasks
    pub fn run_frame(&self) -> usize {
        self.inner.frames.run_frame()
    }

    /// Advance the animation clock
    pub fn advance(&self, delta_ms: u64) -> usize {
        self.inner.timers.advance(delta_ms)
    }

    /// Look up a named panel
    pub fn panel(&self, name: &str) -> Option<Panel> {
        self.inner.panels.borrow().get(name).cloned()
    }

    /// Get or create a named panel
    pub fn add_panel(&self, name: &str) -> Panel {
        self.inner
            .panels
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(|| Panel::new(name))
            .clone()
    }

    /// Per-class singleton slots of this map
    pub fn singletons(&self) -> &RefCell<SingletonSlots> {
        &self.inner.singletons
    }

    pub(crate) fn track_overlay(&self, overlay: &Overlay) {
        self.inner
            .overlays
            .borrow_mut()
            .insert(overlay.id(), overlay.downgrade());
    }

    pub(crate) fn untrack_overlay(&self, id: OverlayId) -> bool {
        self.inner.overlays.borrow_mut().shift_remove(&id).is_some()
    }

    /// Live overlays that have been shown on this map, in first-show order
    pub fn overlays(&self) -> Vec<Overlay> {
        self.inner
            .overlays
            .borrow()
            .values()
            .filter_map(WeakOverlay::upgrade)
            .collect()
    }

    pub fn collision(&self) -> &CollisionQueue {
        &self.inner.collision
    }

    /// Install the algorithm that decides collision visibility
    pub fn set_collision_resolver(&self, resolver: impl CollisionResolver + 'static) {
        *self.inner.resolver.borrow_mut() = Some(Rc::new(resolver));
    }

    /// Schedule a collision pass for the next frame
    ///
    /// Requests within one frame collapse into a single pass.
    pub fn request_collision_pass(&self) {
        let weak = self.downgrade();
        self.inner
            .frames
            .enqueue(FrameKey::new("map.collision", self.inner.id.0), move || {
                if let Some(map) = weak.upgrade() {
                    map.run_collision_pass();
                }
            });
    }

    /// Run the collision pass now and apply its verdicts
    ///
    /// Returns the number of verdicts applied. Without a resolver this is a
    /// no-op.
    pub fn run_collision_pass(&self) -> usize {
        let Some(resolver) = self.inner.resolver.borrow().clone() else {
            return 0;
        };

        let entries = self.inner.collision.entries();
        let verdicts = resolver.resolve(&entries);
        tracing::trace!(
            "collision pass on map {:?}: {} entries, {} verdicts",
            self.inner.id,
            entries.len(),
            verdicts.len()
        );

        let mut applied = 0;
        for verdict in &verdicts {
            let overlay = entries
                .iter()
                .find(|e| e.overlay_id == verdict.overlay_id)
                .and_then(|e| e.overlay.upgrade());
            if let Some(overlay) = overlay {
                overlay.set_collision_visible(verdict.visible);
                applied += 1;
            }
        }
        applied
    }

    pub fn downgrade(&self) -> WeakMapHost {
        WeakMapHost {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &MapHost) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Weak handle onto a [`MapHost`]
#[derive(Clone, Default)]
pub struct WeakMapHost {
    inner: Weak<MapInner>,
}

impl WeakMapHost {
    pub fn upgrade(&self) -> Option<MapHost> {
        self.inner.upgrade().map(|inner| MapHost { inner })
    }
}

impl fmt::Debug for WeakMapHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakMapHost")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// =============================================================================
// Owners
// =============================================================================

/// A map object overlays can be attached to
pub trait Geometry {
    /// The map this geometry is on, if any
    fn map(&self) -> Option<MapHost>;

    /// Current center, if the geometry has one
    fn center(&self) -> Option<Coordinate>;

    /// Altitude of the geometry
    fn altitude(&self) -> Option<f64> {
        None
    }

    /// Change notifications
    fn events(&self) -> &EventHub<OwnerEvent>;
}

/// Back-reference to whatever an overlay is attached to
#[derive(Clone)]
pub enum Owner {
    /// Attached directly to the map
    Map(WeakMapHost),
    /// Attached to a geometry on the map
    Geometry(Weak<dyn Geometry>),
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Owner::Geometry(geometry) => f
                .debug_tuple("Geometry")
                .field(&(geometry.strong_count() > 0))
                .finish(),
        }
    }
}

impl Owner {
    /// Reference a geometry without keeping it alive
    pub fn geometry<G: Geometry + 'static>(geometry: &Rc<G>) -> Self {
        let geometry: Rc<dyn Geometry> = geometry.clone();
        Owner::Geometry(Rc::downgrade(&geometry))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Owner::Map(_))
    }

    /// The geometry, while it is alive
    pub fn as_geometry(&self) -> Option<Rc<dyn Geometry>> {
        match self {
            Owner::Geometry(geometry) => geometry.upgrade(),
            Owner::Map(_) => None,
        }
    }

    /// Resolve the map: the owner itself, or the geometry's map
    pub fn map(&self) -> Option<MapHost> {
        match self {
            Owner::Map(map) => map.upgrade(),
            Owner::Geometry(geometry) => geometry.upgrade()?.map(),
        }
    }

    pub fn center(&self) -> Option<Coordinate> {
        match self {
            Owner::Map(map) => map.upgrade().map(|m| m.viewport().center()),
            Owner::Geometry(geometry) => geometry.upgrade()?.center(),
        }
    }

    pub fn altitude(&self) -> Option<f64> {
        match self {
            Owner::Map(_) => None,
            Owner::Geometry(geometry) => geometry.upgrade()?.altitude(),
        }
    }
}

impl From<&MapHost> for Owner {
    fn from(map: &MapHost) -> Self {
        Owner::Map(map.downgrade())
    }
}

impl<G: Geometry + 'static> From<&Rc<G>> for Owner {
    fn from(geometry: &Rc<G>) -> Self {
        Owner::geometry(geometry)
    }
}
