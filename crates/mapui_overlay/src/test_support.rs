//! Shared fixtures for unit tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mapui_core::{Coordinate, EventHub, Point, Size};

use crate::component::{BuildContext, UiComponent};
use crate::config::OverlayConfig;
use crate::element::Element;
use crate::host::{Geometry, MapHost, OwnerEvent, Viewport, WeakMapHost};
use crate::overlay::Overlay;

// =============================================================================
// Viewport
// =============================================================================

/// Linear projection: `(x * 10, y * 10 - altitude)`
///
/// View space and container space differ by `container_origin`.
pub(crate) struct TestViewport {
    center: Cell<Coordinate>,
    zoom: Cell<f64>,
    bearing: Cell<f64>,
    pitch: Cell<f64>,
    transforming: Cell<bool>,
    moving: Cell<bool>,
    size: Cell<Size>,
    container_origin: Cell<Point>,
    pans: RefCell<Vec<(Point, u32)>>,
}

impl TestViewport {
    pub(crate) fn new() -> Self {
        Self {
            center: Cell::new(Coordinate::new(0.0, 0.0)),
            zoom: Cell::new(10.0),
            bearing: Cell::new(0.0),
            pitch: Cell::new(0.0),
            transforming: Cell::new(false),
            moving: Cell::new(false),
            size: Cell::new(Size::new(800.0, 600.0)),
            container_origin: Cell::new(Point::ZERO),
            pans: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn set_center(&self, center: Coordinate) {
        self.center.set(center);
    }

    pub(crate) fn set_zoom(&self, zoom: f64) {
        self.zoom.set(zoom);
    }

    pub(crate) fn set_bearing(&self, bearing: f64) {
        self.bearing.set(bearing);
    }

    pub(crate) fn set_pitch(&self, pitch: f64) {
        self.pitch.set(pitch);
    }

    pub(crate) fn set_transforming(&self, transforming: bool) {
        self.transforming.set(transforming);
    }

    pub(crate) fn set_moving(&self, moving: bool) {
        self.moving.set(moving);
    }

    pub(crate) fn set_size(&self, size: Size) {
        self.size.set(size);
    }

    pub(crate) fn set_container_origin(&self, origin: Point) {
        self.container_origin.set(origin);
    }

    /// Pan requests received so far
    pub(crate) fn pans(&self) -> Vec<(Point, u32)> {
        self.pans.borrow().clone()
    }
}

impl Viewport for TestViewport {
    fn coordinate_to_view_point(&self, coordinate: &Coordinate, altitude: f64) -> Point {
        Point::new(coordinate.x * 10.0, coordinate.y * 10.0 - altitude)
    }

    fn view_point_to_container_point(&self, point: Point) -> Point {
        point + self.container_origin.get()
    }

    fn center(&self) -> Coordinate {
        self.center.get()
    }

    fn zoom(&self) -> f64 {
        self.zoom.get()
    }

    fn bearing(&self) -> f64 {
        self.bearing.get()
    }

    fn pitch(&self) -> f64 {
        self.pitch.get()
    }

    fn is_transforming(&self) -> bool {
        self.transforming.get()
    }

    fn is_moving(&self) -> bool {
        self.moving.get()
    }

    fn size(&self) -> Size {
        self.size.get()
    }

    fn pan_by(&self, offset: Point, duration_ms: u32) {
        self.pans.borrow_mut().push((offset, duration_ms));
    }
}

/// A map over a shared [`TestViewport`]
pub(crate) fn test_map() -> (MapHost, Rc<TestViewport>) {
    let viewport = Rc::new(TestViewport::new());
    (MapHost::new(Rc::clone(&viewport)), viewport)
}

// =============================================================================
// Geometry
// =============================================================================

pub(crate) struct TestGeometry {
    map: WeakMapHost,
    center: Cell<Option<Coordinate>>,
    altitude: Cell<Option<f64>>,
    events: EventHub<OwnerEvent>,
}

impl TestGeometry {
    pub(crate) fn new(map: &MapHost, center: Coordinate) -> Self {
        Self {
            map: map.downgrade(),
            center: Cell::new(Some(center)),
            altitude: Cell::new(None),
            events: EventHub::new(),
        }
    }

    /// Move the geometry and notify listeners
    pub(crate) fn set_center(&self, center: Coordinate) {
        self.center.set(Some(center));
        self.events.emit(OwnerEvent::PositionChange);
    }

    pub(crate) fn set_altitude(&self, altitude: Option<f64>) {
        self.altitude.set(altitude);
    }

    pub(crate) fn fire(&self, event: OwnerEvent) -> usize {
        self.events.emit(event)
    }
}

impl Geometry for TestGeometry {
    fn map(&self) -> Option<MapHost> {
        self.map.upgrade()
    }

    fn center(&self) -> Option<Coordinate> {
        self.center.get()
    }

    fn altitude(&self) -> Option<f64> {
        self.altitude.get()
    }

    fn events(&self) -> &EventHub<OwnerEvent> {
        &self.events
    }
}

// =============================================================================
// Component
// =============================================================================

/// Counters shared between a [`TestComponent`] and the test body
#[derive(Clone, Default)]
pub(crate) struct ComponentProbe {
    pub(crate) builds: Rc<Cell<usize>>,
    pub(crate) offsets: Rc<Cell<usize>>,
    pub(crate) hooks: Rc<RefCell<Vec<&'static str>>>,
    pub(crate) elements: Rc<RefCell<Vec<Element>>>,
}

impl ComponentProbe {
    pub(crate) fn last_element(&self) -> Option<Element> {
        self.elements.borrow().last().cloned()
    }

    pub(crate) fn hooks(&self) -> Vec<&'static str> {
        self.hooks.borrow().clone()
    }
}

pub(crate) struct TestComponent {
    class: String,
    size: Size,
    anchor: Option<Point>,
    builds_nothing: bool,
    zoom_filter: bool,
    probe: ComponentProbe,
}

impl TestComponent {
    pub(crate) fn new(class: &str) -> Self {
        Self {
            class: class.to_string(),
            size: Size::new(100.0, 40.0),
            anchor: None,
            builds_nothing: false,
            zoom_filter: false,
            probe: ComponentProbe::default(),
        }
    }

    pub(crate) fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Anchor returned from `offset`
    pub(crate) fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub(crate) fn building_nothing(mut self) -> Self {
        self.builds_nothing = true;
        self
    }

    pub(crate) fn with_zoom_filter(mut self) -> Self {
        self.zoom_filter = true;
        self
    }

    pub(crate) fn probe(&self) -> ComponentProbe {
        self.probe.clone()
    }
}

impl UiComponent for TestComponent {
    fn class_name(&self) -> &str {
        &self.class
    }

    fn build_on(&self, _cx: &BuildContext<'_>) -> Option<Element> {
        self.probe.builds.set(self.probe.builds.get() + 1);
        if self.builds_nothing {
            return None;
        }
        let element = Element::new(self.size).with_class(self.class.clone());
        self.probe.elements.borrow_mut().push(element.clone());
        Some(element)
    }

    fn offset(&self, _size: Size) -> Option<Point> {
        self.probe.offsets.set(self.probe.offsets.get() + 1);
        self.anchor
    }

    fn on_add(&self, _overlay: &Overlay) {
        self.probe.hooks.borrow_mut().push("add");
    }

    fn on_remove(&self, _overlay: &Overlay) {
        self.probe.hooks.borrow_mut().push("remove");
    }

    fn on_dom_remove(&self, _overlay: &Overlay) {
        self.probe.hooks.borrow_mut().push("dom_remove");
    }

    fn supports_zoom_filter(&self) -> bool {
        self.zoom_filter
    }
}

/// Overlay over a [`TestComponent`] of class `class`, plus its probe
pub(crate) fn test_overlay(class: &str, config: OverlayConfig) -> (Overlay, ComponentProbe) {
    let component = TestComponent::new(class);
    let probe = component.probe();
    (Overlay::new(component, config), probe)
}
