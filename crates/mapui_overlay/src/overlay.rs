//! Overlay lifecycle
//!
//! An [`Overlay`] is a UI component anchored to a coordinate on the map or
//! to a geometry. It moves through these states:
//!
//! ```text
//! Detached --add_to--> Hidden --show--> Visible --hide--> Hidden
//!                                          |                ^
//!                                          +--hide (anim)-> Hiding --timer
//! ```
//!
//! `remove` is reachable from every state and always hides first.
//!
//! Entry points never fail: a show without a map, a hide of a hidden
//! overlay, a second remove are logged no-ops. Notifications go out through
//! [`Overlay::events`] with no internal borrows held, so listeners may call
//! back into the overlay.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use mapui_core::{Coordinate, EventHub, ListenerKey, Point, Rect, Size, TimerId};

use crate::animation::AnimationPlan;
use crate::autopan;
use crate::collision::CollisionEntry;
use crate::component::{BuildContext, UiComponent};
use crate::config::OverlayConfig;
use crate::element::{self, Display, Element, Positioning, ResizeEntry, Visibility, FADE_IN_CLASS};
use crate::error::{OverlayError, Result};
use crate::host::{MapHost, Owner};
use crate::pose::{self, Pose};
use crate::singleton::SingletonOccupant;
use crate::wiring::{self, MapBindings, OwnerBindings};

// =============================================================================
// Identity & Events
// =============================================================================

/// Unique overlay identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

/// Notifications an overlay emits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayEvent {
    /// Attached to an owner
    Add,
    /// A show began
    ShowStart,
    /// A show finished (the animation may still be running)
    ShowEnd,
    /// The overlay is hidden
    Hide,
    /// Removed from its owner
    Remove,
}

/// Lifecycle state of an overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// No owner
    Detached,
    /// Attached, not displayed
    Hidden,
    /// Displayed in its panel
    Visible,
    /// Hide animation running, element still displayed
    Hiding,
}

// =============================================================================
// Overlay
// =============================================================================

/// Animated hide in flight
#[derive(Clone, Copy, Debug)]
struct PendingHide {
    token: u64,
    timer: TimerId,
}

#[derive(Default)]
struct OverlayState {
    owner: Option<Owner>,
    coordinate: Option<Coordinate>,
    element: Option<Element>,
    pose: Option<Pose>,
    measured_size: Option<Size>,
    observed_size: Option<Size>,
    /// Logical visibility; the element may still be displayed while hiding
    visible: bool,
    /// The displayed transform carries a scale term
    scaled: bool,
    hide_token: u64,
    pending_hide: Option<PendingHide>,
    z_index: Option<i32>,
    collision_hidden: bool,
    map_bindings: Option<MapBindings>,
    owner_bindings: Option<OwnerBindings>,
}

struct OverlayInner {
    id: OverlayId,
    config: OverlayConfig,
    component: Box<dyn UiComponent>,
    events: EventHub<OverlayEvent>,
    state: RefCell<OverlayState>,
}

/// Shared handle onto an overlay
#[derive(Clone)]
pub struct Overlay {
    inner: Rc<OverlayInner>,
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("id", &self.inner.id)
            .field("class", &self.class_name())
            .field("state", &self.state())
            .finish()
    }
}

impl Overlay {
    /// Create a detached overlay
    pub fn new(component: impl UiComponent + 'static, config: OverlayConfig) -> Self {
        let state = OverlayState {
            visible: config.visible,
            ..Default::default()
        };
        Self {
            inner: Rc::new(OverlayInner {
                id: OverlayId(NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed)),
                config,
                component: Box::new(component),
                events: EventHub::new(),
                state: RefCell::new(state),
            }),
        }
    }

    pub fn id(&self) -> OverlayId {
        self.inner.id
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.inner.config
    }

    pub fn class_name(&self) -> &str {
        self.inner.component.class_name()
    }

    pub(crate) fn component(&self) -> &dyn UiComponent {
        self.inner.component.as_ref()
    }

    /// Lifecycle notifications
    pub fn events(&self) -> &EventHub<OverlayEvent> {
        &self.inner.events
    }

    /// Subscribe to lifecycle notifications
    pub fn on<F>(&self, kinds: &[OverlayEvent], handler: F) -> ListenerKey
    where
        F: Fn(OverlayEvent) + 'static,
    {
        self.inner.events.on(kinds, handler)
    }

    pub fn owner(&self) -> Option<Owner> {
        self.inner.state.borrow().owner.clone()
    }

    /// The owner's map
    pub fn map(&self) -> Option<MapHost> {
        self.owner()?.map()
    }

    /// Coordinate of the last show
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.inner.state.borrow().coordinate
    }

    pub fn element(&self) -> Option<Element> {
        self.inner.state.borrow().element.clone()
    }

    /// Last applied pose
    pub fn pose(&self) -> Option<Pose> {
        self.inner.state.borrow().pose.clone()
    }

    /// View point of the element's top-left corner
    pub fn position(&self) -> Option<Point> {
        self.inner.state.borrow().pose.as_ref().map(|pose| pose.point)
    }

    /// Content size: last observed resize, else the measured size
    pub fn size(&self) -> Size {
        let state = self.inner.state.borrow();
        state
            .observed_size
            .or(state.measured_size)
            .unwrap_or(Size::ZERO)
    }

    /// Logically visible with its element displayed
    pub fn is_visible(&self) -> bool {
        let (visible, element) = {
            let state = self.inner.state.borrow();
            (state.visible, state.element.clone())
        };
        visible && element.is_some_and(|e| is_displayed(&e))
    }

    pub fn state(&self) -> LifecycleState {
        let (attached, hiding) = {
            let state = self.inner.state.borrow();
            (state.owner.is_some(), state.pending_hide.is_some())
        };
        if !attached {
            LifecycleState::Detached
        } else if hiding {
            LifecycleState::Hiding
        } else if self.is_visible() {
            LifecycleState::Visible
        } else {
            LifecycleState::Hidden
        }
    }

    pub fn map_events_bound(&self) -> bool {
        self.inner.state.borrow().map_bindings.is_some()
    }

    pub fn owner_events_bound(&self) -> bool {
        self.inner.state.borrow().owner_bindings.is_some()
    }

    /// Hidden by the collision pass
    pub fn is_collision_hidden(&self) -> bool {
        self.inner.state.borrow().collision_hidden
    }

    /// Effective stacking order
    pub fn z_index(&self) -> Option<i32> {
        self.inner
            .state
            .borrow()
            .z_index
            .or(self.inner.config.z_index)
    }

    /// Override the stacking order, applied to the current element too
    pub fn set_z_index(&self, z_index: Option<i32>) {
        self.inner.state.borrow_mut().z_index = z_index;
        let z_index = self.z_index();
        if let Some(element) = self.element() {
            element.update_style(|s| s.z_index = z_index);
        }
    }

    pub fn downgrade(&self) -> WeakOverlay {
        WeakOverlay {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Overlay) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Attach to the map or a geometry
    ///
    /// An overlay attached elsewhere is removed first.
    pub fn add_to(&self, owner: impl Into<Owner>) {
        let owner = owner.into();
        if self.owner().is_some() {
            self.remove();
        }

        let bindings = wiring::bind_owner_events(self, &owner);
        {
            let mut state = self.inner.state.borrow_mut();
            state.owner = Some(owner);
            state.owner_bindings = bindings;
        }

        tracing::debug!("Overlay::add_to - {:?} ({})", self.id(), self.class_name());
        self.inner.component.on_add(self);
        self.inner.events.emit(OverlayEvent::Add);
    }

    /// Show at `coordinate`, else the last coordinate, else the owner center
    pub fn show(&self, coordinate: Option<Coordinate>) {
        if let Err(err) = self.show_with(coordinate, false) {
            tracing::debug!("Overlay::show - {:?}: {}", self.id(), err);
        }
    }

    /// Reshow after an owner change, without start/end notifications
    pub(crate) fn reshow(&self, coordinate: Option<Coordinate>) {
        if let Err(err) = self.show_with(coordinate, true) {
            tracing::debug!("Overlay::reshow - {:?}: {}", self.id(), err);
        }
    }

    fn show_with(&self, coordinate: Option<Coordinate>, symbol_driven: bool) -> Result<()> {
        let owner = self.owner().ok_or(OverlayError::Detached)?;
        let map = owner.map().ok_or(OverlayError::NoMap)?;
        let last = self.coordinate();
        let coordinate = coordinate
            .or(last)
            .or_else(|| owner.center())
            .ok_or(OverlayError::NoCoordinate)?;

        let already_visible = self.is_visible();
        // Supersedes an animated hide still in flight
        self.cancel_pending_hide();
        self.inner.state.borrow_mut().coordinate = Some(coordinate);

        tracing::debug!(
            "Overlay::show - {:?} ({}) at {:?}, symbol driven: {}",
            self.id(),
            self.class_name(),
            coordinate,
            symbol_driven
        );
        if !symbol_driven {
            self.inner.events.emit(OverlayEvent::ShowStart);
        }

        self.detach_previous(&map, symbol_driven);

        if !self.map_events_bound() {
            let bindings = wiring::bind_map_events(self, &map);
            self.inner.state.borrow_mut().map_bindings = Some(bindings);
        }
        map.track_overlay(self);

        let config = &self.inner.config;
        let built = self.inner.component.build_on(&BuildContext {
            map: &map,
            overlay: self,
            config,
        });
        let Some(element) = built else {
            tracing::debug!("Overlay::show - {:?} built no element", self.id());
            self.inner.state.borrow_mut().visible = false;
            self.finish_show(symbol_driven);
            return Ok(());
        };
        let Some(panel) = map.panel(&config.container) else {
            self.inner.state.borrow_mut().visible = false;
            self.finish_show(symbol_driven);
            return Err(OverlayError::MissingPanel(config.container.clone()));
        };

        element.set_events_propagation(config.events_propagation);
        let size = element::measure(&element, &panel);

        if config.single {
            let leftover = map.singletons().borrow_mut().occupy(
                self.class_name(),
                SingletonOccupant::new(self, element.clone()),
            );
            if let Some(leftover) = leftover {
                teardown_element(&leftover.element);
            }
        } else {
            element.set_owner_tag(Some(self.id()));
        }

        {
            let mut state = self.inner.state.borrow_mut();
            state.element = Some(element.clone());
            state.measured_size = Some(size);
            state.observed_size = None;
            state.visible = true;
            state.collision_hidden = false;
        }

        let pose = self.compute_pose()?;
        let origin = self.inner.component.transform_origin(size);
        let z_index = self.z_index();
        let plan = if already_visible {
            AnimationPlan::resolve(config).disabled()
        } else {
            AnimationPlan::resolve(config)
        };

        // Start state, then attach
        element.update_style(|s| {
            s.position = Positioning::Absolute;
            s.left = 0.0;
            s.top = 0.0;
            s.z_index = z_index;
            s.visibility = Visibility::Visible;
            s.transform_origin = origin.map(|o| format!("{}px {}px", o.x, o.y));
            s.transition = None;
            s.opacity = plan.fade.then_some(0.0);
            s.transform = Some(if plan.scale {
                pose.transform_with_scale(0.0)
            } else {
                pose.transform.clone()
            });
            s.display = Display::Shown;
        });
        panel.append(&element);

        if plan.is_applicable() {
            element.flush_layout();
            element.update_style(|s| {
                s.transition = plan.transition.clone();
                if plan.fade {
                    s.opacity = Some(1.0);
                }
                if plan.scale {
                    s.transform = Some(pose.transform_with_scale(1.0));
                }
            });
        }

        {
            let mut state = self.inner.state.borrow_mut();
            state.pose = Some(pose.clone());
            state.scaled = plan.scale;
        }

        if config.events_propagation {
            if let Some(events) = &config.events_to_stop {
                element.stop_propagation(events.as_slice());
            }
        }

        self.apply_zoom_filter();
        if config.auto_pan && !symbol_driven {
            self.auto_pan(&map, pose.point);
        }
        wiring::observe_resize(self, &element, map.capabilities());

        self.finish_show(symbol_driven);
        Ok(())
    }

    fn finish_show(&self, symbol_driven: bool) {
        if !symbol_driven {
            self.inner.events.emit(OverlayEvent::ShowEnd);
        }
        self.collides();
    }

    /// Tear down whatever stands in the way of a new element
    ///
    /// Singletons evict the class slot's occupant whoever it is; every
    /// overlay drops its own previous element.
    fn detach_previous(&self, map: &MapHost, symbol_driven: bool) {
        let own = {
            let mut state = self.inner.state.borrow_mut();
            state.observed_size = None;
            state.element.take()
        };

        if self.inner.config.single {
            let eviction = map
                .singletons()
                .borrow_mut()
                .evict(self.class_name(), self.id());
            if let Some(eviction) = eviction {
                let previous = eviction.previous;
                match previous.overlay.upgrade() {
                    Some(prev) if !eviction.replaces_self => {
                        prev.evicted(eviction.notify_hide, symbol_driven);
                    }
                    _ => {
                        let is_own = own.as_ref().is_some_and(|e| e.ptr_eq(&previous.element));
                        if !is_own {
                            teardown_element(&previous.element);
                        }
                    }
                }
            }
        }

        if let Some(own) = own {
            if teardown_element(&own) {
                self.inner.component.on_dom_remove(self);
            }
        }
    }

    /// Lose the singleton slot to another overlay
    ///
    /// An animated hide in flight completes here, so its `hide` still fires.
    fn evicted(&self, notify_hide: bool, symbol_driven: bool) {
        let was_hiding = self.cancel_pending_hide();
        let notify_hide = notify_hide || was_hiding;
        let (element, bindings) = {
            let mut state = self.inner.state.borrow_mut();
            state.visible = false;
            state.observed_size = None;
            state.pose = None;
            let bindings = if symbol_driven && !was_hiding {
                None
            } else {
                state.map_bindings.take()
            };
            (state.element.take(), bindings)
        };

        tracing::debug!(
            "Overlay::evicted - {:?} ({}), notify hide: {}",
            self.id(),
            self.class_name(),
            notify_hide
        );

        if let Some(element) = &element {
            element.clear_stop_propagation(element.stopped_events().as_slice());
        }
        if notify_hide {
            self.inner.events.emit(OverlayEvent::Hide);
        }
        if let Some(element) = element {
            if teardown_element(&element) {
                self.inner.component.on_dom_remove(self);
            }
        }
        if let Some(bindings) = bindings {
            bindings.unbind();
        }
        if let Some(map) = self.map() {
            map.collision().remove(self.id());
        }
    }

    /// Hide the overlay
    ///
    /// With `animationOnHide` the hidden end state is applied now and the
    /// element is suppressed when the animation ends; a `show` before then
    /// wins over the pending hide.
    pub fn hide(&self) {
        let (element, pose) = {
            let mut state = self.inner.state.borrow_mut();
            let Some(element) = state.element.clone() else {
                return;
            };
            if !state.visible || state.pending_hide.is_some() || !element.is_attached() {
                return;
            }
            state.visible = false;
            (element, state.pose.clone())
        };

        let config = &self.inner.config;
        let plan = AnimationPlan::resolve(config);
        let animated = config.animation_on_hide && plan.is_applicable();

        element.update_style(|s| {
            if animated {
                s.transition = plan.transition.clone();
            }
            if plan.fade {
                s.opacity = Some(0.0);
            }
            if let (true, Some(pose)) = (plan.scale, &pose) {
                s.transform = Some(pose.transform_with_scale(0.0));
            }
        });

        match self.map().filter(|_| animated) {
            Some(map) => {
                let token = {
                    let mut state = self.inner.state.borrow_mut();
                    state.hide_token += 1;
                    state.hide_token
                };
                tracing::debug!(
                    "Overlay::hide - {:?} animating for {}ms",
                    self.id(),
                    plan.duration_ms
                );
                let weak = self.downgrade();
                let timer = map
                    .timers()
                    .schedule(u64::from(plan.duration_ms), move || {
                        if let Some(overlay) = weak.upgrade() {
                            overlay.finish_hide(token);
                        }
                    });
                self.inner.state.borrow_mut().pending_hide =
                    Some(PendingHide { token, timer });
            }
            None => self.complete_hide(),
        }

        self.collides();
    }

    fn finish_hide(&self, token: u64) {
        let current = {
            let mut state = self.inner.state.borrow_mut();
            let current = state.pending_hide.is_some_and(|p| p.token == token);
            if current {
                state.pending_hide = None;
            }
            current
        };
        if !current {
            tracing::trace!("Overlay::finish_hide - {:?} stale token {}", self.id(), token);
            return;
        }
        self.complete_hide();
    }

    /// Drop the animated hide in flight and cancel its timer
    ///
    /// Returns true if a hide was pending.
    fn cancel_pending_hide(&self) -> bool {
        let Some(pending) = self.inner.state.borrow_mut().pending_hide.take() else {
            return false;
        };
        if let Some(map) = self.map() {
            if let Err(err) = map.timers().cancel(pending.timer) {
                tracing::trace!("Overlay::cancel_pending_hide - {:?}: {}", self.id(), err);
            }
        }
        true
    }

    /// Suppress the element, unbind map events and notify
    fn complete_hide(&self) {
        let (element, bindings) = {
            let mut state = self.inner.state.borrow_mut();
            (state.element.clone(), state.map_bindings.take())
        };
        if let Some(element) = element {
            element.update_style(|s| s.display = Display::None);
        }
        if let Some(bindings) = bindings {
            bindings.unbind();
        }
        tracing::debug!("Overlay::hide - {:?} hidden", self.id());
        self.inner.events.emit(OverlayEvent::Hide);
    }

    /// Detach from the owner and tear everything down
    ///
    /// A hide animation in flight completes immediately.
    pub fn remove(&self) {
        let Some(owner) = self.owner() else {
            return;
        };
        let map = owner.map();
        if let Some(map) = &map {
            map.untrack_overlay(self.id());
        }

        let was_hiding = self.cancel_pending_hide();
        let must_hide = {
            let mut state = self.inner.state.borrow_mut();
            let must_hide = was_hiding
                || (state.visible && state.element.as_ref().is_some_and(is_displayed));
            state.visible = false;
            must_hide
        };
        if must_hide {
            self.complete_hide();
        }
        self.collides();

        let (map_bindings, owner_bindings) = {
            let mut state = self.inner.state.borrow_mut();
            (state.map_bindings.take(), state.owner_bindings.take())
        };
        if let Some(bindings) = map_bindings {
            bindings.unbind();
        }
        if let Some(bindings) = owner_bindings {
            bindings.unbind();
        }

        self.inner.component.on_remove(self);

        let element = self.inner.state.borrow_mut().element.take();
        if let Some(element) = element {
            if let (true, Some(map)) = (self.inner.config.single, &map) {
                map.singletons()
                    .borrow_mut()
                    .release(self.class_name(), self.id());
            }
            if teardown_element(&element) {
                self.inner.component.on_dom_remove(self);
            }
        }

        {
            let mut state = self.inner.state.borrow_mut();
            state.owner = None;
            state.coordinate = None;
            state.pose = None;
            state.measured_size = None;
            state.observed_size = None;
            state.collision_hidden = false;
        }

        tracing::debug!("Overlay::remove - {:?} ({})", self.id(), self.class_name());
        self.inner.events.emit(OverlayEvent::Remove);
    }

    // =========================================================================
    // Positioning
    // =========================================================================

    /// Compute the pose for the current coordinate and size
    pub fn compute_pose(&self) -> Result<Pose> {
        let (owner, coordinate) = {
            let state = self.inner.state.borrow();
            (state.owner.clone(), state.coordinate)
        };
        let owner = owner.ok_or(OverlayError::Detached)?;
        let map = owner.map().ok_or(OverlayError::NoMap)?;
        let coordinate = coordinate
            .or_else(|| owner.center())
            .ok_or(OverlayError::NoCoordinate)?;
        let anchor = self.inner.component.offset(self.size());

        Ok(pose::compute_pose(
            map.viewport(),
            map.capabilities(),
            &coordinate,
            owner.altitude(),
            &self.inner.config,
            anchor,
        ))
    }

    /// Recompute and apply the pose of the displayed element
    ///
    /// Returns false when nothing is displayed.
    pub fn reposition(&self) -> bool {
        let (element, scale) = {
            let state = self.inner.state.borrow();
            let scale = if state.pending_hide.is_some() {
                Some(0.0)
            } else {
                state.scaled.then_some(1.0)
            };
            (state.element.clone(), scale)
        };
        let Some(element) = element.filter(is_displayed) else {
            return false;
        };

        let pose = match self.compute_pose() {
            Ok(pose) => pose,
            Err(err) => {
                tracing::trace!("Overlay::reposition - {:?}: {}", self.id(), err);
                return false;
            }
        };

        let transform = match scale {
            Some(scale) => pose.transform_with_scale(scale),
            None => pose.transform.clone(),
        };
        element.update_style(|s| s.transform = Some(transform));
        tracing::trace!("Overlay::reposition - {:?} at {:?}", self.id(), pose.point);
        self.inner.state.borrow_mut().pose = Some(pose);
        true
    }

    /// Resize observation landed
    pub(crate) fn resized(&self, entries: &[ResizeEntry]) {
        let Some(last) = entries.last() else {
            return;
        };
        self.inner.state.borrow_mut().observed_size = Some(last.size());
        tracing::trace!("Overlay::resized - {:?} to {:?}", self.id(), last.size());
        self.reposition();
        self.collides();
    }

    /// Show or suppress the element for the current zoom
    pub(crate) fn apply_zoom_filter(&self) {
        if !self.inner.component.supports_zoom_filter() {
            return;
        }
        let Some(map) = self.map() else {
            return;
        };
        let (element, visible) = {
            let state = self.inner.state.borrow();
            (state.element.clone(), state.visible)
        };
        let Some(element) = element.filter(|_| visible) else {
            return;
        };

        let in_range = self.inner.config.zoom_in_range(map.viewport().zoom());
        element.update_style(|s| {
            s.display = if in_range {
                Display::Shown
            } else {
                Display::None
            };
        });
    }

    fn auto_pan(&self, map: &MapHost, point: Point) {
        let viewport = map.viewport();
        if viewport.is_moving() || viewport.is_transforming() {
            tracing::trace!("Overlay::auto_pan - {:?} skipped, map in motion", self.id());
            return;
        }

        let config = &self.inner.config;
        let origin = viewport.view_point_to_container_point(point);
        if let Some(offset) =
            autopan::pan_offset(origin, self.size(), viewport.size(), config.auto_pan_margin)
        {
            tracing::debug!("Overlay::auto_pan - {:?} by {:?}", self.id(), offset);
            viewport.pan_by(offset, config.auto_pan_duration);
        }
    }

    // =========================================================================
    // Collision
    // =========================================================================

    /// Refresh this overlay's collision registration and request a pass
    pub(crate) fn collides(&self) {
        let config = &self.inner.config;
        if !config.collision {
            return;
        }
        let Some(map) = self.map() else {
            return;
        };

        let entry = self
            .pose()
            .filter(|_| self.is_visible())
            .map(|pose| CollisionEntry {
                overlay_id: self.id(),
                overlay: self.downgrade(),
                bbox: Rect::from_origin_size(pose.point, self.size())
                    .outset(config.collision_buffer_size),
                weight: config.collision_weight,
                fade_in: config.collision_fade_in,
            });
        match entry {
            Some(entry) => map.collision().insert(entry),
            None => {
                map.collision().remove(self.id());
            }
        }
        map.request_collision_pass();
    }

    /// Apply a collision verdict
    pub fn set_collision_visible(&self, visible: bool) {
        let (element, was_hidden) = {
            let mut state = self.inner.state.borrow_mut();
            let Some(element) = state.element.clone() else {
                return;
            };
            let was_hidden = state.collision_hidden;
            state.collision_hidden = !visible;
            (element, was_hidden)
        };

        element.update_style(|s| {
            s.visibility = if visible {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
        });
        if !visible {
            element.remove_class(FADE_IN_CLASS);
        } else if was_hidden && self.inner.config.collision_fade_in {
            element.add_class(FADE_IN_CLASS);
        }
    }
}

fn is_displayed(element: &Element) -> bool {
    element.is_attached() && element.style().display == Display::Shown
}

/// Drop bindings and detach. Returns true if the element was attached.
fn teardown_element(element: &Element) -> bool {
    element.clear_stop_propagation(element.stopped_events().as_slice());
    element.disconnect_resize();
    element.set_owner_tag(None);
    element.detach()
}

/// Weak handle onto an [`Overlay`]
#[derive(Clone, Default)]
pub struct WeakOverlay {
    inner: Weak<OverlayInner>,
}

impl WeakOverlay {
    pub fn upgrade(&self) -> Option<Overlay> {
        self.inner.upgrade().map(|inner| Overlay { inner })
    }
}

impl fmt::Debug for WeakOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakOverlay")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
