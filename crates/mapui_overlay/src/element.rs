//! Retained element model
//!
//! An [`Element`] is the overlay's rendered node as the engine sees it: the
//! style state the platform should apply, its class list, event bindings and
//! the intrinsic size the platform laid it out at. Platform backends read the
//! style state when they render and report layout through
//! [`Element::set_content_size`] and [`Element::notify_resize`].
//!
//! A [`Panel`] is a named container in the map (the `"ui"` panel hosts
//! overlays by default).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use mapui_core::Size;
use smallvec::SmallVec;

use crate::overlay::OverlayId;

/// Class added when the collision pass reveals an overlay with fade-in
pub const FADE_IN_CLASS: &str = "mapui-fade-in";

/// Offscreen left position used while measuring
const MEASURE_OFFSCREEN: f64 = -99999.0;

/// Unique element identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// `display` style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Shown,
    None,
}

/// `position` style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Positioning {
    #[default]
    Static,
    Absolute,
}

/// `visibility` style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Style state of an element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementStyle {
    pub display: Display,
    pub position: Positioning,
    pub left: f64,
    pub top: f64,
    pub opacity: Option<f64>,
    pub transform: Option<String>,
    pub transform_origin: Option<String>,
    pub transition: Option<String>,
    pub visibility: Visibility,
    pub z_index: Option<i32>,
}

/// One resize observation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeEntry {
    /// Border box size, when the platform reports it
    pub border_box: Option<Size>,
    /// Content rect size
    pub content_box: Size,
}

impl ResizeEntry {
    /// Border box when available, content box otherwise
    pub fn size(&self) -> Size {
        self.border_box.unwrap_or(self.content_box)
    }
}

/// Resize observer callback
pub type ResizeCallback = Rc<dyn Fn(&[ResizeEntry])>;

struct ElementData {
    id: ElementId,
    classes: SmallVec<[String; 2]>,
    style: ElementStyle,
    content_size: Size,
    stopped_events: SmallVec<[String; 4]>,
    events_propagation: bool,
    owner_tag: Option<OverlayId>,
    parent: Option<Weak<PanelInner>>,
    resize_observer: Option<ResizeCallback>,
    layout_flushes: u64,
}

/// Shared handle onto a rendered overlay element
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Element")
            .field("id", &data.id)
            .field("classes", &data.classes)
            .field("style", &data.style)
            .field("content_size", &data.content_size)
            .field("attached", &data.parent.is_some())
            .finish()
    }
}

impl Element {
    /// Create an element laid out at `content_size`
    pub fn new(content_size: Size) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            id: ElementId(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed)),
            classes: SmallVec::new(),
            style: ElementStyle::default(),
            content_size,
            stopped_events: SmallVec::new(),
            events_propagation: false,
            owner_tag: None,
            parent: None,
            resize_observer: None,
            layout_flushes: 0,
        })))
    }

    /// Builder-style class
    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn id(&self) -> ElementId {
        self.0.borrow().id
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // -------------------------------------------------------------------------
    // Style
    // -------------------------------------------------------------------------

    /// Snapshot of the current style
    pub fn style(&self) -> ElementStyle {
        self.0.borrow().style.clone()
    }

    /// Mutate the style in place
    pub fn update_style<F>(&self, f: F)
    where
        F: FnOnce(&mut ElementStyle),
    {
        f(&mut self.0.borrow_mut().style);
    }

    pub fn add_class(&self, class: impl Into<String>) {
        let class = class.into();
        let mut data = self.0.borrow_mut();
        if !data.classes.contains(&class) {
            data.classes.push(class);
        }
    }

    pub fn remove_class(&self, class: &str) -> bool {
        let mut data = self.0.borrow_mut();
        let before = data.classes.len();
        data.classes.retain(|c| c != class);
        data.classes.len() != before
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    /// Intrinsic size the platform laid the content out at
    pub fn content_size(&self) -> Size {
        self.0.borrow().content_size
    }

    /// Record a new layout size (does not notify resize observers)
    pub fn set_content_size(&self, size: Size) {
        self.0.borrow_mut().content_size = size;
    }

    /// Force a synchronous layout and read the rendered box
    ///
    /// Hidden elements have no box and report [`Size::ZERO`].
    pub fn flush_layout(&self) -> Size {
        let mut data = self.0.borrow_mut();
        data.layout_flushes += 1;
        if data.style.display == Display::None || data.parent.is_none() {
            Size::ZERO
        } else {
            data.content_size
        }
    }

    /// Number of forced layouts so far
    pub fn layout_flushes(&self) -> u64 {
        self.0.borrow().layout_flushes
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Stop propagation of `events` at this element
    pub fn stop_propagation<S: AsRef<str>>(&self, events: &[S]) {
        let mut data = self.0.borrow_mut();
        for event in events {
            let event = event.as_ref();
            if !data.stopped_events.iter().any(|e| e == event) {
                data.stopped_events.push(event.to_string());
            }
        }
    }

    /// Remove stop-propagation bindings for `events`
    pub fn clear_stop_propagation<S: AsRef<str>>(&self, events: &[S]) {
        let mut data = self.0.borrow_mut();
        data.stopped_events
            .retain(|e| !events.iter().any(|s| s.as_ref() == e.as_str()));
    }

    /// Events whose propagation stops at this element
    pub fn stopped_events(&self) -> Vec<String> {
        self.0.borrow().stopped_events.to_vec()
    }

    pub fn events_propagation(&self) -> bool {
        self.0.borrow().events_propagation
    }

    pub fn set_events_propagation(&self, propagate: bool) {
        self.0.borrow_mut().events_propagation = propagate;
    }

    // -------------------------------------------------------------------------
    // Ownership
    // -------------------------------------------------------------------------

    /// Overlay that currently renders through this element
    pub fn owner_tag(&self) -> Option<OverlayId> {
        self.0.borrow().owner_tag
    }

    pub fn set_owner_tag(&self, owner: Option<OverlayId>) {
        self.0.borrow_mut().owner_tag = owner;
    }

    /// True while the element sits in a live panel
    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// The panel holding this element
    pub fn parent(&self) -> Option<Panel> {
        self.0
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Panel)
    }

    /// Remove the element from its panel. Returns false if it had none.
    pub fn detach(&self) -> bool {
        match self.parent() {
            Some(panel) => panel.remove(self),
            None => {
                self.0.borrow_mut().parent = None;
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Resize observation
    // -------------------------------------------------------------------------

    /// Attach a resize observer. Returns false if one is already attached.
    pub fn observe_resize(&self, callback: ResizeCallback) -> bool {
        let mut data = self.0.borrow_mut();
        if data.resize_observer.is_some() {
            return false;
        }
        data.resize_observer = Some(callback);
        true
    }

    /// Disconnect the resize observer, if any
    pub fn disconnect_resize(&self) -> bool {
        self.0.borrow_mut().resize_observer.take().is_some()
    }

    pub fn is_resize_observed(&self) -> bool {
        self.0.borrow().resize_observer.is_some()
    }

    /// Deliver resize observations from the platform
    ///
    /// Returns false when nobody observes this element.
    pub fn notify_resize(&self, entries: &[ResizeEntry]) -> bool {
        let observer = self.0.borrow().resize_observer.clone();
        match observer {
            Some(observer) => {
                if let Some(last) = entries.last() {
                    self.set_content_size(last.size());
                }
                observer(entries);
                true
            }
            None => false,
        }
    }
}

/// Measure an element's rendered size without disturbing layout
///
/// The element is shown offscreen, absolutely positioned, inside `panel`;
/// its box is read with a forced layout, then it is hidden and reset to the
/// panel origin. The element stays in `panel` afterwards.
///
/// This forces a synchronous layout: call it at most once per show.
pub fn measure(element: &Element, panel: &Panel) -> Size {
    element.update_style(|s| {
        s.position = Positioning::Absolute;
        s.left = MEASURE_OFFSCREEN;
        s.top = 0.0;
        s.display = Display::Shown;
    });
    panel.append(element);
    let size = element.flush_layout();
    element.update_style(|s| {
        s.display = Display::None;
        s.left = 0.0;
        s.top = 0.0;
    });
    size
}

// =============================================================================
// Panel
// =============================================================================

struct PanelInner {
    name: String,
    children: RefCell<Vec<Element>>,
}

/// Named container in the map hosting overlay elements
#[derive(Clone)]
pub struct Panel(Rc<PanelInner>);

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("name", &self.0.name)
            .field("children", &self.len())
            .finish()
    }
}

impl Panel {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(PanelInner {
            name: name.into(),
            children: RefCell::new(Vec::new()),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn ptr_eq(&self, other: &Panel) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Append `element` as the last child, moving it from any other panel
    pub fn append(&self, element: &Element) {
        element.detach();
        self.0.children.borrow_mut().push(element.clone());
        element.0.borrow_mut().parent = Some(Rc::downgrade(&self.0));
    }

    /// Remove `element`. Returns false if it was not a child.
    pub fn remove(&self, element: &Element) -> bool {
        let removed = {
            let mut children = self.0.children.borrow_mut();
            let before = children.len();
            children.retain(|c| !c.ptr_eq(element));
            children.len() != before
        };
        if removed {
            element.0.borrow_mut().parent = None;
        }
        removed
    }

    pub fn contains(&self, element: &Element) -> bool {
        self.0.children.borrow().iter().any(|c| c.ptr_eq(element))
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.children.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
