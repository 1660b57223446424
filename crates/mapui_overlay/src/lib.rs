//! Mapui Overlay Engine
//!
//! Map-anchored UI components: info windows, tooltips, menus and labels that
//! follow a coordinate or a geometry while the map pans, zooms and rotates.
//!
//! The engine owns the lifecycle (`add_to`, `show`, `hide`, `remove`) and
//! everything that keeps an overlay consistent with its map:
//!
//! - pose computation with altitude, pixel offsets and map tilt/rotation
//! - per-class singleton slots shared by overlays of one map
//! - show/hide animations without hide/show races
//! - auto-pan, zoom filtering and resize-driven reflow
//! - registration with the map's collision pass
//!
//! Content is supplied by implementing [`UiComponent`].
//!
//! # Example
//!
//! ```rust
//! use mapui_overlay::prelude::*;
//!
//! struct FlatViewport;
//!
//! impl Viewport for FlatViewport {
//!     fn coordinate_to_view_point(&self, c: &Coordinate, altitude: f64) -> Point {
//!         Point::new(c.x, c.y - altitude)
//!     }
//!     fn view_point_to_container_point(&self, point: Point) -> Point {
//!         point
//!     }
//!     fn center(&self) -> Coordinate {
//!         Coordinate::new(0.0, 0.0)
//!     }
//!     fn zoom(&self) -> f64 {
//!         10.0
//!     }
//!     fn bearing(&self) -> f64 {
//!         0.0
//!     }
//!     fn pitch(&self) -> f64 {
//!         0.0
//!     }
//!     fn is_transforming(&self) -> bool {
//!         false
//!     }
//!     fn is_moving(&self) -> bool {
//!         false
//!     }
//!     fn size(&self) -> Size {
//!         Size::new(800.0, 600.0)
//!     }
//!     fn pan_by(&self, _offset: Point, _duration_ms: u32) {}
//! }
//!
//! struct Tooltip;
//!
//! impl UiComponent for Tooltip {
//!     fn class_name(&self) -> &str {
//!         "tooltip"
//!     }
//!
//!     fn build_on(&self, _cx: &BuildContext<'_>) -> Option<Element> {
//!         Some(Element::new(Size::new(120.0, 30.0)))
//!     }
//! }
//!
//! let map = MapHost::new(FlatViewport);
//! let tooltip = Overlay::new(Tooltip, OverlayConfig::default().with_animation(None));
//! tooltip.add_to(&map);
//! tooltip.show(Some(Coordinate::new(100.0, 50.0)));
//!
//! assert!(tooltip.is_visible());
//! assert_eq!(tooltip.position(), Some(Point::new(100.0, 50.0)));
//! ```

pub mod animation;
pub mod autopan;
pub mod collision;
pub mod component;
pub mod config;
pub mod element;
pub mod error;
pub mod host;
pub mod overlay;
pub mod pose;
pub mod singleton;
pub mod wiring;

#[cfg(test)]
pub(crate) mod test_support;

pub use animation::{AnimationKind, AnimationPlan};
pub use collision::{CollisionEntry, CollisionQueue, CollisionResolver, CollisionVerdict};
pub use component::{BindingHandler, BuildContext, EventBinding, UiComponent};
pub use config::{OverlayConfig, DEFAULT_CONTAINER};
pub use element::{Element, ElementStyle, Panel, ResizeEntry, FADE_IN_CLASS};
pub use error::{ConfigError, OverlayError, Result};
pub use host::{
    Capabilities, Geometry, MapEvent, MapHost, MapId, Owner, OwnerEvent, Viewport, WeakMapHost,
};
pub use overlay::{LifecycleState, Overlay, OverlayEvent, OverlayId, WeakOverlay};
pub use pose::Pose;
pub use singleton::{Eviction, SingletonOccupant, SingletonSlots};
pub use wiring::{Reaction, MAP_REACTIONS};

/// Everything needed to host overlays and write components
pub mod prelude {
    pub use crate::component::{BuildContext, EventBinding, UiComponent};
    pub use crate::config::OverlayConfig;
    pub use crate::element::{Element, Panel, ResizeEntry};
    pub use crate::host::{
        Capabilities, Geometry, MapEvent, MapHost, Owner, OwnerEvent, Viewport,
    };
    pub use crate::overlay::{LifecycleState, Overlay, OverlayEvent};
    pub use crate::collision::{CollisionEntry, CollisionResolver, CollisionVerdict};
    pub use mapui_core::{Coordinate, Point, Rect, Size};
}
