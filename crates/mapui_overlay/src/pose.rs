//! Pixel pose computation
//!
//! An overlay's pose is its view-space pixel position plus the transform
//! that places the element there, optionally tilted and rotated with the map.

use mapui_core::{Coordinate, Point};

use crate::config::OverlayConfig;
use crate::host::{Capabilities, Viewport};

/// Computed placement of an overlay
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    /// View-space position of the element's top-left corner
    pub point: Point,
    /// Translate (plus tilt/rotation) transform, without a scale term
    pub transform: String,
}

impl Pose {
    /// Transform with a trailing scale term, used for scale animations
    pub fn transform_with_scale(&self, scale: f64) -> String {
        format!("{} scale({})", self.transform, scale)
    }
}

/// Altitude used for projection
///
/// An explicit z on the coordinate wins, then the owner's altitude, then 0.
pub fn resolve_altitude(coordinate: &Coordinate, owner_altitude: Option<f64>) -> f64 {
    coordinate.z.or(owner_altitude).unwrap_or(0.0)
}

/// Compute the pose of an overlay anchored at `coordinate`
///
/// The projected point gets the configured `dx`/`dy` and the component's
/// anchor offset added. Rounding, when enabled, happens last so the offsets
/// are not quantized twice.
pub fn compute_pose(
    viewport: &dyn Viewport,
    capabilities: Capabilities,
    coordinate: &Coordinate,
    owner_altitude: Option<f64>,
    config: &OverlayConfig,
    anchor_offset: Option<Point>,
) -> Pose {
    let altitude = resolve_altitude(coordinate, owner_altitude);
    let mut point = viewport
        .coordinate_to_view_point(coordinate, altitude)
        .offset(config.dx, config.dy);
    if let Some(anchor) = anchor_offset {
        point = point + anchor;
    }
    if config.round_point {
        point = point.round();
    }

    Pose {
        point,
        transform: translate(point, viewport, capabilities, config),
    }
}

/// Transform placing an element at `point`
///
/// With 3D transform support this is a `translate3d` followed by optional
/// `rotateX` (map pitch) and `rotateZ` (negated map bearing) terms in whole
/// degrees. Without it, a plain 2D `translate`.
pub fn translate(
    point: Point,
    viewport: &dyn Viewport,
    capabilities: Capabilities,
    config: &OverlayConfig,
) -> String {
    if !capabilities.transform_3d {
        return format!("translate({}px, {}px)", point.x, point.y);
    }

    let mut transform = format!("translate3d({}px, {}px, 0px)", point.x, point.y);
    let pitch = viewport.pitch();
    if config.pitch_with_map && pitch != 0.0 {
        transform.push_str(&format!(" rotateX({}deg)", whole_degrees(pitch)));
    }
    let bearing = viewport.bearing();
    if config.rotate_with_map && bearing != 0.0 {
        transform.push_str(&format!(" rotateZ({}deg)", whole_degrees(-bearing)));
    }
    transform
}

fn whole_degrees(degrees: f64) -> f64 {
    // + 0.0 turns -0 into 0
    degrees.round() + 0.0
}
