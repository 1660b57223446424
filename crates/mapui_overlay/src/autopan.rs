//! Auto-pan offsets
//!
//! When an overlay opens partly outside the map container, the map pans so
//! the overlay sits `margin` pixels inside the nearest edge.

use mapui_core::{Point, Rect, Size};

/// Pan offset bringing an overlay box inside the container
///
/// `origin` is the overlay's top-left in container space. Returns `None`
/// when the box already fits. A positive offset moves content right/down.
pub fn pan_offset(origin: Point, size: Size, container: Size, margin: f64) -> Option<Point> {
    let bbox = Rect::from_origin_size(origin, size);

    let left = if bbox.x() < 0.0 {
        -bbox.x() + margin
    } else if bbox.right() > container.width {
        container.width - bbox.right() - margin
    } else {
        0.0
    };

    let top = if bbox.y() < 0.0 {
        -bbox.y() + margin
    } else if bbox.bottom() > container.height {
        container.height - bbox.bottom() - margin
    } else {
        0.0
    };

    if left == 0.0 && top == 0.0 {
        None
    } else {
        Some(Point::new(left, top))
    }
}
