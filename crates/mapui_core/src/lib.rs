//! Mapui Core
//!
//! Host-agnostic primitives shared by the map overlay engine:
//!
//! - **Geometry**: pixel points, sizes and boxes, plus geographic coordinates
//! - **Event Hubs**: subscription by sets of named event kinds
//! - **Frame Queue**: next-frame tasks coalesced per key
//! - **Timer Queue**: one-shot delayed callbacks on a host-driven clock
//!
//! Everything here is single-threaded. Hosts drive the frame and timer
//! queues from their own render loop.

pub mod error;
pub mod events;
pub mod frame;
pub mod geometry;
pub mod timer;

pub use error::{CoreError, Result};
pub use events::{EventHandler, EventHub, EventKind, ListenerKey};
pub use frame::{FrameKey, FrameQueue};
pub use geometry::{Coordinate, Point, Rect, Size};
pub use timer::{TimerId, TimerQueue};
