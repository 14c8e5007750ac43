//! Geographic vocabulary and the host canvas interface.
//!
//! This module provides the coordinate and rectangle types shared by regions
//! and overlays, the projections that map them onto a plane, and the traits
//! a host map widget implements to have overlays drawn into it.

mod canvas;
mod projection;
mod renderer;
mod types;

pub use canvas::{MapCanvas, PointSource};
pub use projection::{MapProjection, Projection, ProjectionError, WebMercator};
pub use renderer::{path_shapes, plane_path, EguiCanvas, PlanePath};
pub use types::{rects_intersect, Coordinate, Envelope, PlaneBounds, PlanePoint, PlaneRect};
