//! Dynamically redrawing line overlays.
//!
//! A [`DynamicOverlayView`] renders the points of a [`PolylineOverlay`] (or
//! any other [`crate::geo::PointSource`]) through a host canvas, caching the
//! built drawable until the points change.

mod polyline;
mod style;
mod view;

pub use polyline::PolylineOverlay;
pub use style::{LineCap, LineJoin, OverlayStyle};
pub use view::{DrawOutcome, DynamicOverlayView, GeometryCache, PointFingerprint};
