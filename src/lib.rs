//! Overlay geometry for map canvases.
//!
//! Two pieces live here:
//!
//! - [`Region`]: a named geographic shape with attached metadata, whose
//!   polygon and bounding box are projected once at construction.
//! - [`DynamicOverlayView`]: a line/shape renderer that caches its drawable
//!   and rebuilds it only when the overlay's points change.
//!
//! Both are coded against the host traits in [`geo`]; an egui implementation
//! ([`geo::EguiCanvas`]) is included.

pub mod geo;
pub mod overlay;
pub mod region;

pub use geo::{Coordinate, Envelope, MapCanvas, PointSource, Projection};
pub use overlay::{DynamicOverlayView, LineCap, LineJoin, OverlayStyle, PolylineOverlay};
pub use region::{Metadata, Region, RegionGeometry, RegionKind};
