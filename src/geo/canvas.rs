//! Host canvas interface.
//!
//! Overlays are coded against these traits rather than a concrete map
//! widget; [`super::EguiCanvas`] is the bundled egui implementation.

use super::projection::Projection;
use super::types::{Coordinate, PlanePoint, PlaneRect};
use crate::overlay::OverlayStyle;

/// A drawing surface that projects coordinates, builds drawable shapes and
/// paints them with an overlay style.
pub trait MapCanvas: Projection {
    /// Host representation of a built path.
    type Drawable;

    /// Builds a drawable from projected points, or None if the points
    /// cannot form a visible shape.
    ///
    /// Drawables are cached across draws, so they must not depend on view
    /// state such as zoom or pan.
    fn build_drawable(&self, points: &[PlanePoint], closed: bool) -> Option<Self::Drawable>;

    /// Paints a drawable with the given style under the current view.
    fn paint(&mut self, drawable: &Self::Drawable, style: &OverlayStyle);

    /// Asks the host to schedule another draw pass.
    fn request_redraw(&mut self);

    /// The plane area currently on screen. None means everything is visible.
    fn visible_rect(&self) -> Option<PlaneRect> {
        None
    }
}

/// Supplies the live point sequence of an overlay.
pub trait PointSource {
    fn current_points(&self) -> &[Coordinate];

    /// Whether the last point connects back to the first.
    fn is_closed(&self) -> bool {
        false
    }
}
