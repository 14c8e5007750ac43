//! Map projection and coordinate transformation.
//!
//! Handles converting geographic coordinates (lat/lon) into the web-mercator
//! map plane, and that plane into the screen space of an egui canvas.

use super::types::{Coordinate, PlanePoint, PlaneRect};
use egui::{Pos2, Rect, Vec2};
use geo_types::Coord;
use thiserror::Error;

/// A geographic to map-plane projection.
///
/// Implementations must be stateless with respect to `project` and
/// deterministic: the same coordinate always maps to the same bits.
pub trait Projection {
    /// Error raised for coordinates the projection cannot represent.
    type Error;

    fn project(&self, coord: Coordinate) -> Result<PlanePoint, Self::Error>;
}

impl<P: Projection + ?Sized> Projection for &P {
    type Error = P::Error;

    fn project(&self, coord: Coordinate) -> Result<PlanePoint, Self::Error> {
        (**self).project(coord)
    }
}

/// Errors raised by [`WebMercator`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    #[error("coordinate is not finite: ({latitude}, {longitude})")]
    NonFinite { latitude: f64, longitude: f64 },
    #[error("latitude {0} is outside the mercator range")]
    LatitudeOutOfRange(f64),
}

/// Spherical web-mercator projection onto a square world plane.
///
/// The origin is the north-west corner of the world and y grows southward,
/// matching the "map point" plane of common map kits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    /// Edge length of the world square in plane units
    pub world_size: f64,
}

impl WebMercator {
    /// Default world edge length (2^28 plane units).
    pub const WORLD_SIZE: f64 = 268_435_456.0;

    /// Highest latitude representable in the square world.
    pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

    pub fn new(world_size: f64) -> Self {
        Self { world_size }
    }

    /// Plane units spanned by one degree of longitude.
    pub fn units_per_degree(&self) -> f64 {
        self.world_size / 360.0
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new(Self::WORLD_SIZE)
    }
}

impl Projection for WebMercator {
    type Error = ProjectionError;

    fn project(&self, coord: Coordinate) -> Result<PlanePoint, ProjectionError> {
        if !coord.is_finite() {
            return Err(ProjectionError::NonFinite {
                latitude: coord.latitude,
                longitude: coord.longitude,
            });
        }
        if coord.latitude.abs() > Self::MAX_LATITUDE {
            return Err(ProjectionError::LatitudeOutOfRange(coord.latitude));
        }

        let x = (coord.longitude + 180.0) / 360.0 * self.world_size;
        let sin_lat = coord.latitude.to_radians().sin();
        let merc = ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI);
        let y = (0.5 - merc) * self.world_size;

        Ok(Coord { x, y })
    }
}

/// Screen view over the web-mercator map plane.
///
/// Coordinates project into the view-independent map plane; only
/// [`MapProjection::plane_to_screen`] depends on zoom, pan and canvas size.
#[derive(Debug, Clone)]
pub struct MapProjection {
    /// Center latitude of the view
    pub center_lat: f64,
    /// Center longitude of the view
    pub center_lon: f64,
    /// Visible range in degrees of longitude from the center to the nearest
    /// canvas edge at zoom 1
    pub range_deg: f64,
    /// Current zoom level
    pub zoom: f32,
    /// Pan offset in screen pixels
    pub pan_offset: Vec2,
    /// Screen rectangle for the canvas
    pub screen_rect: Rect,
    /// Map plane the view looks at
    pub plane: WebMercator,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self {
            center_lat: 0.0,
            center_lon: 0.0,
            range_deg: 4.5,
            zoom: 1.0,
            pan_offset: Vec2::ZERO,
            screen_rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
            plane: WebMercator::default(),
        }
    }
}

impl MapProjection {
    /// Creates a new projection centered on the given coordinate.
    pub fn new(center_lat: f64, center_lon: f64) -> Self {
        Self {
            center_lat,
            center_lon,
            ..Default::default()
        }
    }

    /// Updates the projection with current view state.
    pub fn update(&mut self, zoom: f32, pan_offset: Vec2, screen_rect: Rect) {
        self.zoom = zoom;
        self.pan_offset = pan_offset;
        self.screen_rect = screen_rect;
    }

    /// Plane point under the view center. The center latitude is clamped
    /// into the mercator range.
    fn center_plane(&self) -> PlanePoint {
        let lat = self
            .center_lat
            .clamp(-WebMercator::MAX_LATITUDE, WebMercator::MAX_LATITUDE);
        let center = Coordinate::new(lat, self.center_lon);
        self.plane.project(center).unwrap_or(Coord {
            x: self.plane.world_size / 2.0,
            y: self.plane.world_size / 2.0,
        })
    }

    /// Screen pixels per plane unit.
    fn scale(&self) -> f64 {
        let half_size = (self.screen_rect.size().min_elem() / 2.0) as f64;
        half_size * self.zoom as f64 / (self.range_deg * self.plane.units_per_degree())
    }

    /// Screen position of the view center, including pan.
    fn screen_center(&self) -> Pos2 {
        self.screen_rect.center() + self.pan_offset
    }

    /// Converts a map plane point to a screen position.
    pub fn plane_to_screen(&self, p: PlanePoint) -> Pos2 {
        let center = self.center_plane();
        let scale = self.scale();
        let screen = self.screen_center();

        Pos2::new(
            (screen.x as f64 + (p.x - center.x) * scale) as f32,
            (screen.y as f64 + (p.y - center.y) * scale) as f32,
        )
    }

    /// Converts a screen position back to a map plane point.
    pub fn screen_to_plane(&self, pos: Pos2) -> PlanePoint {
        let center = self.center_plane();
        let scale = self.scale();
        let screen = self.screen_center();

        Coord {
            x: center.x + (pos.x - screen.x) as f64 / scale,
            y: center.y + (pos.y - screen.y) as f64 / scale,
        }
    }

    /// Converts geographic coordinates to a screen position.
    pub fn geo_to_screen(&self, coord: Coordinate) -> Result<Pos2, ProjectionError> {
        Ok(self.plane_to_screen(self.plane.project(coord)?))
    }

    /// The canvas area as a map plane rectangle.
    pub fn visible_rect(&self) -> PlaneRect {
        PlaneRect::new(
            self.screen_to_plane(self.screen_rect.left_top()),
            self.screen_to_plane(self.screen_rect.right_bottom()),
        )
    }
}

impl Projection for MapProjection {
    type Error = ProjectionError;

    fn project(&self, coord: Coordinate) -> Result<PlanePoint, ProjectionError> {
        self.plane.project(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_origin_maps_to_world_center() {
        let merc = WebMercator::default();
        let p = merc.project(Coordinate::new(0.0, 0.0)).unwrap();

        assert!((p.x - WebMercator::WORLD_SIZE / 2.0).abs() < 1e-6);
        assert!((p.y - WebMercator::WORLD_SIZE / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_mercator_north_grows_toward_origin() {
        let merc = WebMercator::new(1000.0);
        let south = merc.project(Coordinate::new(37.0, -122.5)).unwrap();
        let north = merc.project(Coordinate::new(37.5, -122.5)).unwrap();

        assert!(north.y < south.y);
        assert_eq!(north.x, south.x);

        let corner = merc
            .project(Coordinate::new(WebMercator::MAX_LATITUDE, -180.0))
            .unwrap();
        assert!(corner.x.abs() < 1e-9);
        assert!(corner.y.abs() < 1e-6);
    }

    #[test]
    fn test_mercator_rejects_polar_and_non_finite() {
        let merc = WebMercator::default();

        assert_eq!(
            merc.project(Coordinate::new(86.0, 0.0)),
            Err(ProjectionError::LatitudeOutOfRange(86.0))
        );
        assert!(matches!(
            merc.project(Coordinate::new(f64::NAN, 0.0)),
            Err(ProjectionError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_screen_projection_center() {
        let proj = MapProjection::new(39.0, -98.0);
        let pos = proj.geo_to_screen(Coordinate::new(39.0, -98.0)).unwrap();

        assert_eq!(pos, proj.screen_rect.center());
    }

    #[test]
    fn test_plane_projection_ignores_view_state() {
        let mut proj = MapProjection::new(39.0, -98.0);
        let coord = Coordinate::new(39.5, -97.5);
        let before = proj.project(coord).unwrap();

        proj.update(3.0, Vec2::new(200.0, -50.0), proj.screen_rect);
        assert_eq!(proj.project(coord).unwrap(), before);
    }

    #[test]
    fn test_pan_and_zoom_move_screen_position() {
        let mut proj = MapProjection::new(39.0, -98.0);
        let center = Coordinate::new(39.0, -98.0);
        let east = Coordinate::new(39.0, -97.0);
        let rect = proj.screen_rect;

        let east_before = proj.geo_to_screen(east).unwrap();
        assert!(east_before.x > rect.center().x);

        proj.update(1.0, Vec2::new(200.0, 0.0), rect);
        assert_eq!(proj.geo_to_screen(center).unwrap(), Pos2::new(600.0, 300.0));

        proj.update(2.0, Vec2::ZERO, rect);
        let east_zoomed = proj.geo_to_screen(east).unwrap();
        let before = east_before.x - rect.center().x;
        let after = east_zoomed.x - rect.center().x;
        assert!((after - 2.0 * before).abs() < 1e-2);
    }

    #[test]
    fn test_screen_round_trip() {
        let mut proj = MapProjection::new(39.0, -98.0);
        proj.update(2.0, Vec2::new(15.0, -10.0), proj.screen_rect);

        let p = proj.project(Coordinate::new(40.0, -97.0)).unwrap();
        let back = proj.screen_to_plane(proj.plane_to_screen(p));

        // One plane unit is far below a pixel at this zoom
        assert!((back.x - p.x).abs() < 10.0);
        assert!((back.y - p.y).abs() < 10.0);
    }

    #[test]
    fn test_visible_rect_covers_screen() {
        let proj = MapProjection::new(39.0, -98.0);
        let rect = proj.visible_rect();

        let center = proj.project(Coordinate::new(39.0, -98.0)).unwrap();
        assert!((rect.center().x - center.x).abs() < 1.0);
        assert!((rect.center().y - center.y).abs() < 1.0);
        // 800x600 canvas: width spans 4/3 of the height
        assert!((rect.width() / rect.height() - 800.0 / 600.0).abs() < 1e-6);

        // Half the shorter edge spans range_deg of longitude
        let expected_half_height = proj.range_deg * proj.plane.units_per_degree();
        assert!((rect.height() / 2.0 - expected_half_height).abs() < 1.0);
    }
}
