//! Geographic and map-plane value types.

use geo_types::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// A point in the host's projected map plane.
pub type PlanePoint = Coord<f64>;

/// An axis-aligned rectangle in the host's projected map plane.
pub type PlaneRect = Rect<f64>;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true if both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(c: Coordinate) -> Self {
        Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(c: Coord<f64>) -> Self {
        Coordinate::new(c.y, c.x)
    }
}

/// An axis-aligned rectangle in geographic coordinates.
///
/// Always normalized: `min` holds the southern/western edges and `max` the
/// northern/eastern ones, whatever order the corners were supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    min: Coordinate,
    max: Coordinate,
}

impl Envelope {
    /// Creates an envelope from two opposite corners, in any order.
    pub fn new(a: Coordinate, b: Coordinate) -> Self {
        Self {
            min: Coordinate::new(a.latitude.min(b.latitude), a.longitude.min(b.longitude)),
            max: Coordinate::new(a.latitude.max(b.latitude), a.longitude.max(b.longitude)),
        }
    }

    /// Returns the tightest envelope around the given coordinates.
    pub fn from_coordinates(coords: &[Coordinate]) -> Option<Self> {
        let first = *coords.first()?;
        Some(
            coords[1..]
                .iter()
                .fold(Envelope::new(first, first), |env, c| Envelope {
                    min: Coordinate::new(
                        env.min.latitude.min(c.latitude),
                        env.min.longitude.min(c.longitude),
                    ),
                    max: Coordinate::new(
                        env.max.latitude.max(c.latitude),
                        env.max.longitude.max(c.longitude),
                    ),
                }),
        )
    }

    pub fn south(&self) -> f64 {
        self.min.latitude
    }

    pub fn north(&self) -> f64 {
        self.max.latitude
    }

    pub fn west(&self) -> f64 {
        self.min.longitude
    }

    pub fn east(&self) -> f64 {
        self.max.longitude
    }

    /// South-west corner.
    pub fn min(&self) -> Coordinate {
        self.min
    }

    /// North-east corner.
    pub fn max(&self) -> Coordinate {
        self.max
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min.latitude + self.max.latitude) / 2.0,
            (self.min.longitude + self.max.longitude) / 2.0,
        )
    }

    /// The corner ring, counter-clockwise from the south-west corner.
    ///
    /// The ring is implicitly closed; the first corner is not repeated.
    pub fn corners(&self) -> [Coordinate; 4] {
        [
            Coordinate::new(self.south(), self.west()),
            Coordinate::new(self.south(), self.east()),
            Coordinate::new(self.north(), self.east()),
            Coordinate::new(self.north(), self.west()),
        ]
    }
}

/// Running min/max of plane points, accumulated one point at a time.
///
/// Non-finite points are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaneBounds {
    extent: Option<(PlanePoint, PlanePoint)>,
}

impl PlaneBounds {
    pub fn include(&mut self, p: PlanePoint) {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return;
        }
        self.extent = Some(match self.extent {
            None => (p, p),
            Some((min, max)) => (
                Coord {
                    x: min.x.min(p.x),
                    y: min.y.min(p.y),
                },
                Coord {
                    x: max.x.max(p.x),
                    y: max.y.max(p.y),
                },
            ),
        });
    }

    /// The enclosing rectangle, or None if no finite point was included.
    pub fn finish(self) -> Option<PlaneRect> {
        self.extent.map(|(min, max)| Rect::new(min, max))
    }
}

/// Returns true if two plane rectangles overlap or touch.
///
/// Edges are inclusive so degenerate (line or point) rectangles still
/// intersect anything they lie on.
pub fn rects_intersect(a: &PlaneRect, b: &PlaneRect) -> bool {
    !(a.max().x < b.min().x
        || a.min().x > b.max().x
        || a.max().y < b.min().y
        || a.min().y > b.max().y)
}
