//! Live point sequence backing a dynamic overlay.

use crate::geo::{Coordinate, PointSource};

/// A mutable sequence of coordinates drawn as a line or closed shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolylineOverlay {
    points: Vec<Coordinate>,
    closed: bool,
}

impl PolylineOverlay {
    /// Creates an open polyline.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// Creates a closed shape; the last point connects back to the first.
    pub fn closed(points: Vec<Coordinate>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: Coordinate) {
        self.points.push(point);
    }

    /// Removes the point at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<Coordinate> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// Replaces the whole sequence.
    pub fn replace(&mut self, points: Vec<Coordinate>) {
        self.points = points;
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl PointSource for PolylineOverlay {
    fn current_points(&self) -> &[Coordinate] {
        &self.points
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
