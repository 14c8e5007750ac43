//! Named geographic regions.
//!
//! A [`Region`] pairs a polygon boundary with arbitrary metadata (typically
//! gazetteer attributes from a lookup service). Its projected geometry is
//! derived once at construction and kept in a separate [`RegionGeometry`]
//! value; replacing the source coordinates afterwards does not re-derive it.

use crate::geo::{
    rects_intersect, Coordinate, Envelope, PlaneBounds, PlanePoint, PlaneRect, Projection,
};
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata attached to a region. Values are opaque to this crate.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Classification of a region, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    /// Built from a rectangular envelope (bounding box or radius search area)
    Envelope,
    /// Built from a free-form coordinate ring
    Polygon,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Envelope => write!(f, "envelope"),
            RegionKind::Polygon => write!(f, "polygon"),
        }
    }
}

/// Projected geometry of a region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
    vertices: Vec<PlanePoint>,
    bounds: PlaneRect,
    center: Coordinate,
}

impl RegionGeometry {
    /// Projects a coordinate ring and computes its bounding rectangle.
    ///
    /// Every coordinate is projected on its own, in input order. The
    /// bounding rectangle is accumulated in the same pass from the finite
    /// projected points; if there are none, the bounds collapse to a zero
    /// rectangle at the plane origin. Projection errors are returned as-is.
    pub fn derive<P: Projection>(coords: &[Coordinate], projection: &P) -> Result<Self, P::Error> {
        let mut vertices = Vec::with_capacity(coords.len());
        let mut bounds = PlaneBounds::default();

        for coord in coords {
            let p = projection.project(*coord)?;
            bounds.include(p);
            vertices.push(p);
        }

        let bounds = bounds.finish().unwrap_or(PlaneRect::new(
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ));
        let center = Envelope::from_coordinates(coords)
            .map(|env| env.center())
            .unwrap_or(Coordinate::new(0.0, 0.0));

        Ok(Self {
            vertices,
            bounds,
            center,
        })
    }

    /// Projected ring vertices; the closing edge back to the first vertex
    /// is implicit.
    pub fn vertices(&self) -> &[PlanePoint] {
        &self.vertices
    }

    /// Tight plane rectangle around the projected vertices.
    pub fn bounds(&self) -> PlaneRect {
        self.bounds
    }

    /// Geographic center of the coordinates the geometry was derived from.
    pub fn center(&self) -> Coordinate {
        self.center
    }
}

/// A geographic region with attached metadata.
#[derive(Debug, Clone)]
pub struct Region {
    metadata: Metadata,
    kind: RegionKind,
    geometry: RegionGeometry,
    coordinates: Vec<Coordinate>,
    /// Set once `coordinates` no longer match `geometry`
    geometry_stale: bool,
}

impl Region {
    /// Creates an envelope region.
    ///
    /// The source coordinates become the envelope's corner ring,
    /// counter-clockwise from the south-west corner. Degenerate envelopes are
    /// accepted and produce a line or point bounding shape.
    pub fn from_envelope<P: Projection>(
        envelope: Envelope,
        metadata: Metadata,
        projection: &P,
    ) -> Result<Self, P::Error> {
        Self::build(
            RegionKind::Envelope,
            envelope.corners().to_vec(),
            metadata,
            projection,
        )
    }

    /// Creates a polygon region from a coordinate ring.
    ///
    /// A trailing copy of the first coordinate is dropped: rings are stored
    /// implicitly closed on both construction paths.
    pub fn from_ring<P: Projection>(
        mut coordinates: Vec<Coordinate>,
        metadata: Metadata,
        projection: &P,
    ) -> Result<Self, P::Error> {
        if coordinates.len() > 1 && coordinates.first() == coordinates.last() {
            coordinates.pop();
        }
        Self::build(RegionKind::Polygon, coordinates, metadata, projection)
    }

    fn build<P: Projection>(
        kind: RegionKind,
        coordinates: Vec<Coordinate>,
        metadata: Metadata,
        projection: &P,
    ) -> Result<Self, P::Error> {
        let geometry = RegionGeometry::derive(&coordinates, projection)?;
        log::debug!(
            "Built {} region with {} vertices, {} metadata keys",
            kind,
            geometry.vertices.len(),
            metadata.len()
        );

        Ok(Self {
            metadata,
            kind,
            geometry,
            coordinates,
            geometry_stale: false,
        })
    }

    /// Reconstructs the region from its current coordinates.
    ///
    /// Kind and metadata carry over. This is the only way to bring the
    /// geometry back in line after [`Region::set_coordinates`].
    pub fn rebuild<P: Projection>(self, projection: &P) -> Result<Self, P::Error> {
        Self::build(self.kind, self.coordinates, self.metadata, projection)
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn geometry(&self) -> &RegionGeometry {
        &self.geometry
    }

    /// Plane rectangle enclosing the construction-time polygon.
    pub fn bounding_shape(&self) -> PlaneRect {
        self.geometry.bounds
    }

    pub fn polygon_vertices(&self) -> &[PlanePoint] {
        &self.geometry.vertices
    }

    /// Geographic center of the construction-time polygon.
    pub fn center(&self) -> Coordinate {
        self.geometry.center
    }

    /// Returns true if the bounding shape overlaps the given plane rectangle.
    pub fn intersects(&self, rect: &PlaneRect) -> bool {
        rects_intersect(&self.geometry.bounds, rect)
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Replaces the source coordinates.
    ///
    /// The derived geometry is NOT updated; it stays fixed to the shape the
    /// region was built with until [`Region::rebuild`] is called.
    pub fn set_coordinates(&mut self, coordinates: Vec<Coordinate>) {
        log::debug!(
            "Replacing {} region coordinates ({} -> {}); geometry left unchanged",
            self.kind,
            self.coordinates.len(),
            coordinates.len()
        );
        self.coordinates = coordinates;
        self.geometry_stale = true;
    }

    /// Returns true if the coordinates were replaced since construction.
    pub fn has_stale_geometry(&self) -> bool {
        self.geometry_stale
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }
}
