//! Dynamic overlay view.
//!
//! Keeps a drawable built from an overlay's points and rebuilds it only when
//! those points change. Style lives in separate state and is applied on
//! every paint, so restyling never touches the cached geometry.

use super::style::{LineCap, LineJoin, OverlayStyle};
use crate::geo::{rects_intersect, Coordinate, MapCanvas, PlaneBounds, PlaneRect, PointSource};
use egui::Color32;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Identity of a point sequence: its length plus a hash over the exact bit
/// patterns of every coordinate and the closed flag.
///
/// The signature comes from the standard library's `DefaultHasher`, whose
/// output may change between Rust releases. Compare fingerprints only within
/// one process; never persist or transmit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointFingerprint {
    pub count: usize,
    pub signature: u64,
}

impl PointFingerprint {
    pub fn of(points: &[Coordinate], closed: bool) -> Self {
        let mut hasher = DefaultHasher::new();
        closed.hash(&mut hasher);
        for p in points {
            p.latitude.to_bits().hash(&mut hasher);
            p.longitude.to_bits().hash(&mut hasher);
        }

        Self {
            count: points.len(),
            signature: hasher.finish(),
        }
    }
}

/// Cached drawable geometry.
#[derive(Debug, Clone)]
pub enum GeometryCache<D> {
    /// Nothing built yet, or the points changed since the last build
    Empty,
    /// Built from the point sequence identified by `fingerprint`.
    /// `drawable` is None when the points could not form a shape.
    Cached {
        fingerprint: PointFingerprint,
        drawable: Option<D>,
        bounds: Option<PlaneRect>,
    },
}

/// Result of a draw request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOutcome {
    /// The drawable was rebuilt from the live points
    pub rebuilt: bool,
    /// Something was painted into the canvas
    pub painted: bool,
}

/// An overlay renderer that redraws itself properly when its points change.
#[derive(Debug, Clone)]
pub struct DynamicOverlayView<D> {
    style: OverlayStyle,
    cache: GeometryCache<D>,
    rebuild_count: u64,
}

impl<D> Default for DynamicOverlayView<D> {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

impl<D> DynamicOverlayView<D> {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            style,
            cache: GeometryCache::Empty,
            rebuild_count: 0,
        }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: OverlayStyle) {
        self.style = style;
    }

    pub fn fill_color(&self) -> Color32 {
        self.style.fill_color
    }

    pub fn set_fill_color(&mut self, color: Color32) {
        self.style.fill_color = color;
    }

    pub fn stroke_color(&self) -> Color32 {
        self.style.stroke_color
    }

    pub fn set_stroke_color(&mut self, color: Color32) {
        self.style.stroke_color = color;
    }

    pub fn line_cap(&self) -> LineCap {
        self.style.line_cap
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.style.line_cap = cap;
    }

    pub fn line_join(&self) -> LineJoin {
        self.style.line_join
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.style.line_join = join;
    }

    pub fn line_width(&self) -> f32 {
        self.style.line_width
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.style.line_width = width;
    }

    /// Replaces the style and asks the host for a redraw. The cached
    /// geometry is kept.
    pub fn restyle<C: MapCanvas<Drawable = D>>(&mut self, style: OverlayStyle, canvas: &mut C) {
        self.style = style;
        canvas.request_redraw();
    }

    /// Signals that the overlay's points were added, removed or replaced.
    pub fn points_changed<C: MapCanvas<Drawable = D>>(&mut self, canvas: &mut C) {
        self.invalidate();
        canvas.request_redraw();
    }

    /// Drops the cached geometry.
    pub fn invalidate(&mut self) {
        if self.is_cached() {
            log::debug!("Invalidating overlay geometry cache");
        }
        self.cache = GeometryCache::Empty;
    }

    pub fn is_cached(&self) -> bool {
        matches!(self.cache, GeometryCache::Cached { .. })
    }

    pub fn cache(&self) -> &GeometryCache<D> {
        &self.cache
    }

    /// Number of times the drawable has been built.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Draws the overlay's live points into the canvas.
    ///
    /// The drawable is rebuilt when nothing is cached or the live points no
    /// longer match the cached fingerprint; otherwise the cached drawable is
    /// reused and painted with the current style. Fewer than two points, a
    /// shape entirely outside the visible area, or an invisible style paint
    /// nothing. Projection errors leave the cache empty and are returned
    /// unchanged.
    pub fn draw<S, C>(&mut self, source: &S, canvas: &mut C) -> Result<DrawOutcome, C::Error>
    where
        S: PointSource + ?Sized,
        C: MapCanvas<Drawable = D>,
    {
        let points = source.current_points();
        let closed = source.is_closed();
        let fingerprint = PointFingerprint::of(points, closed);

        let fresh = matches!(
            &self.cache,
            GeometryCache::Cached { fingerprint: cached, .. } if *cached == fingerprint
        );
        if !fresh {
            self.rebuild(points, closed, fingerprint, canvas)?;
        }

        let GeometryCache::Cached {
            drawable: Some(drawable),
            bounds,
            ..
        } = &self.cache
        else {
            return Ok(DrawOutcome {
                rebuilt: !fresh,
                painted: false,
            });
        };

        if let (Some(visible), Some(bounds)) = (canvas.visible_rect(), bounds) {
            if !rects_intersect(bounds, &visible) {
                log::trace!("Overlay outside visible area, skipping paint");
                return Ok(DrawOutcome {
                    rebuilt: !fresh,
                    painted: false,
                });
            }
        }

        if self.style.is_invisible() {
            return Ok(DrawOutcome {
                rebuilt: !fresh,
                painted: false,
            });
        }

        canvas.paint(drawable, &self.style);
        Ok(DrawOutcome {
            rebuilt: !fresh,
            painted: true,
        })
    }

    fn rebuild<C: MapCanvas<Drawable = D>>(
        &mut self,
        points: &[Coordinate],
        closed: bool,
        fingerprint: PointFingerprint,
        canvas: &C,
    ) -> Result<(), C::Error> {
        self.cache = GeometryCache::Empty;

        let mut projected = Vec::with_capacity(points.len());
        let mut bounds = PlaneBounds::default();
        for coord in points {
            let p = canvas.project(*coord)?;
            bounds.include(p);
            projected.push(p);
        }

        let drawable = if projected.len() >= 2 {
            canvas.build_drawable(&projected, closed)
        } else {
            None
        };

        self.rebuild_count += 1;
        log::debug!(
            "Rebuilt overlay geometry: {} points, drawable {}",
            fingerprint.count,
            if drawable.is_some() { "built" } else { "empty" }
        );

        self.cache = GeometryCache::Cached {
            fingerprint,
            drawable,
            bounds: bounds.finish(),
        };
        Ok(())
    }
}
