//! egui implementation of the host canvas.
//!
//! Drawables are kept in the map plane, so they stay valid while the user
//! pans and zooms; the current [`MapProjection`] view is applied each time a
//! path is painted with an egui [`Painter`].

use super::canvas::MapCanvas;
use super::projection::{MapProjection, Projection, ProjectionError};
use super::types::{Coordinate, PlanePoint, PlaneRect};
use crate::overlay::{LineCap, LineJoin, OverlayStyle};
use egui::epaint::PathShape;
use egui::{Painter, Pos2, Shape, Stroke};

/// Squared screen distance below which consecutive points are merged.
const MIN_SEGMENT_DIST_SQ: f32 = 0.25;

/// A map plane path ready to be painted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanePath {
    pub points: Vec<PlanePoint>,
    pub closed: bool,
    /// Closed and convex, so egui can fill it
    pub convex: bool,
}

/// Builds a plane path from projected points.
///
/// Non-finite points and repeated points are dropped. Returns None if fewer
/// than two distinct points remain.
pub fn plane_path(points: &[PlanePoint], closed: bool) -> Option<PlanePath> {
    let mut kept: Vec<PlanePoint> = Vec::with_capacity(points.len());

    for p in points {
        if !(p.x.is_finite() && p.y.is_finite()) || kept.last() == Some(p) {
            continue;
        }
        kept.push(*p);
    }

    if kept.len() < 2 {
        return None;
    }

    let convex = closed && is_convex(&kept);
    Some(PlanePath {
        points: kept,
        closed,
        convex,
    })
}

/// Returns true if the ring turns the same way at every vertex and winds
/// around only once.
fn is_convex(ring: &[PlanePoint]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut turn = 0.0_f64;
    let mut x_flips = 0;
    let mut last_dx = 0.0_f64;

    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let c = ring[(i + 2) % n];

        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross != 0.0 {
            if turn != 0.0 && cross.signum() != turn.signum() {
                return false;
            }
            turn = cross;
        }

        let dx = b.x - a.x;
        if dx != 0.0 {
            if last_dx != 0.0 && dx.signum() != last_dx.signum() {
                x_flips += 1;
            }
            last_dx = dx;
        }
    }

    // Close the x direction cycle back to the first edge
    let first_dx = (0..n)
        .map(|i| ring[(i + 1) % n].x - ring[i].x)
        .find(|dx| *dx != 0.0)
        .unwrap_or(0.0);
    if first_dx != 0.0 && last_dx != 0.0 && first_dx.signum() != last_dx.signum() {
        x_flips += 1;
    }

    turn != 0.0 && x_flips <= 2
}

/// Pushes the end points of an open path outward by half the stroke width.
fn square_capped(points: &[Pos2], half_width: f32) -> Vec<Pos2> {
    let mut out = points.to_vec();
    let n = out.len();
    if n < 2 {
        return out;
    }

    let start_dir = (points[0] - points[1]).normalized();
    let end_dir = (points[n - 1] - points[n - 2]).normalized();
    out[0] += start_dir * half_width;
    out[n - 1] += end_dir * half_width;
    out
}

/// Converts a plane path into egui shapes for the current view.
///
/// egui tessellates strokes with mitered corners and flat ends, so round
/// caps and joins are drawn as discs of the stroke width, and square caps
/// extend the end segments. egui only fills convex paths; concave rings are
/// stroked without fill.
pub fn path_shapes(
    path: &PlanePath,
    projection: &MapProjection,
    style: &OverlayStyle,
) -> Vec<Shape> {
    let mut screen: Vec<Pos2> = Vec::with_capacity(path.points.len());
    for p in &path.points {
        let pos = projection.plane_to_screen(*p);
        if let Some(last) = screen.last() {
            if last.distance_sq(pos) < MIN_SEGMENT_DIST_SQ {
                continue;
            }
        }
        screen.push(pos);
    }

    if screen.len() < 2 {
        return Vec::new();
    }

    let half_width = style.line_width / 2.0;
    let stroke = Stroke::new(style.line_width, style.stroke_color);
    let mut shapes = Vec::new();

    if path.closed {
        let shape = if path.convex {
            PathShape::convex_polygon(screen.clone(), style.fill_color, stroke)
        } else {
            PathShape::closed_line(screen.clone(), stroke)
        };
        shapes.push(Shape::Path(shape));
    } else {
        let points = if style.line_cap == LineCap::Square {
            square_capped(&screen, half_width)
        } else {
            screen.clone()
        };
        shapes.push(Shape::Path(PathShape::line(points, stroke)));
    }

    if half_width <= 0.0 {
        return shapes;
    }

    if style.line_join == LineJoin::Round {
        let interior = if path.closed {
            &screen[..]
        } else {
            &screen[1..screen.len() - 1]
        };
        for p in interior {
            shapes.push(Shape::circle_filled(*p, half_width, style.stroke_color));
        }
    }

    if !path.closed && style.line_cap == LineCap::Round {
        for p in [screen[0], screen[screen.len() - 1]] {
            shapes.push(Shape::circle_filled(p, half_width, style.stroke_color));
        }
    }

    shapes
}

/// Host canvas over an egui painter.
pub struct EguiCanvas<'a> {
    painter: &'a Painter,
    projection: &'a MapProjection,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a Painter, projection: &'a MapProjection) -> Self {
        Self {
            painter,
            projection,
        }
    }
}

impl Projection for EguiCanvas<'_> {
    type Error = ProjectionError;

    fn project(&self, coord: Coordinate) -> Result<PlanePoint, ProjectionError> {
        self.projection.project(coord)
    }
}

impl MapCanvas for EguiCanvas<'_> {
    type Drawable = PlanePath;

    fn build_drawable(&self, points: &[PlanePoint], closed: bool) -> Option<PlanePath> {
        plane_path(points, closed)
    }

    fn paint(&mut self, path: &PlanePath, style: &OverlayStyle) {
        self.painter.extend(path_shapes(path, self.projection, style));
    }

    fn request_redraw(&mut self) {
        self.painter.ctx().request_repaint();
    }

    fn visible_rect(&self) -> Option<PlaneRect> {
        Some(self.projection.visible_rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{DynamicOverlayView, PolylineOverlay};
    use egui::{Color32, LayerId, RawInput, Vec2};
    use geo_types::Coord;

    /// Runs one egui pass with a canvas over the background layer and
    /// returns the shapes it emitted.
    fn paint_pass(projection: &MapProjection, mut f: impl FnMut(&mut EguiCanvas)) -> Vec<Shape> {
        let ctx = egui::Context::default();
        let output = ctx.run(RawInput::default(), |ctx| {
            let painter = ctx.layer_painter(LayerId::background());
            let mut canvas = EguiCanvas::new(&painter, projection);
            f(&mut canvas);
        });
        output.shapes.into_iter().map(|clipped| clipped.shape).collect()
    }

    fn count_circles(shapes: &[Shape]) -> usize {
        shapes
            .iter()
            .filter(|s| matches!(s, Shape::Circle(_)))
            .count()
    }

    fn paths(shapes: &[Shape]) -> Vec<&PathShape> {
        shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Path(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Three screen-separated points around the default view center.
    fn elbow(projection: &MapProjection) -> PlanePath {
        let coords = [
            Coordinate::new(0.0, -1.0),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
        ];
        let points: Vec<PlanePoint> = coords
            .iter()
            .map(|c| projection.project(*c).unwrap())
            .collect();
        plane_path(&points, false).unwrap()
    }

    fn style(cap: LineCap, join: LineJoin) -> OverlayStyle {
        OverlayStyle::new(Color32::RED, Color32::BLUE, cap, join)
    }

    #[test]
    fn test_plane_path_needs_two_points() {
        assert!(plane_path(&[], false).is_none());
        assert!(plane_path(&[Coord { x: 1.0, y: 1.0 }], false).is_none());

        // Repeats and non-finite points are dropped
        let points = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
            Coord {
                x: f64::NAN,
                y: 1.0,
            },
            Coord { x: 10.0, y: 0.0 },
        ];
        let path = plane_path(&points, true).unwrap();
        assert_eq!(path.points.len(), 2);
        assert!(path.closed);
        assert!(!path.convex);
    }

    #[test]
    fn test_convexity() {
        let square = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 4.0, y: 0.0 },
            Coord { x: 4.0, y: 4.0 },
            Coord { x: 0.0, y: 4.0 },
        ];
        assert!(is_convex(&square));

        // Notch cut into the top edge
        let notched = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 4.0, y: 0.0 },
            Coord { x: 4.0, y: 4.0 },
            Coord { x: 2.0, y: 1.0 },
            Coord { x: 0.0, y: 4.0 },
        ];
        assert!(!is_convex(&notched));

        // Pentagram: turns one way everywhere but winds twice
        let star: Vec<PlanePoint> = (0..5)
            .map(|i| {
                let a = (i * 2) as f64 * std::f64::consts::TAU / 5.0;
                Coord {
                    x: a.cos(),
                    y: a.sin(),
                }
            })
            .collect();
        assert!(!is_convex(&star));
    }

    #[test]
    fn test_concave_ring_is_stroked_not_filled() {
        let projection = MapProjection::default();
        let ring: Vec<PlanePoint> = [
            Coordinate::new(-1.0, -1.0),
            Coordinate::new(-1.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, -1.0),
        ]
        .iter()
        .map(|c| projection.project(*c).unwrap())
        .collect();

        let path = plane_path(&ring, true).unwrap();
        assert!(!path.convex);

        let shapes = path_shapes(&path, &projection, &style(LineCap::Butt, LineJoin::Miter));
        let drawn = paths(&shapes);
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0].closed);
        assert_eq!(drawn[0].fill, Color32::TRANSPARENT);

        // Dropping the notch makes it convex and filled
        let square = [ring[0], ring[1], ring[2], ring[4]];
        let path = plane_path(&square, true).unwrap();
        let shapes = path_shapes(&path, &projection, &style(LineCap::Butt, LineJoin::Miter));
        assert_eq!(paths(&shapes)[0].fill, Color32::RED);
    }

    #[test]
    fn test_square_cap_extends_ends() {
        let points = [Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0)];
        let capped = square_capped(&points, 2.0);

        assert_eq!(capped[0], Pos2::new(-2.0, 0.0));
        assert_eq!(capped[1], Pos2::new(12.0, 0.0));
    }

    #[test]
    fn test_paint_caps_and_joins() {
        let projection = MapProjection::default();
        let path = elbow(&projection);

        let round = paint_pass(&projection, |canvas| {
            canvas.paint(&path, &style(LineCap::Round, LineJoin::Round));
        });
        assert_eq!(paths(&round).len(), 1);
        assert!(!paths(&round)[0].closed);
        // One join disc at the elbow, two cap discs at the ends
        assert_eq!(count_circles(&round), 3);

        let butt = paint_pass(&projection, |canvas| {
            canvas.paint(&path, &style(LineCap::Butt, LineJoin::Miter));
        });
        assert_eq!(paths(&butt).len(), 1);
        assert_eq!(count_circles(&butt), 0);

        let square = paint_pass(&projection, |canvas| {
            canvas.paint(&path, &style(LineCap::Square, LineJoin::Bevel));
        });
        let line = paths(&square)[0];
        let plain = paths(&butt)[0];
        assert_eq!(count_circles(&square), 0);
        assert!(line.points[0].x < plain.points[0].x);
    }

    #[test]
    fn test_paint_closed_ring_with_round_joins() {
        let projection = MapProjection::default();
        let corners: Vec<PlanePoint> = [
            Coordinate::new(-1.0, -1.0),
            Coordinate::new(-1.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, -1.0),
        ]
        .iter()
        .map(|c| projection.project(*c).unwrap())
        .collect();
        let path = plane_path(&corners, true).unwrap();

        let shapes = paint_pass(&projection, |canvas| {
            canvas.paint(&path, &style(LineCap::Round, LineJoin::Round));
        });

        let drawn = paths(&shapes);
        assert_eq!(drawn.len(), 1);
        assert!(drawn[0].closed);
        assert_eq!(drawn[0].fill, Color32::RED);
        // Every corner is a join on a closed ring; no caps
        assert_eq!(count_circles(&shapes), 4);
    }

    #[test]
    fn test_cached_overlay_follows_pan() {
        let mut projection = MapProjection::new(39.0, -98.0);
        let rect = projection.screen_rect;
        let line = PolylineOverlay::new(vec![
            Coordinate::new(39.0, -98.0),
            Coordinate::new(39.5, -97.5),
        ]);
        let mut view: DynamicOverlayView<PlanePath> =
            DynamicOverlayView::new(style(LineCap::Butt, LineJoin::Miter));

        let first = paint_pass(&projection, |canvas| {
            view.draw(&line, canvas).unwrap();
        });
        assert_eq!(paths(&first)[0].points[0], Pos2::new(400.0, 300.0));

        projection.update(1.0, Vec2::new(200.0, 0.0), rect);
        let mut rebuilt = true;
        let second = paint_pass(&projection, |canvas| {
            rebuilt = view.draw(&line, canvas).unwrap().rebuilt;
        });

        assert!(!rebuilt);
        assert_eq!(view.rebuild_count(), 1);
        assert_eq!(paths(&second)[0].points[0], Pos2::new(600.0, 300.0));
    }

    #[test]
    fn test_cached_overlay_culled_only_when_offscreen() {
        let mut projection = MapProjection::new(39.0, -98.0);
        let rect = projection.screen_rect;
        let line = PolylineOverlay::new(vec![
            Coordinate::new(39.0, -98.0),
            Coordinate::new(39.5, -97.5),
        ]);
        let mut view: DynamicOverlayView<PlanePath> =
            DynamicOverlayView::new(style(LineCap::Butt, LineJoin::Miter));

        // Recenter far away: the overlay leaves the screen
        projection.center_lon = -80.0;
        let mut painted = true;
        paint_pass(&projection, |canvas| {
            painted = view.draw(&line, canvas).unwrap().painted;
        });
        assert!(!painted);

        // Pan it back into view without touching the points
        projection.center_lon = -98.0;
        projection.update(0.5, Vec2::ZERO, rect);
        let shapes = paint_pass(&projection, |canvas| {
            painted = view.draw(&line, canvas).unwrap().painted;
        });
        assert!(painted);
        assert_eq!(paths(&shapes).len(), 1);
        assert_eq!(view.rebuild_count(), 1);
    }

    #[test]
    fn test_sub_pixel_path_paints_nothing() {
        let mut projection = MapProjection::default();
        projection.update(1e-6, Vec2::ZERO, projection.screen_rect);
        let path = plane_path(
            &[Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }],
            false,
        )
        .unwrap();

        assert!(path_shapes(&path, &projection, &OverlayStyle::default()).is_empty());
    }

    #[test]
    fn test_request_redraw_reaches_context() {
        let projection = MapProjection::default();
        paint_pass(&projection, |canvas| canvas.request_redraw());
    }
}
