//! Drawable shapes on top of `kurbo` paths.
//!
//! Shapes are described in the local coordinates of whatever transform is
//! current when they are drawn. [`Shape::to_path`] and
//! [`Shape::stroke_path`] turn them into `kurbo` Bézier paths that the
//! rasterizer flattens and fills with the non-zero winding rule.

use std::f64::consts::TAU;

use kurbo::{Arc, BezPath, Cap, Circle, Join, Rect, Shape as _, Stroke, StrokeOpts, Vec2};
use serde::Serialize;

pub use kurbo::{Affine, Point};

/// Geometric-mean scale of a transform, used to size strokes, blur and
/// flattening tolerance.
pub fn scale_factor(affine: &Affine) -> f64 {
    affine.determinant().abs().sqrt()
}

/// How stroke ends are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
}

impl StrokeStyle {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            cap: LineCap::Butt,
        }
    }

    pub fn round(width: f64) -> Self {
        Self {
            width,
            cap: LineCap::Round,
        }
    }

    /// Round caps get round joins; everything else joins with a miter.
    fn to_kurbo(self) -> Stroke {
        let (cap, join) = match self.cap {
            LineCap::Butt => (Cap::Butt, Join::Miter),
            LineCap::Round => (Cap::Round, Join::Round),
            LineCap::Square => (Cap::Square, Join::Miter),
        };
        Stroke::new(self.width).with_caps(cap).with_join(join)
    }
}

/// Something that can be filled or stroked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned rectangle with uniformly rounded corners.
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
    },
    Circle { cx: f64, cy: f64, r: f64 },
    /// Annular sector. Angles in radians, sweeping clockwise on screen.
    /// An `inner` radius of zero gives a pie slice.
    Sector {
        cx: f64,
        cy: f64,
        outer: f64,
        inner: f64,
        start: f64,
        sweep: f64,
    },
    /// Closed polygon.
    Polygon(Vec<Point>),
    /// Open path. Filling closes it implicitly.
    Polyline(Vec<Point>),
    /// Arbitrary outline (glyph runs).
    Path(BezPath),
}

impl Shape {
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Shape::Rect {
            x,
            y,
            w,
            h,
            radius: 0.0,
        }
    }

    /// Whether the shape can cover any area or length at all.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Shape::Rect { w, h, .. } => !(*w > 0.0 && *h > 0.0),
            Shape::Circle { r, .. } => !(*r > 0.0),
            Shape::Sector {
                outer, inner, sweep, ..
            } => !(*outer > *inner && sweep.abs() > 0.0),
            Shape::Polygon(pts) => pts.len() < 3,
            Shape::Polyline(pts) => pts.len() < 2,
            Shape::Path(path) => path.elements().len() < 2,
        }
    }

    /// Outline as a Bézier path. `tolerance` bounds the error of curve
    /// approximations, in local units. Degenerate shapes give an empty path.
    pub fn to_path(&self, tolerance: f64) -> BezPath {
        if self.is_degenerate() {
            return BezPath::new();
        }
        match self {
            Shape::Rect { x, y, w, h, radius } => {
                let rect = Rect::new(*x, *y, x + w, y + h);
                let radius = radius.clamp(0.0, w.min(*h) / 2.0);
                if radius > 0.0 {
                    rect.to_rounded_rect(radius).to_path(tolerance)
                } else {
                    rect.to_path(tolerance)
                }
            }
            Shape::Circle { cx, cy, r } => Circle::new((*cx, *cy), *r).to_path(tolerance),
            Shape::Sector {
                cx,
                cy,
                outer,
                inner,
                start,
                sweep,
            } => sector_path(Point::new(*cx, *cy), *outer, *inner, *start, *sweep, tolerance),
            Shape::Polygon(pts) => polyline_path(pts, true),
            Shape::Polyline(pts) => polyline_path(pts, false),
            Shape::Path(path) => path.clone(),
        }
    }

    /// Outline covering the stroke of this shape, ready to be filled.
    pub fn stroke_path(&self, style: &StrokeStyle, tolerance: f64) -> BezPath {
        if !(style.width > 0.0) || self.is_degenerate() {
            return BezPath::new();
        }
        let outline = self.to_path(tolerance);
        kurbo::stroke(outline.elements().iter().copied(), &style.to_kurbo(), &StrokeOpts::default(), tolerance)
    }
}

fn polyline_path(pts: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = pts.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
        if closed {
            path.close_path();
        }
    }
    path
}

fn arc(center: Point, r: f64, start: f64, sweep: f64) -> Arc {
    Arc {
        center,
        radii: Vec2::new(r, r),
        start_angle: start,
        sweep_angle: sweep,
        x_rotation: 0.0,
    }
}

fn polar(center: Point, r: f64, angle: f64) -> Point {
    center + Vec2::from_angle(angle) * r
}

fn sector_path(center: Point, outer: f64, inner: f64, start: f64, sweep: f64, tolerance: f64) -> BezPath {
    let sweep = sweep.clamp(-TAU, TAU);
    let full = (sweep.abs() - TAU).abs() < 1e-9;
    let mut path = BezPath::new();

    path.move_to(polar(center, outer, start));
    path.extend(arc(center, outer, start, sweep).append_iter(tolerance));
    if inner > 0.0 {
        if full {
            // full ring: the inner circle is its own subpath, wound the
            // other way so it cuts a hole
            path.close_path();
            path.move_to(polar(center, inner, start));
            path.extend(arc(center, inner, start, -sweep).append_iter(tolerance));
        } else {
            path.line_to(polar(center, inner, start + sweep));
            path.extend(arc(center, inner, start + sweep, -sweep).append_iter(tolerance));
        }
    } else if !full {
        path.line_to(center);
    }
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;
    use std::f64::consts::PI;

    fn area(shape: &Shape) -> f64 {
        shape.to_path(0.01).area().abs()
    }

    #[test]
    fn test_rounded_rect_area_close_to_exact() {
        let shape = Shape::Rect {
            x: 0.0,
            y: 0.0,
            w: 100.0,
            h: 50.0,
            radius: 10.0,
        };
        let exact = 100.0 * 50.0 - (4.0 - PI) * 100.0;
        assert!((area(&shape) - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_radius_clamped_to_half_side() {
        let shape = Shape::Rect {
            x: 0.0,
            y: 0.0,
            w: 20.0,
            h: 20.0,
            radius: 50.0,
        };
        assert!((area(&shape) - PI * 100.0).abs() < 1.0);
    }

    #[test]
    fn test_degenerate_shapes_produce_nothing() {
        assert!(Shape::rect(0.0, 0.0, 0.0, 10.0).to_path(0.1).is_empty());
        assert!(Shape::Circle { cx: 0.0, cy: 0.0, r: 0.0 }.to_path(0.1).is_empty());
        assert!(Shape::Polyline(vec![Point::new(1.0, 1.0)])
            .stroke_path(&StrokeStyle::new(4.0), 0.1)
            .is_empty());
        assert!(Shape::rect(0.0, 0.0, 10.0, 10.0)
            .stroke_path(&StrokeStyle::new(0.0), 0.1)
            .is_empty());
    }

    #[test]
    fn test_donut_half_ring_area() {
        let shape = Shape::Sector {
            cx: 0.0,
            cy: 0.0,
            outer: 10.0,
            inner: 6.0,
            start: -PI / 2.0,
            sweep: PI,
        };
        let exact = 0.5 * PI * (100.0 - 36.0);
        assert!((area(&shape) - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_full_ring_cuts_a_hole() {
        let shape = Shape::Sector {
            cx: 0.0,
            cy: 0.0,
            outer: 10.0,
            inner: 6.0,
            start: 0.0,
            sweep: TAU,
        };
        let exact = PI * (100.0 - 36.0);
        assert!((area(&shape) - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_pie_slice_area() {
        let shape = Shape::Sector {
            cx: 5.0,
            cy: 5.0,
            outer: 10.0,
            inner: 0.0,
            start: 0.0,
            sweep: PI / 2.0,
        };
        let exact = PI * 100.0 / 4.0;
        assert!((area(&shape) - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_polyline_stroke_covers_its_length() {
        let line = Shape::Polyline(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        let butt = line.stroke_path(&StrokeStyle::new(10.0), 0.01);
        let bbox = butt.bounding_box();
        assert!((bbox.width() - 100.0).abs() < 1e-6);
        assert!((bbox.height() - 10.0).abs() < 1e-6);
        // round caps reach half the width past each end
        let round = line.stroke_path(&StrokeStyle::round(10.0), 0.01).bounding_box();
        assert!((round.width() - 110.0).abs() < 0.1);
    }

    #[test]
    fn test_scale_factor_is_geometric_mean() {
        let m = Affine::translate((5.0, 7.0)) * Affine::rotate(0.3) * Affine::scale_non_uniform(2.0, 8.0);
        assert!((scale_factor(&m) - 4.0).abs() < 1e-9);
    }
}
