//! Anti-aliased path coverage.
//!
//! Paths are flattened with `kurbo` and filled with the non-zero winding
//! rule, sampling four sub-scanlines per pixel row and integrating coverage
//! exactly along each sub-scanline.

use image::{GrayImage, Luma};
use kurbo::{BezPath, PathEl, Point, Shape as _};

const SUBSAMPLES: usize = 4;

/// Coverage in [0, 1] for a rectangle of device pixels. The origin may lie
/// outside the target image; compositing clips.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub x: i64,
    pub y: i64,
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl Mask {
    pub fn coverage(&self, col: usize, row: usize) -> f32 {
        self.data[row * self.width + col]
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|c| *c <= 0.0)
    }

    /// Copy moved by whole pixels.
    pub fn offset(&self, dx: i64, dy: i64) -> Mask {
        Mask {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Gaussian blur with standard deviation `sigma` pixels. The mask grows
    /// by three sigma on every side.
    pub fn blurred(&self, sigma: f64) -> Mask {
        if !(sigma > 0.05) {
            return self.clone();
        }
        let pad = (sigma * 3.0).ceil() as usize;
        let w = self.width + 2 * pad;
        let h = self.height + 2 * pad;
        let mut gray = GrayImage::new(w as u32, h as u32);
        for row in 0..self.height {
            for col in 0..self.width {
                let v = (self.coverage(col, row).clamp(0.0, 1.0) * 255.0).round() as u8;
                gray.put_pixel((col + pad) as u32, (row + pad) as u32, Luma([v]));
            }
        }
        let blurred = imageproc::filter::gaussian_blur_f32(&gray, sigma as f32);
        Mask {
            x: self.x - pad as i64,
            y: self.y - pad as i64,
            width: w,
            height: h,
            data: blurred.pixels().map(|p| p.0[0] as f32 / 255.0).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    /// +1 for downward edges, -1 for upward ones.
    winding: i32,
}

impl Edge {
    fn new(a: Point, b: Point) -> Option<Edge> {
        if (a.y - b.y).abs() < 1e-12 {
            return None;
        }
        let (top, bottom, winding) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
        Some(Edge {
            x0: top.x,
            y0: top.y,
            x1: bottom.x,
            y1: bottom.y,
            winding,
        })
    }

    fn x_at(&self, y: f64) -> f64 {
        self.x0 + (self.x1 - self.x0) * (y - self.y0) / (self.y1 - self.y0)
    }
}

/// Maximum flattening error in device pixels.
const FLATTEN_TOLERANCE: f64 = 0.2;

/// Flatten a path into polygons. Every subpath is treated as closed.
fn flatten(path: &BezPath) -> Vec<Vec<Point>> {
    let mut polygons = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut start = Point::ZERO;
    path.flatten(FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            if current.len() >= 2 {
                polygons.push(std::mem::take(&mut current));
            }
            current.clear();
            current.push(p);
            start = p;
        }
        PathEl::LineTo(p) => current.push(p),
        PathEl::ClosePath => {
            if current.len() >= 2 {
                polygons.push(std::mem::take(&mut current));
            }
            current.clear();
            current.push(start);
        }
        _ => {}
    });
    if current.len() >= 2 {
        polygons.push(current);
    }
    polygons
}

/// Rasterize a device-space path onto a `clip_w × clip_h` target.
/// Returns `None` when nothing lands on the target.
pub fn rasterize(path: &BezPath, clip_w: u32, clip_h: u32) -> Option<Mask> {
    if path.is_empty() {
        return None;
    }
    let bbox = path.bounding_box();
    if !(bbox.x0.is_finite() && bbox.y0.is_finite() && bbox.x1.is_finite() && bbox.y1.is_finite()) {
        return None;
    }
    let x0 = (bbox.x0.floor() as i64).max(0);
    let y0 = (bbox.y0.floor() as i64).max(0);
    let x1 = (bbox.x1.ceil() as i64).min(clip_w as i64);
    let y1 = (bbox.y1.ceil() as i64).min(clip_h as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    let width = (x1 - x0) as usize;
    let height = (y1 - y0) as usize;

    let mut edges: Vec<Edge> = Vec::new();
    for polygon in flatten(path) {
        for i in 0..polygon.len() {
            let a = polygon[i];
            let b = polygon[(i + 1) % polygon.len()];
            edges.extend(Edge::new(a, b));
        }
    }
    edges.sort_by(|a, b| a.y0.total_cmp(&b.y0));

    let mut data = vec![0.0f32; width * height];
    let mut active: Vec<Edge> = Vec::new();
    let mut next = 0usize;
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    let weight = 1.0 / SUBSAMPLES as f32;

    for row in 0..height {
        let line = &mut data[row * width..(row + 1) * width];
        for s in 0..SUBSAMPLES {
            let y = (y0 + row as i64) as f64 + (s as f64 + 0.5) / SUBSAMPLES as f64;
            while next < edges.len() && edges[next].y0 <= y {
                active.push(edges[next]);
                next += 1;
            }
            active.retain(|e| e.y1 > y);

            crossings.clear();
            crossings.extend(
                active
                    .iter()
                    .filter(|e| e.y0 <= y)
                    .map(|e| (e.x_at(y) - x0 as f64, e.winding)),
            );
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding != 0 {
                    add_span(line, pair[0].0, pair[1].0, weight);
                }
            }
        }
    }

    for c in &mut data {
        *c = c.min(1.0);
    }
    Some(Mask {
        x: x0,
        y: y0,
        width,
        height,
        data,
    })
}

/// Add `weight` × horizontal coverage of `[xa, xb)` to a row.
fn add_span(row: &mut [f32], xa: f64, xb: f64, weight: f32) {
    let w = row.len() as f64;
    let xa = xa.clamp(0.0, w);
    let xb = xb.clamp(0.0, w);
    if xb <= xa {
        return;
    }
    let ia = xa.floor() as usize;
    let ib = xb.floor() as usize;
    if ia == ib {
        row[ia] += (xb - xa) as f32 * weight;
        return;
    }
    row[ia] += ((ia + 1) as f64 - xa) as f32 * weight;
    for c in &mut row[ia + 1..ib] {
        *c += weight;
    }
    if ib < row.len() {
        row[ib] += (xb - ib as f64) as f32 * weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Shape as _};

    fn square(x: f64, y: f64, s: f64) -> BezPath {
        Rect::new(x, y, x + s, y + s).to_path(0.1)
    }

    /// Same square wound the other way.
    fn square_reversed(x: f64, y: f64, s: f64) -> BezPath {
        let mut path = BezPath::new();
        path.move_to((x, y));
        path.line_to((x, y + s));
        path.line_to((x + s, y + s));
        path.line_to((x + s, y));
        path.close_path();
        path
    }

    fn union(a: BezPath, b: BezPath) -> BezPath {
        let mut path = a;
        path.extend(b);
        path
    }

    #[test]
    fn test_pixel_aligned_square_is_fully_covered() {
        let mask = rasterize(&square(2.0, 3.0, 4.0), 10, 10).unwrap();
        assert_eq!((mask.x, mask.y, mask.width, mask.height), (2, 3, 4, 4));
        assert!(mask.data.iter().all(|c| (*c - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_half_pixel_edge_gives_partial_coverage() {
        let mask = rasterize(&square(0.5, 0.0, 2.0), 10, 10).unwrap();
        assert_eq!(mask.width, 3);
        assert!((mask.coverage(0, 0) - 0.5).abs() < 1e-6);
        assert!((mask.coverage(1, 0) - 1.0).abs() < 1e-6);
        assert!((mask.coverage(2, 0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reversed_inner_subpath_cuts_a_hole() {
        let path = union(square(0.0, 0.0, 6.0), square_reversed(2.0, 2.0, 2.0));
        let mask = rasterize(&path, 10, 10).unwrap();
        assert!(mask.coverage(3, 3) < 1e-6);
        assert!((mask.coverage(0, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_direction_overlap_stays_filled() {
        let path = union(square(0.0, 0.0, 4.0), square(1.0, 1.0, 2.0));
        let mask = rasterize(&path, 10, 10).unwrap();
        assert!((mask.coverage(2, 2) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_open_subpath_is_closed_implicitly() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((4.0, 0.0));
        path.line_to((4.0, 4.0));
        path.line_to((0.0, 4.0));
        let mask = rasterize(&path, 10, 10).unwrap();
        assert!((mask.coverage(1, 1) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_off_target_shapes_are_clipped_away() {
        assert!(rasterize(&square(20.0, 20.0, 4.0), 10, 10).is_none());
        assert!(rasterize(&BezPath::new(), 10, 10).is_none());
        let mask = rasterize(&square(-2.0, -2.0, 4.0), 10, 10).unwrap();
        assert_eq!((mask.x, mask.y, mask.width, mask.height), (0, 0, 2, 2));
    }

    #[test]
    fn test_blur_spreads_coverage() {
        let mask = rasterize(&square(4.0, 4.0, 2.0), 10, 10).unwrap();
        let blurred = mask.blurred(1.0);
        assert_eq!(blurred.x, 1);
        assert_eq!(blurred.width, 8);
        let total: f32 = blurred.data.iter().sum();
        assert!((total - 4.0).abs() < 0.4);
        assert!(blurred.coverage(0, 3) < blurred.coverage(3, 3));
    }
}
