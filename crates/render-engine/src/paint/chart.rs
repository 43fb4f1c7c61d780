//! Bar, line, pie and donut charts.

use std::f64::consts::{PI, TAU};

use instavid_project_model::{ChartContent, ChartKind, Color, DataPoint, TextAlign};

use crate::geometry::{Point, Shape, StrokeStyle};
use crate::surface::{FontSpec, Paint, Surface, TextBaseline};

const BAR_PADDING: f64 = 40.0;
const BAR_GAP: f64 = 20.0;
const BAR_RADIUS: f64 = 8.0;
const LINE_PADDING: f64 = 50.0;
const LINE_WIDTH: f64 = 4.0;
const DONUT_HOLE: f64 = 0.6;

pub fn paint_chart(surface: &mut dyn Surface, chart: &ChartContent, eased: f64, w: f64, h: f64) {
    match chart.kind {
        ChartKind::Bar => paint_bars(surface, &chart.data, eased, w, h),
        ChartKind::Line => paint_line(surface, &chart.data, chart.line_color, eased, w, h),
        ChartKind::Pie => paint_pie(surface, &chart.data, eased, w, h, false),
        ChartKind::Donut => paint_pie(surface, &chart.data, eased, w, h, true),
    }
}

fn max_value(data: &[DataPoint]) -> f64 {
    data.iter().map(|d| d.value).fold(0.0, f64::max)
}

/// Bar rectangle `(x, y, width, height)` for item `index`.
pub fn bar_geometry(data: &[DataPoint], index: usize, eased: f64, w: f64, h: f64) -> (f64, f64, f64, f64) {
    let n = data.len().max(1) as f64;
    let bar_w = (w - BAR_PADDING * 2.0) / n - BAR_GAP;
    let max = max_value(data);
    let value = data.get(index).map(|d| d.value).unwrap_or(0.0);
    let bar_h = if max > 0.0 {
        value / max * (h - BAR_PADDING * 2.0) * eased
    } else {
        0.0
    };
    let x = BAR_PADDING + index as f64 * (bar_w + BAR_GAP);
    let y = h - BAR_PADDING - bar_h;
    (x, y, bar_w, bar_h)
}

fn paint_bars(surface: &mut dyn Surface, data: &[DataPoint], eased: f64, w: f64, h: f64) {
    let label_font = FontSpec::new("Inter", 24.0, 500).baseline(TextBaseline::Alphabetic);
    let value_font = FontSpec::new("Inter", 28.0, 700).baseline(TextBaseline::Alphabetic);
    let label_paint = Paint::solid(Color::rgba(255, 255, 255, 0.7));
    let value_paint = Paint::solid(Color::WHITE);

    for (index, item) in data.iter().enumerate() {
        let (x, y, bar_w, bar_h) = bar_geometry(data, index, eased, w, h);
        let gradient = Paint::linear(
            Point::new(x, y + bar_h),
            Point::new(x, y),
            item.color,
            item.color.lighten(30.0),
        );
        surface.fill(
            &Shape::Rect {
                x,
                y,
                w: bar_w,
                h: bar_h,
                radius: BAR_RADIUS,
            },
            &gradient,
        );

        let cx = x + bar_w / 2.0;
        surface.fill_text(&item.label, cx, h - 10.0, &label_font, TextAlign::Center, &label_paint);
        if eased > 0.5 {
            let shown = (item.value * eased).round();
            surface.fill_text(&format!("{shown}"), cx, y - 15.0, &value_font, TextAlign::Center, &value_paint);
        }
    }
}

/// Marker positions for every point of a line chart.
pub fn line_points(data: &[DataPoint], w: f64, h: f64) -> Vec<Point> {
    let n = data.len();
    let max = max_value(data);
    data.iter()
        .enumerate()
        .map(|(i, item)| {
            let x = if n > 1 {
                LINE_PADDING + i as f64 / (n - 1) as f64 * (w - LINE_PADDING * 2.0)
            } else {
                w / 2.0
            };
            let ratio = if max > 0.0 { item.value / max } else { 0.0 };
            let y = h - LINE_PADDING - ratio * (h - LINE_PADDING * 2.0);
            Point::new(x, y)
        })
        .collect()
}

/// Points revealed so far: `ceil(n × eased)`.
pub fn visible_points(n: usize, eased: f64) -> usize {
    ((n as f64 * eased.clamp(0.0, 1.0)).ceil() as usize).min(n)
}

fn paint_line(surface: &mut dyn Surface, data: &[DataPoint], line_color: Color, eased: f64, w: f64, h: f64) {
    let points = line_points(data, w, h);
    let visible = visible_points(points.len(), eased);
    if visible >= 2 {
        surface.stroke(
            &Shape::Polyline(points[..visible].to_vec()),
            &StrokeStyle::round(LINE_WIDTH),
            &Paint::solid(line_color),
        );
    }
    for (p, item) in points.iter().zip(data).take(visible) {
        surface.fill(&Shape::Circle { cx: p.x, cy: p.y, r: 10.0 }, &Paint::solid(item.color));
        surface.fill(&Shape::Circle { cx: p.x, cy: p.y, r: 5.0 }, &Paint::solid(Color::WHITE));
    }
}

/// `(start, sweep)` in radians for each slice, starting at twelve o'clock.
pub fn slice_angles(data: &[DataPoint], eased: f64) -> Vec<(f64, f64)> {
    let total: f64 = data.iter().map(|d| d.value).sum();
    if !(total > 0.0) {
        return Vec::new();
    }
    let mut angle = -PI / 2.0;
    data.iter()
        .map(|d| {
            let sweep = d.value / total * TAU * eased;
            let slice = (angle, sweep);
            angle += sweep;
            slice
        })
        .collect()
}

fn paint_pie(surface: &mut dyn Surface, data: &[DataPoint], eased: f64, w: f64, h: f64, donut: bool) {
    let radius = w.min(h) / 2.0 - 20.0;
    if radius <= 0.0 {
        return;
    }
    let inner = if donut { radius * DONUT_HOLE } else { 0.0 };
    for ((start, sweep), item) in slice_angles(data, eased).into_iter().zip(data) {
        surface.fill(
            &Shape::Sector {
                cx: w / 2.0,
                cy: h / 2.0,
                outer: radius,
                inner,
                start,
                sweep,
            },
            &Paint::solid(item.color),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawOp, RecordingSurface};

    fn series(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(format!("L{i}"), *v, Color::rgb(0x63, 0x66, 0xf1)))
            .collect()
    }

    #[test]
    fn test_bar_heights_scale_with_eased() {
        let data = series(&[80.0, 75.0, 90.0, 60.0]);
        let (w, h) = (800.0, 500.0);
        for (i, v) in [80.0, 75.0, 90.0, 60.0].into_iter().enumerate() {
            let (_, y, bar_w, bar_h) = bar_geometry(&data, i, 0.5, w, h);
            let expected = 0.5 * (v / 90.0) * (h - 80.0);
            assert!((bar_h - expected).abs() < 1e-9);
            assert!((y + bar_h - (h - 40.0)).abs() < 1e-9);
            assert!((bar_w - 160.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bar_values_appear_after_half() {
        let data = series(&[10.0, 20.0]);
        let mut early = RecordingSurface::new(1080.0, 1920.0);
        paint_chart(&mut early, &chart(ChartKind::Bar, data.clone()), 0.4, 800.0, 500.0);
        assert_eq!(early.texts(), vec!["L0", "L1"]);

        let mut late = RecordingSurface::new(1080.0, 1920.0);
        paint_chart(&mut late, &chart(ChartKind::Bar, data), 1.0, 800.0, 500.0);
        assert_eq!(late.texts(), vec!["L0", "10", "L1", "20"]);
    }

    #[test]
    fn test_all_zero_bars_are_flat() {
        let data = series(&[0.0, 0.0]);
        assert_eq!(bar_geometry(&data, 1, 1.0, 800.0, 500.0).3, 0.0);
    }

    #[test]
    fn test_line_reveals_points_progressively() {
        assert_eq!(visible_points(6, 0.0), 0);
        assert_eq!(visible_points(6, 0.1), 1);
        assert_eq!(visible_points(6, 0.5), 3);
        assert_eq!(visible_points(6, 1.0), 6);

        let data = series(&[30.0, 45.0, 40.0]);
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_chart(&mut s, &chart(ChartKind::Line, data), 0.2, 800.0, 400.0);
        // one point: no polyline, two marker discs
        assert!(s.commands().iter().all(|c| matches!(c.op, DrawOp::Fill { .. })));
        assert_eq!(s.commands().len(), 2);
    }

    #[test]
    fn test_single_point_line_is_centred() {
        let pts = line_points(&series(&[5.0]), 800.0, 400.0);
        assert_eq!(pts, vec![Point::new(400.0, 50.0)]);
    }

    #[test]
    fn test_slices_cover_full_turn_when_settled() {
        let slices = slice_angles(&series(&[45.0, 30.0, 25.0]), 1.0);
        assert!((slices[0].0 + PI / 2.0).abs() < 1e-12);
        let total: f64 = slices.iter().map(|s| s.1).sum();
        assert!((total - TAU).abs() < 1e-9);
        assert!(slice_angles(&series(&[0.0]), 1.0).is_empty());
    }

    #[test]
    fn test_donut_uses_annular_sectors() {
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_chart(&mut s, &chart(ChartKind::Donut, series(&[75.0, 25.0])), 1.0, 500.0, 500.0);
        match &s.commands()[0].op {
            DrawOp::Fill {
                shape: Shape::Sector { outer, inner, .. },
                ..
            } => {
                assert_eq!(*outer, 230.0);
                assert!((inner - 138.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    fn chart(kind: ChartKind, data: Vec<DataPoint>) -> ChartContent {
        ChartContent {
            kind,
            data,
            line_color: Color::rgb(0x63, 0x66, 0xf1),
        }
    }
}
