//! Rectangles, circles, lines and arrows. Each grows from its top-left
//! (or left end) by the eased progress.

use instavid_project_model::{ShapeContent, ShapeKind};

use crate::geometry::{Point, Shape, StrokeStyle};
use crate::surface::{Paint, Surface};

const ARROW_HEAD_LENGTH: f64 = 20.0;
const ARROW_HEAD_HALF_WIDTH: f64 = 15.0;

pub fn paint_shape(surface: &mut dyn Surface, shape: &ShapeContent, eased: f64, w: f64, h: f64) {
    let fill = Paint::solid(shape.color);
    let stroke_paint = Paint::solid(shape.stroke_color.unwrap_or(shape.color));
    let stroke = StrokeStyle::new(shape.stroke_width);

    match shape.kind {
        ShapeKind::Rectangle => {
            let rect = Shape::Rect {
                x: 0.0,
                y: 0.0,
                w: w * eased,
                h: h * eased,
                radius: shape.corner_radius,
            };
            outline_or_fill(surface, shape, &rect, &fill, &stroke, &stroke_paint);
        }
        ShapeKind::Circle => {
            let circle = Shape::Circle {
                cx: w / 2.0,
                cy: h / 2.0,
                r: w.min(h) / 2.0 * eased,
            };
            outline_or_fill(surface, shape, &circle, &fill, &stroke, &stroke_paint);
        }
        ShapeKind::Line => {
            let line = Shape::Polyline(vec![Point::new(0.0, h / 2.0), Point::new(w * eased, h / 2.0)]);
            surface.stroke(&line, &stroke, &stroke_paint);
        }
        ShapeKind::Arrow => {
            let tip = w * eased;
            let mid = h / 2.0;
            if tip > ARROW_HEAD_LENGTH {
                let shaft = Shape::Polyline(vec![Point::new(0.0, mid), Point::new(tip - ARROW_HEAD_LENGTH, mid)]);
                surface.stroke(&shaft, &stroke, &stroke_paint);
            }
            if tip > 0.0 {
                let head = Shape::Polygon(vec![
                    Point::new(tip, mid),
                    Point::new(tip - ARROW_HEAD_LENGTH, mid - ARROW_HEAD_HALF_WIDTH),
                    Point::new(tip - ARROW_HEAD_LENGTH, mid + ARROW_HEAD_HALF_WIDTH),
                ]);
                surface.fill(&head, &fill);
            }
        }
    }
}

fn outline_or_fill(
    surface: &mut dyn Surface,
    content: &ShapeContent,
    shape: &Shape,
    fill: &Paint,
    stroke: &StrokeStyle,
    stroke_paint: &Paint,
) {
    if content.fill {
        surface.fill(shape, fill);
    }
    if content.stroke_color.is_some() || !content.fill {
        surface.stroke(shape, stroke, stroke_paint);
    }
}
