//! Counters and progress bars.

use instavid_project_model::{Color, CounterContent, ProgressContent, TextAlign};

use crate::geometry::{Point, Shape};
use crate::surface::{FontSpec, Paint, Surface, TextBaseline};

/// `floor(start + (end - start) × eased)`.
pub fn counter_value(counter: &CounterContent, eased: f64) -> f64 {
    (counter.start_value + (counter.end_value - counter.start_value) * eased).floor()
}

/// Integer with `,` between thousands groups.
pub fn group_thousands(value: f64) -> String {
    let n = value as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn counter_label(counter: &CounterContent, eased: f64) -> String {
    format!(
        "{}{}{}",
        counter.prefix,
        group_thousands(counter_value(counter, eased)),
        counter.suffix
    )
}

pub fn paint_counter(surface: &mut dyn Surface, counter: &CounterContent, eased: f64, w: f64, h: f64) {
    let font = FontSpec::new(counter.font_family.clone(), counter.font_size, counter.font_weight);
    surface.fill_text(
        &counter_label(counter, eased),
        w / 2.0,
        h / 2.0,
        &font,
        TextAlign::Center,
        &Paint::solid(counter.color),
    );
}

/// Width of the filled part of a `track_width` bar.
pub fn progress_fill_width(progress: &ProgressContent, eased: f64, track_width: f64) -> f64 {
    (progress.value * eased / 100.0 * track_width).clamp(0.0, track_width.max(0.0))
}

pub fn paint_progress(surface: &mut dyn Surface, progress: &ProgressContent, eased: f64, w: f64, h: f64) {
    let radius = h / 2.0;
    surface.fill(
        &Shape::Rect {
            x: 0.0,
            y: 0.0,
            w,
            h,
            radius,
        },
        &Paint::solid(progress.track_color),
    );

    let fill_w = progress_fill_width(progress, eased, w);
    if fill_w > 0.0 {
        let paint = Paint::linear(
            Point::new(0.0, 0.0),
            Point::new(fill_w, 0.0),
            progress.fill_start,
            progress.fill_end,
        );
        surface.fill(
            &Shape::Rect {
                x: 0.0,
                y: 0.0,
                w: fill_w,
                h,
                radius,
            },
            &paint,
        );
    }

    if progress.show_label {
        let font = FontSpec::new("Inter", 28.0, 700).baseline(TextBaseline::Alphabetic);
        let label = format!("{}%", (progress.value * eased).round());
        surface.fill_text(&label, w, -10.0, &font, TextAlign::Right, &Paint::solid(Color::WHITE));
    }
}
