//! Text elements.

use instavid_project_model::{AnimationCurve, Color, TextAlign, TextContent, TextStyle};

use crate::animation::AnimationFrame;
use crate::geometry::{Point, Shape, StrokeStyle};
use crate::surface::{aligned_left, FontSpec, Paint, Shadow, Surface};

const DROP_SHADOW: Shadow = Shadow {
    color: Color::rgba(0, 0, 0, 0.5),
    blur: 20.0,
    offset_x: 0.0,
    offset_y: 10.0,
};

const NEON_BLUR: f64 = 30.0;
const CARET_WIDTH: f64 = 4.0;

/// Text shown at this frame: the typewriter prefix, or everything.
pub fn visible_text(text: &TextContent, revealed: Option<usize>) -> String {
    match revealed {
        Some(n) => text.text.chars().take(n).collect(),
        None => text.text.clone(),
    }
}

/// Paint a text element into its local `w × h` box.
pub fn paint_text(
    surface: &mut dyn Surface,
    text: &TextContent,
    curve: AnimationCurve,
    frame: &AnimationFrame,
    w: f64,
    h: f64,
) {
    let shown = visible_text(text, frame.revealed);
    let font = FontSpec::new(text.font_family.clone(), text.font_size, text.font_weight).italic(text.italic);

    if text.shadow {
        surface.set_shadow(Some(DROP_SHADOW));
    }
    if text.style == TextStyle::Neon {
        surface.set_shadow(Some(Shadow {
            color: text.color,
            blur: NEON_BLUR,
            offset_x: 0.0,
            offset_y: 0.0,
        }));
    }

    let lines: Vec<&str> = shown.split('\n').collect();
    let line_height = text.font_size * text.line_height;
    let start_y = h / 2.0 - (lines.len() as f64 - 1.0) * line_height / 2.0;
    let anchor_x = match text.align {
        TextAlign::Left => 0.0,
        TextAlign::Center => w / 2.0,
        TextAlign::Right => w,
    };
    let rainbow = curve == AnimationCurve::Rainbow || text.style == TextStyle::Rainbow;
    let solid = Paint::solid(text.color);

    for (index, line) in lines.iter().enumerate() {
        let y = start_y + index as f64 * line_height;
        if rainbow {
            paint_rainbow_line(surface, line, anchor_x, y, &font, text.align, frame.local_time);
            continue;
        }
        match text.style {
            TextStyle::Gradient => {
                let paint = Paint::linear(
                    Point::new(0.0, y - text.font_size / 2.0),
                    Point::new(0.0, y + text.font_size / 2.0),
                    text.gradient_start.unwrap_or(text.color),
                    text.gradient_end,
                );
                surface.fill_text(line, anchor_x, y, &font, text.align, &paint);
            }
            TextStyle::Outline => {
                let style = StrokeStyle::new(text.outline_width_or_default());
                surface.stroke_text(line, anchor_x, y, &font, text.align, &style, &solid);
            }
            TextStyle::OutlineFill => {
                surface.fill_text(line, anchor_x, y, &font, text.align, &solid);
                let style = StrokeStyle::new(text.outline_width_or_default());
                let outline = Paint::solid(text.outline_color);
                surface.stroke_text(line, anchor_x, y, &font, text.align, &style, &outline);
            }
            TextStyle::Neon => {
                // second pass strengthens the glow
                surface.fill_text(line, anchor_x, y, &font, text.align, &solid);
                surface.fill_text(line, anchor_x, y, &font, text.align, &solid);
            }
            TextStyle::LetterSpaced => {
                paint_spaced_line(surface, line, anchor_x, y, &font, text.align, text.letter_spacing, &solid);
            }
            TextStyle::Solid if text.letter_spacing != 0.0 => {
                paint_spaced_line(surface, line, anchor_x, y, &font, text.align, text.letter_spacing, &solid);
            }
            TextStyle::Solid | TextStyle::Rainbow => {
                surface.fill_text(line, anchor_x, y, &font, text.align, &solid);
            }
        }
    }

    if frame.caret_visible() {
        let last = lines.last().copied().unwrap_or("");
        let width = surface.measure_text(last, &font);
        let caret_x = match text.align {
            TextAlign::Left => width + 5.0,
            TextAlign::Center => w / 2.0 + width / 2.0 + 5.0,
            TextAlign::Right => w + 5.0,
        };
        let caret_y = start_y + (lines.len() as f64 - 1.0) * line_height;
        surface.fill(
            &Shape::rect(caret_x, caret_y - line_height / 3.0, CARET_WIDTH, line_height * 0.6),
            &solid,
        );
    }
}

/// Hue of character `index` at local time `t`.
pub fn rainbow_hue(t: f64, index: usize) -> f64 {
    (t * 100.0 + index as f64 * 30.0).rem_euclid(360.0)
}

fn paint_rainbow_line(
    surface: &mut dyn Surface,
    line: &str,
    anchor_x: f64,
    y: f64,
    font: &FontSpec,
    align: TextAlign,
    t: f64,
) {
    let width = surface.measure_text(line, font);
    let mut x = aligned_left(anchor_x, width, align);
    let mut buf = [0u8; 4];
    for (i, c) in line.chars().enumerate() {
        let ch: &str = c.encode_utf8(&mut buf);
        let paint = Paint::solid(Color::hsl(rainbow_hue(t, i), 0.8, 0.6));
        surface.fill_text(ch, x, y, font, TextAlign::Left, &paint);
        x += surface.measure_text(ch, font);
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_spaced_line(
    surface: &mut dyn Surface,
    line: &str,
    anchor_x: f64,
    y: f64,
    font: &FontSpec,
    align: TextAlign,
    spacing: f64,
    paint: &Paint,
) {
    let mut buf = [0u8; 4];
    let advances: Vec<f64> = line
        .chars()
        .map(|c| surface.measure_text(c.encode_utf8(&mut buf), font) + spacing)
        .collect();
    let total = advances.iter().sum::<f64>() - if advances.is_empty() { 0.0 } else { spacing };
    let mut x = aligned_left(anchor_x, total, align);
    for (c, advance) in line.chars().zip(advances) {
        surface.fill_text(c.encode_utf8(&mut buf), x, y, font, TextAlign::Left, paint);
        x += advance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawOp, RecordingSurface};
    use crate::animation::VisualTransform;
    use instavid_project_model::{Element, ElementId, ElementKind, ElementPatch};

    fn text_of(patch: ElementPatch) -> TextContent {
        Element::create(ElementId(1), ElementKind::Heading, 10.0, &patch)
            .text()
            .cloned()
            .unwrap()
    }

    fn settled() -> AnimationFrame {
        AnimationFrame {
            local_time: 2.0,
            progress: 1.0,
            eased: 1.0,
            transform: VisualTransform::IDENTITY,
            revealed: None,
        }
    }

    #[test]
    fn test_multiline_layout_centres_block() {
        let text = text_of(ElementPatch {
            text: Some("one\ntwo".into()),
            font_size: Some(100.0),
            line_height: Some(1.2),
            ..Default::default()
        });
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Fade, &settled(), 800.0, 400.0);
        let ys: Vec<f64> = s
            .commands()
            .iter()
            .filter_map(|c| match &c.op {
                DrawOp::FillText { y, x, .. } => {
                    assert_eq!(*x, 400.0);
                    Some(*y)
                }
                _ => None,
            })
            .collect();
        assert_eq!(ys, vec![140.0, 260.0]);
    }

    #[test]
    fn test_typewriter_prefix_and_caret() {
        let text = text_of(ElementPatch {
            text: Some("hello".into()),
            ..Default::default()
        });
        let frame = AnimationFrame {
            local_time: 0.2,
            progress: 0.4,
            eased: 0.784,
            transform: VisualTransform::IDENTITY,
            revealed: Some(2),
        };
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Typewriter, &frame, 800.0, 150.0);
        assert_eq!(s.texts(), vec!["he"]);
        let caret = s.commands().iter().find_map(|c| match &c.op {
            DrawOp::Fill { shape: Shape::Rect { w, .. }, .. } => Some(*w),
            _ => None,
        });
        assert_eq!(caret, Some(CARET_WIDTH));
    }

    #[test]
    fn test_rainbow_draws_per_character() {
        let text = text_of(ElementPatch {
            text: Some("abc".into()),
            ..Default::default()
        });
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Rainbow, &settled(), 800.0, 150.0);
        assert_eq!(s.texts(), vec!["a", "b", "c"]);
        assert_eq!(rainbow_hue(2.0, 1), 230.0);
        assert_eq!(rainbow_hue(4.0, 0), 40.0);
    }

    #[test]
    fn test_outline_fill_strokes_after_fill() {
        let text = text_of(ElementPatch {
            text: Some("x".into()),
            text_style: Some(TextStyle::OutlineFill),
            ..Default::default()
        });
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Fade, &settled(), 800.0, 150.0);
        let ops = s.commands();
        assert!(matches!(ops[0].op, DrawOp::FillText { .. }));
        match &ops[1].op {
            DrawOp::StrokeText { style, .. } => assert_eq!(style.width, 2.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_gradient_text_spans_the_em_box() {
        let mut text = text_of(ElementPatch {
            text: Some("x".into()),
            text_style: Some(TextStyle::Gradient),
            font_size: Some(100.0),
            ..Default::default()
        });
        text.gradient_start = Some(Color::rgb(255, 0, 0));
        text.gradient_end = Color::rgb(0, 0, 255);
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Fade, &settled(), 800.0, 150.0);
        let ops = s.commands();
        assert_eq!(ops.len(), 1);
        match &ops[0].op {
            DrawOp::FillText {
                paint: Paint::Linear(g),
                y,
                ..
            } => {
                assert_eq!(*y, 75.0);
                assert_eq!(g.start, Point::new(0.0, 25.0));
                assert_eq!(g.end, Point::new(0.0, 125.0));
                assert_eq!(g.color_at(0.0), Color::rgb(255, 0, 0));
                assert_eq!(g.color_at(1.0), Color::rgb(0, 0, 255));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_neon_draws_twice_under_a_colored_glow() {
        let color = Color::rgb(0x22, 0xd3, 0xee);
        let text = text_of(ElementPatch {
            text: Some("x".into()),
            text_style: Some(TextStyle::Neon),
            color: Some(color),
            ..Default::default()
        });
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Fade, &settled(), 800.0, 150.0);
        let fills: Vec<_> = s
            .commands()
            .iter()
            .filter(|c| matches!(c.op, DrawOp::FillText { .. }))
            .collect();
        assert_eq!(fills.len(), 2);
        for cmd in fills {
            let shadow = cmd.state.shadow.unwrap();
            assert_eq!(shadow.color, color);
            assert_eq!(shadow.blur, NEON_BLUR);
            assert_eq!((shadow.offset_x, shadow.offset_y), (0.0, 0.0));
        }
    }

    #[test]
    fn test_outline_only_strokes_once() {
        let text = text_of(ElementPatch {
            text: Some("x".into()),
            text_style: Some(TextStyle::Outline),
            ..Default::default()
        });
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Fade, &settled(), 800.0, 150.0);
        let ops = s.commands();
        assert_eq!(ops.len(), 1);
        match &ops[0].op {
            DrawOp::StrokeText { style, paint, .. } => {
                assert_eq!(style.width, text.outline_width_or_default());
                assert_eq!(style.width, 3.0);
                assert_eq!(*paint, Paint::solid(text.color));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_letter_spacing_widens_run() {
        let text = text_of(ElementPatch {
            text: Some("ab".into()),
            text_style: Some(TextStyle::LetterSpaced),
            letter_spacing: Some(10.0),
            font_size: Some(100.0),
            align: Some(TextAlign::Left),
            ..Default::default()
        });
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Fade, &settled(), 800.0, 150.0);
        let xs: Vec<f64> = s
            .commands()
            .iter()
            .filter_map(|c| match &c.op {
                DrawOp::FillText { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![0.0, 65.0]);
    }

    #[test]
    fn test_drop_shadow_is_set_for_shadowed_text() {
        let text = text_of(ElementPatch {
            text: Some("x".into()),
            shadow: Some(true),
            ..Default::default()
        });
        let mut s = RecordingSurface::new(1080.0, 1920.0);
        paint_text(&mut s, &text, AnimationCurve::Fade, &settled(), 800.0, 150.0);
        assert_eq!(s.commands()[0].state.shadow, Some(DROP_SHADOW));
    }
}
