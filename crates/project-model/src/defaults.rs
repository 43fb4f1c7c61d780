//! Per-kind starting values for new elements.

use crate::animation::AnimationCurve;
use crate::color::Color;
use crate::element::*;

const INDIGO: Color = Color::rgb(0x63, 0x66, 0xf1);
const PURPLE: Color = Color::rgb(0xa8, 0x55, 0xf7);
const GREEN: Color = Color::rgb(0x22, 0xc5, 0x5e);
const AMBER: Color = Color::rgb(0xf5, 0x9e, 0x0b);

/// Build the default element for `kind`.
///
/// The base box is 400×100 centred on the canvas, spanning the whole
/// timeline with a one second fade; each kind then adjusts what it needs.
pub fn for_kind(id: ElementId, kind: ElementKind, timeline_duration: f64) -> Element {
    let mut el = Element {
        id,
        name: kind.label().to_string(),
        x: CANVAS_WIDTH / 2.0 - 200.0,
        y: CANVAS_HEIGHT / 2.0 - 50.0,
        width: 400.0,
        height: 100.0,
        start_time: 0.0,
        duration: timeline_duration,
        animation: AnimationCurve::Fade,
        animation_duration: 1.0,
        animation_speed: 1.0,
        content: ElementContent::Shape(shape(ShapeKind::Rectangle, INDIGO)),
    };

    match kind {
        ElementKind::Heading => {
            el.content = text(TextRole::Heading, "Your Headline", "Outfit", 96.0, 800, Color::WHITE);
            if let ElementContent::Text(t) = &mut el.content {
                t.shadow = true;
            }
            boxed(&mut el, 140.0, None, 800.0, 150.0);
            el.animation = AnimationCurve::SlideUp;
        }
        ElementKind::Subheading => {
            el.content = text(
                TextRole::Subheading,
                "Subheading Text",
                "Inter",
                56.0,
                600,
                Color::rgba(255, 255, 255, 0.9),
            );
            boxed(&mut el, 190.0, None, 700.0, 100.0);
        }
        ElementKind::Body => {
            el.content = text(
                TextRole::Body,
                "Your body text goes here.\nAdd multiple lines for impact.",
                "Inter",
                36.0,
                400,
                Color::rgba(255, 255, 255, 0.8),
            );
            boxed(&mut el, 140.0, None, 800.0, 200.0);
        }
        ElementKind::Caption => {
            el.content = text(
                TextRole::Caption,
                "@yourusername",
                "Inter",
                28.0,
                500,
                Color::rgba(255, 255, 255, 0.6),
            );
            boxed(&mut el, 340.0, Some(1800.0), 400.0, 60.0);
        }
        ElementKind::Quote => {
            el.content = text(
                TextRole::Quote,
                "\"The future is now.\"",
                "Playfair Display",
                64.0,
                500,
                Color::WHITE,
            );
            if let ElementContent::Text(t) = &mut el.content {
                t.italic = true;
            }
            boxed(&mut el, 140.0, None, 800.0, 200.0);
            el.animation = AnimationCurve::Scale;
        }
        ElementKind::Stat => {
            el.content = text(TextRole::Stat, "100M+", "Space Mono", 120.0, 700, INDIGO);
            boxed(&mut el, 240.0, None, 600.0, 180.0);
            el.animation = AnimationCurve::Bounce;
        }
        ElementKind::BarChart => {
            el.content = chart(
                ChartKind::Bar,
                vec![
                    DataPoint::new("GPT", 80.0, INDIGO),
                    DataPoint::new("Claude", 75.0, PURPLE),
                    DataPoint::new("Gemini", 90.0, GREEN),
                    DataPoint::new("LLaMA", 60.0, AMBER),
                ],
            );
            boxed(&mut el, 140.0, Some(700.0), 800.0, 500.0);
            el.animation_duration = 1.5;
        }
        ElementKind::LineChart => {
            let data = [
                ("Jan", 30.0),
                ("Feb", 45.0),
                ("Mar", 40.0),
                ("Apr", 70.0),
                ("May", 85.0),
                ("Jun", 95.0),
            ]
            .into_iter()
            .map(|(label, value)| DataPoint::new(label, value, INDIGO))
            .collect();
            el.content = chart(ChartKind::Line, data);
            boxed(&mut el, 140.0, Some(750.0), 800.0, 400.0);
            el.animation_duration = 2.0;
        }
        ElementKind::PieChart => {
            el.content = chart(
                ChartKind::Pie,
                vec![
                    DataPoint::new("AI", 45.0, INDIGO),
                    DataPoint::new("ML", 30.0, PURPLE),
                    DataPoint::new("Data", 25.0, GREEN),
                ],
            );
            boxed(&mut el, 290.0, Some(700.0), 500.0, 500.0);
            el.animation_duration = 1.5;
        }
        ElementKind::DonutChart => {
            el.content = chart(
                ChartKind::Donut,
                vec![
                    DataPoint::new("Complete", 75.0, GREEN),
                    DataPoint::new("Remaining", 25.0, Color::rgba(255, 255, 255, 0.2)),
                ],
            );
            boxed(&mut el, 290.0, Some(700.0), 500.0, 500.0);
            el.animation_duration = 1.5;
        }
        ElementKind::Counter => {
            el.content = ElementContent::Counter(CounterContent {
                start_value: 0.0,
                end_value: 1_000_000.0,
                prefix: String::new(),
                suffix: "+".to_string(),
                font_family: "Space Mono".to_string(),
                font_size: 100.0,
                font_weight: 700,
                color: Color::WHITE,
            });
            boxed(&mut el, 240.0, Some(870.0), 600.0, 180.0);
            el.animation_duration = 2.5;
        }
        ElementKind::Progress => {
            el.content = ElementContent::Progress(ProgressContent {
                value: 75.0,
                show_label: true,
                track_color: Color::rgba(255, 255, 255, 0.1),
                fill_start: INDIGO,
                fill_end: PURPLE,
            });
            boxed(&mut el, 140.0, Some(960.0), 800.0, 24.0);
            el.animation_duration = 1.5;
        }
        ElementKind::Rectangle => {
            let mut s = shape(ShapeKind::Rectangle, INDIGO);
            s.corner_radius = 16.0;
            el.content = ElementContent::Shape(s);
            boxed(&mut el, 390.0, Some(860.0), 300.0, 200.0);
            el.animation_duration = 0.5;
        }
        ElementKind::Circle => {
            el.content = ElementContent::Shape(shape(ShapeKind::Circle, PURPLE));
            boxed(&mut el, 440.0, Some(860.0), 200.0, 200.0);
            el.animation_duration = 0.5;
        }
        ElementKind::Line => {
            el.content = ElementContent::Shape(shape(ShapeKind::Line, Color::WHITE));
            boxed(&mut el, 240.0, Some(955.0), 600.0, 10.0);
            el.animation_duration = 0.8;
        }
        ElementKind::Arrow => {
            el.content = ElementContent::Shape(shape(ShapeKind::Arrow, INDIGO));
            boxed(&mut el, 340.0, Some(940.0), 400.0, 40.0);
            el.animation_duration = 0.8;
        }
    }

    el
}

fn boxed(el: &mut Element, x: f64, y: Option<f64>, width: f64, height: f64) {
    el.x = x;
    if let Some(y) = y {
        el.y = y;
    }
    el.width = width;
    el.height = height;
}

fn text(
    role: TextRole,
    body: &str,
    family: &str,
    size: f64,
    weight: u16,
    color: Color,
) -> ElementContent {
    ElementContent::Text(TextContent {
        role,
        text: body.to_string(),
        font_family: family.to_string(),
        font_size: size,
        font_weight: weight,
        italic: false,
        color,
        align: TextAlign::Center,
        line_height: 1.2,
        style: TextStyle::Solid,
        letter_spacing: 0.0,
        outline_color: Color::BLACK,
        outline_width: None,
        gradient_start: None,
        gradient_end: PURPLE,
        shadow: false,
    })
}

fn chart(kind: ChartKind, data: Vec<DataPoint>) -> ElementContent {
    ElementContent::Chart(ChartContent {
        kind,
        data,
        line_color: INDIGO,
    })
}

fn shape(kind: ShapeKind, color: Color) -> ShapeContent {
    ShapeContent {
        kind,
        color,
        fill: true,
        stroke_color: None,
        stroke_width: 4.0,
        corner_radius: 0.0,
    }
}
