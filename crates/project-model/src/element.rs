//! Elements: positioned, timed, styled objects on the canvas.
//!
//! An [`Element`] carries the fields every kind shares (geometry, timing,
//! animation) plus an [`ElementContent`] payload that is a tagged union over
//! the kind families. Renderers match the payload exhaustively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationCurve;
use crate::color::Color;

/// Logical canvas width. Every element coordinate lives in this space.
pub const CANVAS_WIDTH: f64 = 1080.0;

/// Logical canvas height.
pub const CANVAS_HEIGHT: f64 = 1920.0;

/// Stable element identity. Never reused within one editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The element kinds a user can add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Heading,
    Subheading,
    Body,
    Caption,
    Quote,
    Stat,
    BarChart,
    LineChart,
    PieChart,
    DonutChart,
    Counter,
    Progress,
    Rectangle,
    Circle,
    Line,
    Arrow,
}

/// Kind families sharing one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementCategory {
    Text,
    Chart,
    Counter,
    Progress,
    Shape,
}

impl ElementKind {
    pub const ALL: [ElementKind; 16] = [
        Self::Heading,
        Self::Subheading,
        Self::Body,
        Self::Caption,
        Self::Quote,
        Self::Stat,
        Self::BarChart,
        Self::LineChart,
        Self::PieChart,
        Self::DonutChart,
        Self::Counter,
        Self::Progress,
        Self::Rectangle,
        Self::Circle,
        Self::Line,
        Self::Arrow,
    ];

    /// Kebab-case name as used in scene files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Subheading => "subheading",
            Self::Body => "body",
            Self::Caption => "caption",
            Self::Quote => "quote",
            Self::Stat => "stat",
            Self::BarChart => "bar-chart",
            Self::LineChart => "line-chart",
            Self::PieChart => "pie-chart",
            Self::DonutChart => "donut-chart",
            Self::Counter => "counter",
            Self::Progress => "progress",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Arrow => "arrow",
        }
    }

    /// Human-readable label used as the default element name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Heading => "Heading",
            Self::Subheading => "Subheading",
            Self::Body => "Body Text",
            Self::Caption => "Caption",
            Self::Quote => "Quote",
            Self::Stat => "Stat",
            Self::BarChart => "Bar Chart",
            Self::LineChart => "Line Chart",
            Self::PieChart => "Pie Chart",
            Self::DonutChart => "Donut Chart",
            Self::Counter => "Counter",
            Self::Progress => "Progress Bar",
            Self::Rectangle => "Rectangle",
            Self::Circle => "Circle",
            Self::Line => "Line",
            Self::Arrow => "Arrow",
        }
    }

    pub fn category(self) -> ElementCategory {
        match self {
            Self::Heading
            | Self::Subheading
            | Self::Body
            | Self::Caption
            | Self::Quote
            | Self::Stat => ElementCategory::Text,
            Self::BarChart | Self::LineChart | Self::PieChart | Self::DonutChart => {
                ElementCategory::Chart
            }
            Self::Counter => ElementCategory::Counter,
            Self::Progress => ElementCategory::Progress,
            Self::Rectangle | Self::Circle | Self::Line | Self::Arrow => ElementCategory::Shape,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown element kind '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextRole {
    Heading,
    Subheading,
    Body,
    Caption,
    Quote,
    Stat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Donut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    Arrow,
}

/// Horizontal text anchor within the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// How glyphs are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TextStyle {
    #[default]
    Solid,
    Outline,
    OutlineFill,
    Gradient,
    Neon,
    Rainbow,
    LetterSpaced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub role: TextRole,
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    #[serde(default)]
    pub italic: bool,
    pub color: Color,
    #[serde(default)]
    pub align: TextAlign,
    /// Multiple of `font_size`.
    pub line_height: f64,
    #[serde(default)]
    pub style: TextStyle,
    /// Extra advance between characters, in canvas units.
    #[serde(default)]
    pub letter_spacing: f64,
    pub outline_color: Color,
    /// Stroke width; `None` means 3 for outline and 2 for outline-fill.
    #[serde(default)]
    pub outline_width: Option<f64>,
    /// Gradient top color; `None` uses the text color.
    #[serde(default)]
    pub gradient_start: Option<Color>,
    pub gradient_end: Color,
    #[serde(default)]
    pub shadow: bool,
}

impl TextContent {
    pub fn outline_width_or_default(&self) -> f64 {
        self.outline_width.unwrap_or(match self.style {
            TextStyle::OutlineFill => 2.0,
            _ => 3.0,
        })
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// One (label, value, color) sample of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
    pub color: Color,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64, color: Color) -> Self {
        Self {
            label: label.into(),
            value,
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartContent {
    pub kind: ChartKind,
    pub data: Vec<DataPoint>,
    /// Stroke color of the line chart's polyline.
    pub line_color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterContent {
    pub start_value: f64,
    pub end_value: f64,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressContent {
    /// Target percentage, 0-100.
    pub value: f64,
    pub show_label: bool,
    pub track_color: Color,
    pub fill_start: Color,
    pub fill_end: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeContent {
    pub kind: ShapeKind,
    pub color: Color,
    /// Rectangles and circles only; lines and arrows are always stroked.
    pub fill: bool,
    #[serde(default)]
    pub stroke_color: Option<Color>,
    pub stroke_width: f64,
    #[serde(default)]
    pub corner_radius: f64,
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ElementContent {
    Text(TextContent),
    Chart(ChartContent),
    Counter(CounterContent),
    Progress(ProgressContent),
    Shape(ShapeContent),
}

/// A positioned, timed, styled visual object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub name: String,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    /// Seconds from timeline start.
    pub start_time: f64,
    /// Visible window length in seconds.
    pub duration: f64,

    pub animation: AnimationCurve,
    /// Authored entrance length in seconds.
    pub animation_duration: f64,
    /// Divides `animation_duration`.
    pub animation_speed: f64,

    pub content: ElementContent,
}

/// Field-level problem found by [`Element::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct InvalidField {
    pub field: &'static str,
    pub message: String,
}

impl InvalidField {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Element {
    /// New element of `kind` with the kind's defaults and `overrides` applied.
    /// Elements span the whole timeline unless the overrides say otherwise.
    pub fn create(
        id: ElementId,
        kind: ElementKind,
        timeline_duration: f64,
        overrides: &ElementPatch,
    ) -> Self {
        let mut element = crate::defaults::for_kind(id, kind, timeline_duration);
        element.apply(overrides);
        element
    }

    pub fn kind(&self) -> ElementKind {
        match &self.content {
            ElementContent::Text(t) => match t.role {
                TextRole::Heading => ElementKind::Heading,
                TextRole::Subheading => ElementKind::Subheading,
                TextRole::Body => ElementKind::Body,
                TextRole::Caption => ElementKind::Caption,
                TextRole::Quote => ElementKind::Quote,
                TextRole::Stat => ElementKind::Stat,
            },
            ElementContent::Chart(c) => match c.kind {
                ChartKind::Bar => ElementKind::BarChart,
                ChartKind::Line => ElementKind::LineChart,
                ChartKind::Pie => ElementKind::PieChart,
                ChartKind::Donut => ElementKind::DonutChart,
            },
            ElementContent::Counter(_) => ElementKind::Counter,
            ElementContent::Progress(_) => ElementKind::Progress,
            ElementContent::Shape(s) => match s.kind {
                ShapeKind::Rectangle => ElementKind::Rectangle,
                ShapeKind::Circle => ElementKind::Circle,
                ShapeKind::Line => ElementKind::Line,
                ShapeKind::Arrow => ElementKind::Arrow,
            },
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Seconds since `start_time`; negative before the element appears.
    pub fn local_time(&self, time: f64) -> f64 {
        time - self.start_time
    }

    /// Visible on the closed window `[start_time, start_time + duration]`.
    pub fn is_visible_at(&self, time: f64) -> bool {
        let t = self.local_time(time);
        t >= 0.0 && t <= self.duration
    }

    /// Entrance length after speed adjustments.
    pub fn effective_animation_duration(&self) -> f64 {
        self.animation
            .effective_duration(self.animation_duration, self.animation_speed)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether a canvas point falls inside the bounding box.
    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn text(&self) -> Option<&TextContent> {
        match &self.content {
            ElementContent::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Merge `patch` into this element. Fields the kind has no use for are
    /// ignored; the id is never touched.
    pub fn apply(&mut self, patch: &ElementPatch) {
        set(&mut self.name, &patch.name);
        set(&mut self.x, &patch.x);
        set(&mut self.y, &patch.y);
        set(&mut self.width, &patch.width);
        set(&mut self.height, &patch.height);
        set(&mut self.start_time, &patch.start_time);
        set(&mut self.duration, &patch.duration);
        set(&mut self.animation, &patch.animation);
        set(&mut self.animation_duration, &patch.animation_duration);
        set(&mut self.animation_speed, &patch.animation_speed);

        match &mut self.content {
            ElementContent::Text(t) => {
                set(&mut t.text, &patch.text);
                set(&mut t.font_family, &patch.font_family);
                set(&mut t.font_size, &patch.font_size);
                set(&mut t.font_weight, &patch.font_weight);
                set(&mut t.italic, &patch.italic);
                set(&mut t.color, &patch.color);
                set(&mut t.align, &patch.align);
                set(&mut t.line_height, &patch.line_height);
                set(&mut t.style, &patch.text_style);
                set(&mut t.letter_spacing, &patch.letter_spacing);
                set(&mut t.outline_color, &patch.outline_color);
                if patch.outline_width.is_some() {
                    t.outline_width = patch.outline_width;
                }
                if patch.gradient_start.is_some() {
                    t.gradient_start = patch.gradient_start;
                }
                set(&mut t.gradient_end, &patch.gradient_end);
                set(&mut t.shadow, &patch.shadow);
            }
            ElementContent::Chart(c) => {
                set(&mut c.data, &patch.data);
                set(&mut c.line_color, &patch.line_color);
            }
            ElementContent::Counter(c) => {
                set(&mut c.start_value, &patch.start_value);
                set(&mut c.end_value, &patch.end_value);
                set(&mut c.prefix, &patch.prefix);
                set(&mut c.suffix, &patch.suffix);
                set(&mut c.font_family, &patch.font_family);
                set(&mut c.font_size, &patch.font_size);
                set(&mut c.font_weight, &patch.font_weight);
                set(&mut c.color, &patch.color);
            }
            ElementContent::Progress(p) => {
                set(&mut p.value, &patch.value);
                set(&mut p.show_label, &patch.show_label);
                set(&mut p.track_color, &patch.track_color);
                set(&mut p.fill_start, &patch.gradient_start);
                set(&mut p.fill_end, &patch.gradient_end);
            }
            ElementContent::Shape(s) => {
                set(&mut s.color, &patch.color);
                set(&mut s.fill, &patch.fill);
                if patch.stroke_color.is_some() {
                    s.stroke_color = patch.stroke_color;
                }
                set(&mut s.stroke_width, &patch.stroke_width);
                set(&mut s.corner_radius, &patch.corner_radius);
            }
        }
    }

    /// Check the invariants editing must preserve.
    pub fn validate(&self) -> Result<(), InvalidField> {
        finite("x", self.x)?;
        finite("y", self.y)?;
        non_negative("width", self.width)?;
        non_negative("height", self.height)?;
        non_negative("start_time", self.start_time)?;
        positive("duration", self.duration)?;
        positive("animation_duration", self.animation_duration)?;
        positive("animation_speed", self.animation_speed)?;

        match &self.content {
            ElementContent::Text(t) => {
                if t.text.trim().is_empty() {
                    return Err(InvalidField::new("text", "text cannot be empty"));
                }
                positive("font_size", t.font_size)?;
                positive("line_height", t.line_height)?;
                finite("letter_spacing", t.letter_spacing)?;
                if let Some(w) = t.outline_width {
                    non_negative("outline_width", w)?;
                }
            }
            ElementContent::Chart(c) => {
                if c.data.is_empty() {
                    return Err(InvalidField::new("data", "chart needs at least one value"));
                }
                for point in &c.data {
                    if !point.value.is_finite() || point.value < 0.0 {
                        return Err(InvalidField::new(
                            "data",
                            format!("value for '{}' must be a non-negative number", point.label),
                        ));
                    }
                }
            }
            ElementContent::Counter(c) => {
                finite("start_value", c.start_value)?;
                finite("end_value", c.end_value)?;
                positive("font_size", c.font_size)?;
            }
            ElementContent::Progress(p) => {
                if !p.value.is_finite() || !(0.0..=100.0).contains(&p.value) {
                    return Err(InvalidField::new("value", "must be between 0 and 100"));
                }
            }
            ElementContent::Shape(s) => {
                non_negative("stroke_width", s.stroke_width)?;
                non_negative("corner_radius", s.corner_radius)?;
            }
        }
        Ok(())
    }
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

fn finite(field: &'static str, v: f64) -> Result<(), InvalidField> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(InvalidField::new(field, "must be a finite number"))
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<(), InvalidField> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(InvalidField::new(field, "must be zero or greater"))
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), InvalidField> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(InvalidField::new(field, "must be greater than zero"))
    }
}

/// Partial update. `None` leaves the field unchanged.
///
/// `gradient_start`/`gradient_end` also drive a progress bar's fill colors;
/// `color` targets text, counters and shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationCurve>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_speed: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_style: Option<TextStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_start: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_end: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<DataPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_color: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_label: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_color: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
}

impl ElementPatch {
    /// Patch that only moves the element.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading() -> Element {
        Element::create(ElementId(1), ElementKind::Heading, 10.0, &ElementPatch::default())
    }

    #[test]
    fn test_kind_round_trips_through_content() {
        for kind in ElementKind::ALL {
            let el = Element::create(ElementId(7), kind, 10.0, &ElementPatch::default());
            assert_eq!(el.kind(), kind, "kind mismatch for {kind}");
            assert_eq!(el.name, kind.label());
            assert!(el.validate().is_ok(), "defaults for {kind} must be valid");
        }
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let patch = ElementPatch {
            text: Some("Launch day".into()),
            animation: Some(AnimationCurve::Typewriter),
            y: Some(400.0),
            ..Default::default()
        };
        let el = Element::create(ElementId(2), ElementKind::Heading, 10.0, &patch);
        assert_eq!(el.text().unwrap().text, "Launch day");
        assert_eq!(el.animation, AnimationCurve::Typewriter);
        assert_eq!(el.y, 400.0);
        // untouched defaults survive
        assert_eq!(el.text().unwrap().font_size, 96.0);
    }

    #[test]
    fn test_apply_ignores_fields_for_other_kinds() {
        let mut el = heading();
        let before = el.clone();
        el.apply(&ElementPatch {
            data: Some(vec![DataPoint::new("x", 1.0, Color::WHITE)]),
            corner_radius: Some(4.0),
            ..Default::default()
        });
        assert_eq!(el, before);
    }

    #[test]
    fn test_visibility_window_is_closed() {
        let mut el = heading();
        el.start_time = 2.0;
        el.duration = 3.0;
        assert!(!el.is_visible_at(1.99));
        assert!(el.is_visible_at(2.0));
        assert!(el.is_visible_at(5.0));
        assert!(!el.is_visible_at(5.01));
    }

    #[test]
    fn test_validate_rejects_empty_text() {
        let mut el = heading();
        el.apply(&ElementPatch {
            text: Some("   ".into()),
            ..Default::default()
        });
        let err = el.validate().unwrap_err();
        assert_eq!(err.field, "text");
    }

    #[test]
    fn test_validate_rejects_non_finite_chart_value() {
        let mut el = Element::create(ElementId(3), ElementKind::BarChart, 10.0, &ElementPatch::default());
        el.apply(&ElementPatch {
            data: Some(vec![DataPoint::new("bad", f64::NAN, Color::WHITE)]),
            ..Default::default()
        });
        assert_eq!(el.validate().unwrap_err().field, "data");
    }

    #[test]
    fn test_contains_point_uses_bounding_box() {
        let el = heading();
        assert!(el.contains_point(el.x + 1.0, el.y + 1.0));
        assert!(!el.contains_point(el.x - 1.0, el.y));
    }

    #[test]
    fn test_patch_deserializes_sparse_json() {
        let patch: ElementPatch =
            serde_json::from_str(r##"{"text": "Hi", "color": "#ff0000", "text_style": "outline-fill"}"##)
                .unwrap();
        assert_eq!(patch.text.as_deref(), Some("Hi"));
        assert_eq!(patch.color, Some(Color::rgb(255, 0, 0)));
        assert_eq!(patch.text_style, Some(TextStyle::OutlineFill));
        assert!(patch.x.is_none());
    }
}
