//! The 2D drawing surface the painters target.
//!
//! Coordinates are logical canvas units. A surface keeps a state stack
//! (transform, alpha, blur, shadow) that [`Surface::save`] and
//! [`Surface::restore`] push and pop.

use serde::Serialize;

use instavid_project_model::{Color, TextAlign};

use crate::geometry::{Affine, Point, Shape, StrokeStyle};

/// Linear gradient between two points in the local space of the draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    /// Offsets in [0, 1], ascending.
    pub stops: Vec<(f64, Color)>,
}

impl LinearGradient {
    pub fn two(start: Point, end: Point, from: Color, to: Color) -> Self {
        Self {
            start,
            end,
            stops: vec![(0.0, from), (1.0, to)],
        }
    }

    /// Color at parameter `t` along the gradient axis, clamped at the ends.
    pub fn color_at(&self, t: f64) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::TRANSPARENT;
        };
        if t <= first.0 {
            return first.1;
        }
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t <= o1 {
                let span = o1 - o0;
                let local = if span > 0.0 { (t - o0) / span } else { 1.0 };
                return c0.mix(c1, local as f32);
            }
        }
        self.stops.last().map(|s| s.1).unwrap_or(first.1)
    }

    /// Projection parameter of a local-space point onto the axis.
    pub fn parameter(&self, p: Point) -> f64 {
        let (dx, dy) = (self.end.x - self.start.x, self.end.y - self.start.y);
        let len2 = dx * dx + dy * dy;
        if len2 <= 0.0 {
            return 1.0;
        }
        ((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "paint", rename_all = "snake_case")]
pub enum Paint {
    Solid { color: Color },
    Linear(LinearGradient),
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Paint::Solid { color }
    }

    pub fn linear(start: Point, end: Point, from: Color, to: Color) -> Self {
        Paint::Linear(LinearGradient::two(start, end, from, to))
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::solid(color)
    }
}

/// Where the `y` coordinate of a text draw sits relative to the glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    /// Centre of the em box.
    #[default]
    Middle,
    Alphabetic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    pub weight: u16,
    pub italic: bool,
    pub baseline: TextBaseline,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64, weight: u16) -> Self {
        Self {
            family: family.into(),
            size,
            weight,
            italic: false,
            baseline: TextBaseline::Middle,
        }
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }
}

/// Drop shadow applied to every draw until cleared. Blur and offsets are in
/// canvas units and ignore the current transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shadow {
    pub color: Color,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Drawing state saved and restored as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawState {
    pub transform: Affine,
    pub alpha: f64,
    /// Gaussian standard deviation in local units; zero disables.
    pub blur: f64,
    pub shadow: Option<Shadow>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            blur: 0.0,
            shadow: None,
        }
    }
}

/// Minimal stateful 2D drawing API.
pub trait Surface {
    /// Logical width in canvas units.
    fn width(&self) -> f64;

    /// Logical height in canvas units.
    fn height(&self) -> f64;

    fn state(&self) -> &DrawState;

    fn state_mut(&mut self) -> &mut DrawState;

    fn save(&mut self);

    fn restore(&mut self);

    /// Fill the whole surface, ignoring transform, alpha and effects.
    fn clear(&mut self, paint: &Paint);

    fn fill(&mut self, shape: &Shape, paint: &Paint);

    fn stroke(&mut self, shape: &Shape, style: &StrokeStyle, paint: &Paint);

    /// Advance width of `text` in local units.
    fn measure_text(&mut self, text: &str, font: &FontSpec) -> f64;

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec, align: TextAlign, paint: &Paint);

    fn stroke_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: &FontSpec,
        align: TextAlign,
        style: &StrokeStyle,
        paint: &Paint,
    );

    fn transform(&mut self, local: &Affine) {
        let state = self.state_mut();
        state.transform = state.transform * *local;
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform(&Affine::translate((x, y)));
    }

    fn rotate(&mut self, radians: f64) {
        self.transform(&Affine::rotate(radians));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform(&Affine::scale_non_uniform(sx, sy));
    }

    /// Multiply the current alpha by `factor`.
    fn multiply_alpha(&mut self, factor: f64) {
        let state = self.state_mut();
        state.alpha = (state.alpha * factor).clamp(0.0, 1.0);
    }

    fn set_blur(&mut self, sigma: f64) {
        self.state_mut().blur = sigma.max(0.0);
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.state_mut().shadow = shadow;
    }
}

/// Left edge of a run of width `width` anchored at `x` with `align`.
pub fn aligned_left(x: f64, width: f64, align: TextAlign) -> f64 {
    match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2.0,
        TextAlign::Right => x - width,
    }
}
