//! A [`Surface`] that records draw calls instead of rasterizing them.

use serde::Serialize;

use instavid_project_model::TextAlign;

use crate::geometry::{Shape, StrokeStyle};
use crate::surface::{DrawState, FontSpec, Paint, Surface};

/// Fixed advance per character, as a fraction of the font size.
pub const RECORDED_ADVANCE: f64 = 0.55;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Clear {
        paint: Paint,
    },
    Fill {
        shape: Shape,
        paint: Paint,
    },
    Stroke {
        shape: Shape,
        style: StrokeStyle,
        paint: Paint,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        font: FontSpec,
        align: TextAlign,
        paint: Paint,
    },
    StrokeText {
        text: String,
        x: f64,
        y: f64,
        font: FontSpec,
        align: TextAlign,
        style: StrokeStyle,
        paint: Paint,
    },
}

/// One draw call together with the state it was issued under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCommand {
    #[serde(flatten)]
    pub op: DrawOp,
    pub state: DrawState,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    state: DrawState,
    stack: Vec<DrawState>,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Number of unmatched `save` calls.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Text of every text draw, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match &c.op {
                DrawOp::FillText { text, .. } | DrawOp::StrokeText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Pretty JSON array of the recorded commands.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.commands)
    }

    fn record(&mut self, op: DrawOp) {
        self.commands.push(DrawCommand { op, state: self.state });
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn state(&self) -> &DrawState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut DrawState {
        &mut self.state
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn clear(&mut self, paint: &Paint) {
        self.record(DrawOp::Clear { paint: paint.clone() });
    }

    fn fill(&mut self, shape: &Shape, paint: &Paint) {
        self.record(DrawOp::Fill {
            shape: shape.clone(),
            paint: paint.clone(),
        });
    }

    fn stroke(&mut self, shape: &Shape, style: &StrokeStyle, paint: &Paint) {
        self.record(DrawOp::Stroke {
            shape: shape.clone(),
            style: *style,
            paint: paint.clone(),
        });
    }

    fn measure_text(&mut self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * font.size * RECORDED_ADVANCE
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, font: &FontSpec, align: TextAlign, paint: &Paint) {
        self.record(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
            align,
            paint: paint.clone(),
        });
    }

    fn stroke_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: &FontSpec,
        align: TextAlign,
        style: &StrokeStyle,
        paint: &Paint,
    ) {
        self.record(DrawOp::StrokeText {
            text: text.to_string(),
            x,
            y,
            font: font.clone(),
            align,
            style: *style,
            paint: paint.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Affine, Point};
    use instavid_project_model::Color;

    #[test]
    fn test_records_state_with_each_command() {
        let mut s = RecordingSurface::new(100.0, 200.0);
        s.save();
        s.translate(10.0, 20.0);
        s.multiply_alpha(0.5);
        s.fill(&Shape::rect(0.0, 0.0, 5.0, 5.0), &Paint::solid(Color::WHITE));
        s.restore();
        s.fill(&Shape::rect(0.0, 0.0, 5.0, 5.0), &Paint::solid(Color::WHITE));

        let cmds = s.commands();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].state.alpha, 0.5);
        assert_eq!(cmds[0].state.transform * Point::ZERO, Point::new(10.0, 20.0));
        assert_eq!(cmds[1].state.transform, Affine::IDENTITY);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn test_measure_text_uses_fixed_advance() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        let font = FontSpec::new("Inter", 20.0, 400);
        assert!((s.measure_text("abcd", &font) - 44.0).abs() < 1e-9);
    }

    #[test]
    fn test_unbalanced_restore_is_ignored() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        s.translate(3.0, 0.0);
        s.restore();
        assert_eq!(s.state().transform, Affine::translate((3.0, 0.0)));
    }

    #[test]
    fn test_commands_serialize_to_json() {
        let mut s = RecordingSurface::new(10.0, 10.0);
        s.fill_text("hi", 1.0, 2.0, &FontSpec::new("Inter", 12.0, 400), TextAlign::Left, &Paint::solid(Color::BLACK));
        let json = serde_json::to_value(s.commands()).unwrap();
        assert_eq!(json[0]["op"], "fill_text");
        assert_eq!(json[0]["text"], "hi");
        assert_eq!(s.texts(), vec!["hi"]);
    }
}
