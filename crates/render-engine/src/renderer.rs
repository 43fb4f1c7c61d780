//! Frame rendering: background, then every visible element in list order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use instavid_project_model::{Background, Element, ElementId};

use crate::animation::{resolve, AnimationFrame};
use crate::geometry::Point;
use crate::paint::paint_element;
use crate::surface::{Paint, Surface};

/// Why a frame is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Editing preview while stopped.
    Still,
    /// Live playback; the only mode that emits keystroke cues.
    Playback,
    /// Frame-stepped export.
    Export,
}

/// Receives a keystroke cue whenever live playback reveals more characters
/// of a typewriter element.
pub trait CueSink {
    fn keystroke(&mut self, element: ElementId, revealed: usize, time: f64);
}

/// Discards cues.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCues;

impl CueSink for NoCues {
    fn keystroke(&mut self, _element: ElementId, _revealed: usize, _time: f64) {}
}

impl<F: FnMut(ElementId, usize, f64)> CueSink for F {
    fn keystroke(&mut self, element: ElementId, revealed: usize, time: f64) {
        self(element, revealed, time)
    }
}

/// Last revealed character count per typewriter element.
#[derive(Debug, Default, Clone)]
pub struct RevealTracker {
    last: HashMap<ElementId, usize>,
}

impl RevealTracker {
    /// Record `revealed` for `id`. Returns true when the count went up and
    /// `audible` is set.
    pub fn observe(&mut self, id: ElementId, revealed: usize, audible: bool) -> bool {
        let previous = self.last.insert(id, revealed).unwrap_or(0);
        audible && revealed > previous
    }

    pub fn forget(&mut self, id: ElementId) {
        self.last.remove(&id);
    }

    pub fn last(&self, id: ElementId) -> Option<usize> {
        self.last.get(&id).copied()
    }

    pub fn clear(&mut self) {
        self.last.clear();
    }
}

/// What one render pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub time: f64,
    pub drawn: usize,
    pub skipped: usize,
    pub cues: usize,
}

/// Elements plus background, borrowed for one pass.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub elements: &'a [Element],
    pub background: &'a Background,
}

impl<'a> SceneView<'a> {
    pub fn new(elements: &'a [Element], background: &'a Background) -> Self {
        Self { elements, background }
    }
}

/// Renders frames and remembers typewriter progress between passes.
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    seed: u64,
    reveals: RevealTracker,
}

impl FrameRenderer {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            reveals: RevealTracker::default(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reveals(&self) -> &RevealTracker {
        &self.reveals
    }

    /// Render `scene` at `time` onto `surface`.
    ///
    /// Drawing itself has no side effects. In [`RenderMode::Playback`] every
    /// increase of a typewriter element's revealed count is reported to
    /// `cues`; other modes update the counts silently.
    pub fn render_frame(
        &mut self,
        surface: &mut dyn Surface,
        scene: SceneView<'_>,
        time: f64,
        mode: RenderMode,
        cues: &mut dyn CueSink,
    ) -> FrameStats {
        let mut stats = FrameStats {
            time,
            ..Default::default()
        };
        paint_background(surface, scene.background);

        for element in scene.elements {
            let Some(frame) = resolve(element, time, self.seed) else {
                self.reveals.forget(element.id);
                stats.skipped += 1;
                continue;
            };
            self.track_reveal(element, &frame, time, mode, cues, &mut stats);
            paint_element(surface, element, &frame);
            stats.drawn += 1;
        }

        tracing::trace!(
            time,
            mode = ?mode,
            drawn = stats.drawn,
            skipped = stats.skipped,
            "Rendered frame"
        );
        stats
    }

    fn track_reveal(
        &mut self,
        element: &Element,
        frame: &AnimationFrame,
        time: f64,
        mode: RenderMode,
        cues: &mut dyn CueSink,
        stats: &mut FrameStats,
    ) {
        let Some(revealed) = frame.revealed else {
            return;
        };
        if self.reveals.observe(element.id, revealed, mode == RenderMode::Playback) {
            cues.keystroke(element.id, revealed, time);
            stats.cues += 1;
        }
    }
}

/// Fill the whole surface with the scene background.
pub fn paint_background(surface: &mut dyn Surface, background: &Background) {
    if !background.gradient {
        surface.clear(&Paint::solid(background.color));
        return;
    }
    let (start, end) = gradient_line(surface.width(), surface.height(), background.angle_deg);
    surface.clear(&Paint::linear(start, end, background.color, background.gradient_end));
}

/// CSS `linear-gradient` axis for a `w × h` box: 0° points up, 90° right,
/// and the line is long enough for the corners to hit the end colors.
pub fn gradient_line(w: f64, h: f64, angle_deg: f64) -> (Point, Point) {
    let theta = angle_deg.to_radians();
    let (dx, dy) = (theta.sin(), -theta.cos());
    let half = ((w * dx).abs() + (h * dy).abs()) / 2.0;
    let (cx, cy) = (w / 2.0, h / 2.0);
    (
        Point::new(cx - dx * half, cy - dy * half),
        Point::new(cx + dx * half, cy + dy * half),
    )
}
