//! The editing session.

use instavid_common::clock::{Clock, MonotonicClock};
use instavid_common::error::{InstavidError, InstavidResult};
use instavid_project_model::{
    Background, Element, ElementId, ElementKind, ElementPatch, ExportSettings, SceneFile,
    SUPPORTED_FPS,
};
use instavid_render_engine::{
    frame_time, CancellationToken, CueSink, EncoderSink, ExportOutcome, ExportProgress,
    ExportRequest, ExportStage, FrameExporter, FrameRenderer, FrameStats, RenderMode, SceneView,
    Surface,
};

use crate::error::{EditorError, EditorResult};
use crate::events::{EditorEvent, EventBus, Subscription};
use crate::history::History;
use crate::playback::{PlaybackClock, PlaybackState, Tick};

const DEFAULT_TIMELINE_DURATION: f64 = 10.0;

/// Direction for [`EditorState::reorder`]. Later elements paint on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reorder {
    /// Toward the end of the list (drawn later, on top).
    Forward,
    /// Toward the start of the list.
    Backward,
}

/// Elements, selection, timeline and history for one project.
///
/// Every committed mutation of the element list pushes one history snapshot
/// and emits exactly one [`EditorEvent::ElementsChanged`]. Lookups of unknown
/// ids are silent no-ops.
#[derive(Debug)]
pub struct EditorState<C = MonotonicClock> {
    elements: Vec<Element>,
    next_id: u64,
    selected: Option<ElementId>,
    background: Background,
    export_settings: ExportSettings,
    playback: PlaybackClock<C>,
    history: History<Element>,
    events: EventBus,
    renderer: FrameRenderer,
    exporter: FrameExporter,
    seed: u64,
}

impl<C: Clock> EditorState<C> {
    pub fn new(clock: C, exporter: FrameExporter) -> Self {
        Self {
            elements: Vec::new(),
            next_id: 1,
            selected: None,
            background: Background::default(),
            export_settings: ExportSettings::default(),
            playback: PlaybackClock::new(clock, DEFAULT_TIMELINE_DURATION),
            history: History::new(&[]),
            events: EventBus::new(),
            renderer: FrameRenderer::new(0),
            exporter,
            seed: 0,
        }
    }

    /// Session preloaded with a scene. The scene is the undo floor.
    pub fn from_scene(scene: &SceneFile, clock: C, exporter: FrameExporter) -> Self {
        let mut state = Self::new(clock, exporter);
        state.playback.set_duration(scene.duration);
        state.background = scene.background.clone();
        state.export_settings = scene.export.clone();
        state.elements = scene.build_elements();
        state.next_id = state.elements.len() as u64 + 1;
        state.history.reset(&state.elements);
        tracing::debug!(
            scene = %scene.name,
            elements = state.elements.len(),
            duration = state.playback.duration(),
            "Loaded scene into editor"
        );
        state
    }

    /// Seed for glitch/shake jitter and export audio variation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.renderer = FrameRenderer::new(seed);
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self, listener: impl FnMut(&EditorEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.element(id))
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn export_settings(&self) -> &ExportSettings {
        &self.export_settings
    }

    pub fn duration(&self) -> f64 {
        self.playback.duration()
    }

    pub fn current_time(&self) -> f64 {
        self.playback.current_time()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn history(&self) -> &History<Element> {
        &self.history
    }

    pub fn exporter(&self) -> &FrameExporter {
        &self.exporter
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    fn elements_changed(&mut self, commit: bool) {
        if commit {
            self.history.commit(&self.elements);
        }
        self.events.emit(&EditorEvent::ElementsChanged);
    }

    // -- element mutations --------------------------------------------------

    /// Create an element from kind defaults plus `overrides`, append it on
    /// top and select it.
    pub fn add(&mut self, kind: ElementKind, overrides: &ElementPatch) -> EditorResult<ElementId> {
        let id = ElementId(self.next_id);
        let element = Element::create(id, kind, self.duration(), overrides);
        element.validate()?;

        self.next_id += 1;
        self.elements.push(element);
        tracing::debug!(id = id.0, kind = ?kind, "Added element");
        self.elements_changed(true);
        self.select(Some(id));
        Ok(id)
    }

    /// Merge `patch` into element `id` and record it in history.
    /// `Ok(false)` when no such element exists.
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> EditorResult<bool> {
        self.patch_element(id, patch, true)
    }

    /// Like [`update`](Self::update) but without a history entry, for live
    /// edits that [`commit`](Self::commit) later.
    pub fn preview_update(&mut self, id: ElementId, patch: &ElementPatch) -> EditorResult<bool> {
        self.patch_element(id, patch, false)
    }

    fn patch_element(&mut self, id: ElementId, patch: &ElementPatch, commit: bool) -> EditorResult<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let mut candidate = self.elements[index].clone();
        candidate.apply(patch);
        candidate.validate()?;
        self.elements[index] = candidate;
        self.elements_changed(commit);
        Ok(true)
    }

    /// Move element `id` during a drag gesture. No history entry.
    pub fn drag_to(&mut self, id: ElementId, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let element = &mut self.elements[index];
        element.x = x;
        element.y = y;
        self.elements_changed(false);
        true
    }

    /// Record live edits as one history entry. False when nothing changed
    /// since the last snapshot.
    pub fn commit(&mut self) -> bool {
        if *self.history.current() == *self.elements {
            return false;
        }
        self.history.commit(&self.elements);
        true
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.elements.remove(index);
        tracing::debug!(id = id.0, "Removed element");
        self.elements_changed(true);
        if self.selected == Some(id) {
            self.select(None);
        }
        true
    }

    /// Swap element `id` with its neighbour. False at the ends of the list.
    pub fn reorder(&mut self, id: ElementId, direction: Reorder) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let target = match direction {
            Reorder::Forward if index + 1 < self.elements.len() => index + 1,
            Reorder::Backward if index > 0 => index - 1,
            _ => return false,
        };
        self.elements.swap(index, target);
        self.elements_changed(true);
        true
    }

    /// Change the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: Option<ElementId>) -> bool {
        if id.is_some_and(|id| self.index_of(id).is_none()) || id == self.selected {
            return false;
        }
        self.selected = id;
        self.events.emit(&EditorEvent::SelectionChanged { selected: id });
        true
    }

    /// Topmost element visible now whose box contains the canvas point.
    pub fn element_at(&self, x: f64, y: f64) -> Option<ElementId> {
        let now = self.current_time();
        self.elements
            .iter()
            .rev()
            .find(|e| e.is_visible_at(now) && e.contains_point(x, y))
            .map(|e| e.id)
    }

    /// Elements whose window runs past the end of the timeline. Tolerated;
    /// reported for tooling.
    pub fn overruns(&self) -> Vec<&Element> {
        let duration = self.duration();
        self.elements
            .iter()
            .filter(|e| e.end_time() > duration + 1e-9)
            .collect()
    }

    // -- history ------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: &[Element]) {
        self.elements = snapshot.to_vec();
        self.elements_changed(false);
        if let Some(id) = self.selected {
            if self.index_of(id).is_none() {
                self.select(None);
            }
        }
    }

    // -- timeline -----------------------------------------------------------

    pub fn play(&mut self) -> bool {
        let started = self.playback.play();
        if started {
            self.events.emit(&EditorEvent::PlaybackChanged {
                state: PlaybackState::Playing,
            });
        }
        started
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.playback.pause();
        if paused {
            self.events.emit(&EditorEvent::PlaybackChanged {
                state: PlaybackState::Stopped,
            });
            self.events.emit(&EditorEvent::TimeChanged {
                time: self.current_time(),
            });
        }
        paused
    }

    /// Advance playback from the wall clock.
    pub fn tick(&mut self) -> Tick {
        let tick = self.playback.tick();
        match tick {
            Tick::Idle => {}
            Tick::Advanced(time) => self.events.emit(&EditorEvent::TimeChanged { time }),
            Tick::Finished => {
                self.events.emit(&EditorEvent::PlaybackChanged {
                    state: PlaybackState::Stopped,
                });
                self.events.emit(&EditorEvent::TimeChanged { time: 0.0 });
            }
        }
        tick
    }

    pub fn seek(&mut self, time: f64) -> bool {
        let moved = self.playback.seek(time);
        if moved {
            self.events.emit(&EditorEvent::TimeChanged {
                time: self.current_time(),
            });
        }
        moved
    }

    /// Set the timeline length, clamped to 1–60 s. Returns the value applied.
    pub fn set_duration(&mut self, duration: f64) -> f64 {
        let before = self.current_time();
        let applied = self.playback.set_duration(duration);
        self.events.emit(&EditorEvent::DurationChanged { duration: applied });
        if self.current_time() != before {
            self.events.emit(&EditorEvent::TimeChanged {
                time: self.current_time(),
            });
        }
        applied
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    pub fn set_export_settings(&mut self, settings: ExportSettings) -> EditorResult<()> {
        if !ExportSettings::is_supported_fps(settings.fps) {
            return Err(EditorError::validation(
                "fps",
                format!("{} is not one of {:?}", settings.fps, SUPPORTED_FPS),
            ));
        }
        self.export_settings = settings;
        Ok(())
    }

    // -- rendering ----------------------------------------------------------

    /// Draw the current frame. While playing, typewriter progress is
    /// reported to `cues`.
    pub fn render(&mut self, surface: &mut dyn Surface, cues: &mut dyn CueSink) -> FrameStats {
        let mode = if self.playback.is_playing() {
            RenderMode::Playback
        } else {
            RenderMode::Still
        };
        let time = self.current_time();
        self.renderer.render_frame(
            surface,
            SceneView::new(&self.elements, &self.background),
            time,
            mode,
            cues,
        )
    }

    // -- export -------------------------------------------------------------

    /// Owned snapshot of everything an export needs.
    pub fn export_request(&self) -> ExportRequest {
        ExportRequest::new(
            self.elements.clone(),
            self.background.clone(),
            self.duration(),
            self.export_settings.clone(),
            self.seed,
        )
    }

    pub async fn export(
        &mut self,
        sink: &mut dyn EncoderSink,
        cancel: Option<&CancellationToken>,
    ) -> InstavidResult<ExportOutcome> {
        let request = self.export_request();
        self.export_with(request, sink, cancel).await
    }

    /// Run `request` through the exporter. Playback is paused for the
    /// duration and the previous time restored afterwards, whether or not
    /// the export succeeds.
    pub async fn export_with(
        &mut self,
        request: ExportRequest,
        sink: &mut dyn EncoderSink,
        cancel: Option<&CancellationToken>,
    ) -> InstavidResult<ExportOutcome> {
        if self.exporter.is_busy() {
            return Err(InstavidError::ExportInProgress);
        }
        let Some(saved) = self.playback.begin_export() else {
            return Err(InstavidError::ExportInProgress);
        };
        self.events.emit(&EditorEvent::PlaybackChanged {
            state: PlaybackState::Exporting,
        });

        let exporter = self.exporter.clone();
        let events = self.events.clone();
        let playback = &mut self.playback;
        let fps = request.settings.fps;
        let mut on_progress = |p: ExportProgress| {
            if p.stage == ExportStage::Rendering && p.frame > 0 {
                playback.set_export_time(frame_time(p.frame - 1, fps));
            }
            events.emit(&EditorEvent::ExportProgress {
                percent: p.percent,
                status: p.status,
            });
        };
        let result = exporter.export(&request, sink, &mut on_progress, cancel).await;

        self.playback.end_export(saved);
        self.events.emit(&EditorEvent::PlaybackChanged {
            state: PlaybackState::Stopped,
        });
        self.events.emit(&EditorEvent::TimeChanged { time: saved });
        if let Err(err) = &result {
            tracing::warn!(error = %err, restored = saved, "Export did not complete");
        }
        result
    }
}
