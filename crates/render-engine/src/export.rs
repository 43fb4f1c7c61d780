//! Frame-stepped export.
//!
//! An export runs in two phases. The capture phase renders frame `k` at
//! exactly `k / fps` onto a fresh raster and keeps it PNG-compressed in an
//! ordered buffer. The encode phase decodes those frames in order and pushes
//! them to an [`EncoderSink`]. Progress covers 0–50 for capture and 50–100
//! for encode. Only one export runs per [`FrameExporter`] at a time.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use image::ImageFormat;
use serde::Serialize;

use instavid_audio::{build_typing_track, SAMPLE_RATE};
use instavid_common::error::{InstavidError, InstavidResult};
use instavid_project_model::{Background, Element, ExportFormat, ExportSettings};

use crate::raster::{FontBook, RasterSurface};
use crate::renderer::{FrameRenderer, NoCues, RenderMode, SceneView};
use crate::sink::{EncoderSink, StreamSpec};

/// Tolerance for `duration × fps` landing a hair above an integer.
const FRAME_COUNT_EPSILON: f64 = 1e-9;

/// Number of frames covering `duration` seconds at `fps`.
pub fn total_frames(duration: f64, fps: u32) -> u64 {
    if duration <= 0.0 || fps == 0 {
        return 0;
    }
    (duration * fps as f64 - FRAME_COUNT_EPSILON).ceil().max(0.0) as u64
}

/// Timeline time of frame `index`.
pub fn frame_time(index: u64, fps: u32) -> f64 {
    index as f64 / fps as f64
}

/// `instavid-export-<unix millis>.<ext>`
pub fn export_file_name(format: ExportFormat) -> String {
    format!(
        "instavid-export-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        format.extension()
    )
}

/// Everything an export needs, owned so the editor can keep working.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub elements: Vec<Element>,
    pub background: Background,
    pub duration: f64,
    pub settings: ExportSettings,
    pub seed: u64,
    /// Output size in pixels. Defaults to the settings' resolution tier.
    pub width: u32,
    pub height: u32,
}

impl ExportRequest {
    pub fn new(
        elements: Vec<Element>,
        background: Background,
        duration: f64,
        settings: ExportSettings,
        seed: u64,
    ) -> Self {
        let (width, height) = settings.resolution.dimensions();
        Self {
            elements,
            background,
            duration,
            settings,
            seed,
            width,
            height,
        }
    }

    /// Override the output size, keeping everything else.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn total_frames(&self) -> u64 {
        total_frames(self.duration, self.settings.fps)
    }

    fn check(&self) -> InstavidResult<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(InstavidError::validation(
                "duration",
                format!("must be positive, got {}", self.duration),
            ));
        }
        if !ExportSettings::is_supported_fps(self.settings.fps) {
            return Err(InstavidError::validation(
                "fps",
                format!("{} is not one of 24, 30, 60", self.settings.fps),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(InstavidError::validation(
                "resolution",
                format!("{}x{} has no pixels", self.width, self.height),
            ));
        }
        Ok(())
    }
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    Preparing,
    Rendering,
    Encoding,
    Finalizing,
    Complete,
    Failed,
}

/// Export progress report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportProgress {
    /// Overall progress in [0, 100]. Never decreases within one export.
    pub percent: f64,

    /// Human-readable status line.
    pub status: String,

    pub stage: ExportStage,

    /// Frames done in the current stage.
    pub frame: u64,

    pub total_frames: u64,
}

/// Result of a finished export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub frames: u64,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub has_audio: bool,
    pub elapsed_secs: f64,
}

/// Shared flag checked between frames.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Clears the busy flag when the export ends, however it ends.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> InstavidResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| InstavidError::ExportInProgress)?;
        Ok(Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Emits reports and keeps the percentage monotonic.
struct ProgressState<'a> {
    callback: &'a mut dyn FnMut(ExportProgress),
    percent: f64,
    total_frames: u64,
}

impl ProgressState<'_> {
    fn report(&mut self, percent: f64, stage: ExportStage, frame: u64, status: impl Into<String>) {
        self.percent = self.percent.max(percent.clamp(0.0, 100.0));
        (self.callback)(ExportProgress {
            percent: self.percent,
            status: status.into(),
            stage,
            frame,
            total_frames: self.total_frames,
        });
    }
}

/// Runs exports. Clones share the busy flag.
#[derive(Debug, Clone)]
pub struct FrameExporter {
    busy: Arc<AtomicBool>,
    fonts: Arc<FontBook>,
}

impl FrameExporter {
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            fonts,
        }
    }

    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Render and encode `request` into `sink`.
    ///
    /// Fails with [`InstavidError::ExportInProgress`] right away when another
    /// export holds this exporter. On any other failure the sink is aborted
    /// and a final [`ExportStage::Failed`] report is emitted.
    pub async fn export(
        &self,
        request: &ExportRequest,
        sink: &mut dyn EncoderSink,
        progress: &mut dyn FnMut(ExportProgress),
        cancel: Option<&CancellationToken>,
    ) -> InstavidResult<ExportOutcome> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        request.check()?;

        let mut state = ProgressState {
            callback: progress,
            percent: 0.0,
            total_frames: request.total_frames(),
        };
        tracing::info!(
            sink = sink.name(),
            frames = state.total_frames,
            width = request.width,
            height = request.height,
            fps = request.settings.fps,
            "Starting export"
        );

        let result = self.run(request, sink, &mut state, cancel).await;
        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                sink.abort();
                tracing::warn!(error = %err, "Export failed");
                let percent = state.percent;
                state.report(percent, ExportStage::Failed, 0, format!("Export failed: {err}"));
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        request: &ExportRequest,
        sink: &mut dyn EncoderSink,
        state: &mut ProgressState<'_>,
        cancel: Option<&CancellationToken>,
    ) -> InstavidResult<ExportOutcome> {
        let started = Instant::now();
        let fps = request.settings.fps;
        let total = state.total_frames;
        let check_cancel = || match cancel {
            Some(token) if token.is_cancelled() => Err(InstavidError::Cancelled),
            _ => Ok(()),
        };

        state.report(0.0, ExportStage::Preparing, 0, "Preparing frames...");

        let mut renderer = FrameRenderer::new(request.seed);
        let mut buffer: Vec<Vec<u8>> = Vec::with_capacity(total as usize);
        for index in 0..total {
            check_cancel()?;
            let time = frame_time(index, fps);
            let mut surface = RasterSurface::new(request.width, request.height, Arc::clone(&self.fonts));
            renderer.render_frame(
                &mut surface,
                SceneView::new(&request.elements, &request.background),
                time,
                RenderMode::Export,
                &mut NoCues,
            );

            let mut png = Vec::new();
            surface
                .image()
                .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                .map_err(|e| InstavidError::render(format!("Failed to compress frame {index}: {e}")))?;
            buffer.push(png);

            let done = index + 1;
            state.report(
                done as f64 / total as f64 * 50.0,
                ExportStage::Rendering,
                done,
                format!("Rendering frame {done}/{total}"),
            );
            tokio::task::yield_now().await;
        }

        state.report(50.0, ExportStage::Encoding, 0, "Creating video...");

        let audio = if request.settings.include_audio {
            let track = build_typing_track(&request.elements, request.duration, SAMPLE_RATE, request.seed);
            (!track.is_silent()).then_some(track)
        } else {
            None
        };
        let has_audio = audio.is_some();

        sink.begin(&StreamSpec {
            width: request.width,
            height: request.height,
            fps,
            total_frames: total,
            format: request.settings.format,
            audio,
        })?;

        for (index, png) in buffer.into_iter().enumerate() {
            check_cancel()?;
            let frame = image::load_from_memory_with_format(&png, ImageFormat::Png)
                .map_err(|e| InstavidError::encode(format!("Failed to decode frame {index}: {e}")))?
                .into_rgba8();
            sink.push_frame(&frame)?;

            let done = index as u64 + 1;
            state.report(
                50.0 + done as f64 / total as f64 * 50.0,
                ExportStage::Encoding,
                done,
                format!("Encoding frame {done}/{total}"),
            );
            tokio::task::yield_now().await;
        }

        state.report(100.0, ExportStage::Finalizing, total, "Finalizing...");
        let path = sink.finish()?;
        state.report(100.0, ExportStage::Complete, total, "Complete!");

        let outcome = ExportOutcome {
            path,
            frames: total,
            width: request.width,
            height: request.height,
            duration_secs: request.duration,
            has_audio,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        tracing::info!(
            path = %outcome.path.display(),
            frames = outcome.frames,
            audio = outcome.has_audio,
            elapsed = outcome.elapsed_secs,
            "Export complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use instavid_project_model::{AnimationCurve, Color, ElementId, ElementKind, ElementPatch};

    fn small_request(duration: f64, elements: Vec<Element>) -> ExportRequest {
        let settings = ExportSettings {
            include_audio: false,
            ..Default::default()
        };
        ExportRequest::new(elements, Background::solid(Color::BLACK), duration, settings, 7).with_size(27, 48)
    }

    fn exporter() -> FrameExporter {
        FrameExporter::new(Arc::new(FontBook::empty()))
    }

    #[test]
    fn test_total_frames() {
        assert_eq!(total_frames(10.0, 30), 300);
        assert_eq!(total_frames(0.1, 30), 3);
        assert_eq!(total_frames(1.01, 24), 25);
        assert_eq!(total_frames(0.0, 30), 0);
        assert_eq!(frame_time(15, 30), 0.5);
    }

    #[test]
    fn test_export_file_name() {
        let name = export_file_name(ExportFormat::Mp4);
        assert!(name.starts_with("instavid-export-"));
        assert!(name.ends_with(".mp4"));
    }

    #[test]
    fn test_request_defaults_to_tier_size() {
        let req = ExportRequest::new(Vec::new(), Background::default(), 1.0, ExportSettings::default(), 0);
        assert_eq!((req.width, req.height), (1080, 1920));
    }

    #[tokio::test]
    async fn test_export_pushes_every_frame_with_monotonic_progress() {
        let req = small_request(0.5, Vec::new());
        let mut sink = MemorySink::new();
        let mut reports = Vec::new();
        let outcome = exporter()
            .export(&req, &mut sink, &mut |p| reports.push(p), None)
            .await
            .unwrap();

        assert_eq!(outcome.frames, 15);
        assert_eq!(sink.frames.len(), 15);
        assert!(!outcome.has_audio);
        assert!(reports.windows(2).all(|w| w[0].percent <= w[1].percent));
        assert!(reports.iter().any(|p| p.status == "Rendering frame 15/15" && p.percent == 50.0));
        assert!(reports.iter().any(|p| p.status == "Encoding frame 1/15"));
        let last = reports.last().unwrap();
        assert_eq!((last.percent, last.status.as_str()), (100.0, "Complete!"));
    }

    #[tokio::test]
    async fn test_frames_match_background() {
        let req = small_request(0.1, Vec::new());
        let mut sink = MemorySink::new();
        exporter().export(&req, &mut sink, &mut |_| {}, None).await.unwrap();
        let px = sink.frames[0].get_pixel(10, 10);
        assert_eq!(px.0, [0, 0, 0, 255]);
    }

    #[tokio::test]
    async fn test_sink_failure_aborts_and_releases() {
        let req = small_request(0.2, Vec::new());
        let exporter = exporter();
        let mut sink = MemorySink::failing_at(2);
        let mut last = None;
        let err = exporter
            .export(&req, &mut sink, &mut |p| last = Some(p), None)
            .await
            .unwrap_err();
        assert!(matches!(err, InstavidError::Encode { .. }));
        assert!(sink.aborted);
        assert_eq!(last.map(|p| p.stage), Some(ExportStage::Failed));
        assert!(!exporter.is_busy());
    }

    #[tokio::test]
    async fn test_cancellation_between_frames() {
        let req = small_request(1.0, Vec::new());
        let token = CancellationToken::new();
        let mut sink = MemorySink::new();
        let cancel = token.clone();
        let err = exporter()
            .export(
                &req,
                &mut sink,
                &mut |p| {
                    if p.frame == 3 {
                        cancel.cancel();
                    }
                },
                Some(&token),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, InstavidError::Cancelled));
        assert!(sink.spec.is_none());
    }

    #[tokio::test]
    async fn test_rejects_unsupported_fps() {
        let mut req = small_request(1.0, Vec::new());
        req.settings.fps = 25;
        let err = exporter()
            .export(&req, &mut MemorySink::new(), &mut |_| {}, None)
            .await
            .unwrap_err();
        assert!(matches!(err, InstavidError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_typing_audio_is_attached() {
        let heading = Element::create(
            ElementId(1),
            ElementKind::Heading,
            2.0,
            &ElementPatch {
                text: Some("Hi".into()),
                animation: Some(AnimationCurve::Typewriter),
                ..Default::default()
            },
        );
        let mut req = small_request(1.0, vec![heading]);
        req.settings.include_audio = true;
        let mut sink = MemorySink::new();
        let outcome = exporter().export(&req, &mut sink, &mut |_| {}, None).await.unwrap();
        assert!(outcome.has_audio);
        assert!(sink.spec.as_ref().and_then(|s| s.audio.as_ref()).is_some());
    }
}
