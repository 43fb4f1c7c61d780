//! Play a scene through the editor clock.
//!
//! Each display tick advances playback and renders the frame into a draw
//! recording, collecting the keystroke cues a live preview would sound.
//! With `--audio` those cues are written out as a WAV file.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use instavid_audio::{AudioTrack, CueThrottle, ToneSpec, SAMPLE_RATE};
use instavid_common::clock::{Clock, ManualClock, MonotonicClock, RateController};
use instavid_common::SeededRng;
use instavid_editor::{EditorState, Tick};
use instavid_project_model::{ElementId, CANVAS_HEIGHT, CANVAS_WIDTH};
use instavid_render_engine::{FontBook, RecordingSurface};

#[derive(Debug, Default)]
struct PreviewReport {
    ticks: usize,
    peak_drawn: usize,
    draw_commands: usize,
    last_time: f64,
    keystrokes: BTreeMap<ElementId, usize>,
    cue_times: Vec<f64>,
}

impl PreviewReport {
    fn cue_count(&self) -> usize {
        self.keystrokes.values().sum()
    }

    /// Live keystroke blips at every cue, throttled like live playback.
    fn cue_track(&self, duration: f64, seed: u64) -> AudioTrack {
        let mut track = AudioTrack::silent(duration, SAMPLE_RATE);
        let mut throttle = CueThrottle::keystrokes();
        let mut rng = SeededRng::new(seed);
        for &at in &self.cue_times {
            if throttle.allow(at) {
                let tone = ToneSpec::live_keystroke(&mut rng).synthesize(SAMPLE_RATE);
                track.mix_at(at, &tone);
            }
        }
        track
    }
}

pub async fn run(path: PathBuf, fps: u32, realtime: bool, audio: Option<PathBuf>) -> anyhow::Result<()> {
    let scene = super::load_scene(&path)?;
    let fonts = Arc::new(FontBook::empty());
    let fps = fps.max(1);

    println!(
        "Previewing '{}' ({:.1}s) at {} Hz{}",
        scene.name,
        scene.duration,
        fps,
        if realtime { " in real time" } else { "" }
    );

    let report = if realtime {
        let clock = MonotonicClock::start();
        tracing::info!(started = clock.epoch_wall(), "Realtime preview");
        let mut editor = super::open_editor(&scene, clock, fonts);
        play_realtime(&mut editor, fps).await
    } else {
        let clock = ManualClock::new();
        let mut editor = super::open_editor(&scene, clock.clone(), fonts);
        play_stepped(&mut editor, &clock, fps)
    };

    println!("Preview finished:");
    println!("  Ticks: {}", report.ticks);
    println!("  Last frame at: {:.3}s", report.last_time);
    println!("  Peak elements on screen: {}", report.peak_drawn);
    println!("  Draw commands: {}", report.draw_commands);
    println!("  Keystroke cues: {}", report.cue_count());
    for (id, count) in &report.keystrokes {
        println!("    #{}: {}", id.0, count);
    }

    if let Some(out) = audio {
        let track = report.cue_track(scene.duration, 0);
        track
            .write_wav(&out)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", out.display()))?;
        println!("  Cue audio: {}", out.display());
    }
    Ok(())
}

/// Render the current position and fold it into `report`. Returns false
/// once playback has stopped.
fn step<C: Clock>(editor: &mut EditorState<C>, report: &mut PreviewReport) -> bool {
    let time = match editor.tick() {
        Tick::Advanced(time) => time,
        Tick::Idle | Tick::Finished => return false,
    };

    let mut surface = RecordingSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    let keystrokes = &mut report.keystrokes;
    let cue_times = &mut report.cue_times;
    let mut cues = |id: ElementId, _revealed: usize, at: f64| {
        *keystrokes.entry(id).or_insert(0) += 1;
        cue_times.push(at);
    };
    let stats = editor.render(&mut surface, &mut cues);

    report.ticks += 1;
    report.last_time = time;
    report.peak_drawn = report.peak_drawn.max(stats.drawn);
    report.draw_commands += surface.commands().len();
    true
}

/// Advance a manual clock by one refresh interval per tick.
fn play_stepped(editor: &mut EditorState<ManualClock>, clock: &ManualClock, fps: u32) -> PreviewReport {
    let mut report = PreviewReport::default();
    editor.play();
    loop {
        clock.advance_secs(1.0 / fps as f64);
        if !step(editor, &mut report) {
            break;
        }
    }
    report
}

/// Tick against the wall clock, sleeping between refreshes.
async fn play_realtime(editor: &mut EditorState<MonotonicClock>, fps: u32) -> PreviewReport {
    let mut report = PreviewReport::default();
    let mut rate = RateController::new(fps);
    let wall = MonotonicClock::start();
    editor.play();
    loop {
        let now = wall.now_ns();
        if rate.should_tick(now) {
            if !step(editor, &mut report) {
                break;
            }
        } else {
            tokio::time::sleep(Duration::from_nanos(rate.remaining_ns(now))).await;
        }
    }
    report
}
