//! Offline typing track for exports.
//!
//! Live playback plays a keystroke whenever the renderer reveals another
//! character. Export frame-stepping never plays sounds, so the equivalent
//! keystrokes are laid out ahead of time from the element list instead.

use instavid_common::SeededRng;
use instavid_project_model::Element;

use crate::tone::ToneSpec;
use crate::track::AudioTrack;

/// When each keystroke of a typewriter element sounds, in timeline seconds.
///
/// Character `i` becomes visible once `floor(p × len)` reaches `i + 1`, i.e.
/// at `start + (i + 1) × interval`, so that is where its keystroke lands.
/// Cues at or past `timeline_duration` are dropped.
pub fn keystroke_times(element: &Element, timeline_duration: f64) -> Vec<f64> {
    let Some(text) = element.text() else {
        return Vec::new();
    };
    if !element.animation.is_typewriter() {
        return Vec::new();
    }
    let len = text.char_count();
    let anim = element.effective_animation_duration();
    if len == 0 || !(anim > 0.0) {
        return Vec::new();
    }

    let interval = anim / len as f64;
    (0..len)
        .map(|i| element.start_time + (i + 1) as f64 * interval)
        .filter(|t| *t < timeline_duration && *t <= element.end_time())
        .collect()
}

/// Mix one export keystroke per revealed character of every typewriter
/// element into a track covering the whole timeline.
pub fn build_typing_track(
    elements: &[Element],
    timeline_duration: f64,
    sample_rate: u32,
    seed: u64,
) -> AudioTrack {
    let mut track = AudioTrack::silent(timeline_duration, sample_rate);
    let mut cue_count = 0usize;

    for element in elements {
        let mut rng = SeededRng::derive(seed, element.id.0);
        for time in keystroke_times(element, timeline_duration) {
            let clip = ToneSpec::export_keystroke(&mut rng).synthesize(sample_rate);
            track.mix_at(time, &clip);
            cue_count += 1;
        }
    }

    tracing::debug!(
        cues = cue_count,
        duration = timeline_duration,
        "Built typing track"
    );
    track
}

/// Drops cues that arrive closer together than `min_interval_secs`, the way
/// live playback avoids machine-gunning keystrokes on fast reveals.
#[derive(Debug, Clone)]
pub struct CueThrottle {
    min_interval_secs: f64,
    last: Option<f64>,
}

impl CueThrottle {
    pub fn new(min_interval_secs: f64) -> Self {
        Self {
            min_interval_secs,
            last: None,
        }
    }

    /// 50 ms, the live keystroke spacing.
    pub fn keystrokes() -> Self {
        Self::new(0.05)
    }

    /// Whether a cue at wall time `now_secs` should sound.
    pub fn allow(&mut self, now_secs: f64) -> bool {
        match self.last {
            Some(last) if now_secs - last < self.min_interval_secs && now_secs >= last => false,
            _ => {
                self.last = Some(now_secs);
                true
            }
        }
    }
}
