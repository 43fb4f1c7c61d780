//! Timeline position driven by a wall clock.

use serde::{Deserialize, Serialize};

use instavid_common::clock::{ns_to_secs, Clock};
use instavid_project_model::clamp_timeline_duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    /// Time is driven by the exporter; play and seek are ignored.
    Exporting,
}

/// What a [`PlaybackClock::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Not playing.
    Idle,
    Advanced(f64),
    /// Reached the end; now stopped at 0.
    Finished,
}

/// Playback state machine over a [`Clock`].
#[derive(Debug, Clone)]
pub struct PlaybackClock<C> {
    clock: C,
    state: PlaybackState,
    current_time: f64,
    duration: f64,
    reference_time: f64,
    reference_ns: u64,
}

impl<C: Clock> PlaybackClock<C> {
    pub fn new(clock: C, duration: f64) -> Self {
        Self {
            clock,
            state: PlaybackState::Stopped,
            current_time: 0.0,
            duration: clamp_timeline_duration(duration),
            reference_time: 0.0,
            reference_ns: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start from the current time. Returns false unless stopped.
    pub fn play(&mut self) -> bool {
        if self.state != PlaybackState::Stopped {
            return false;
        }
        self.reference_time = self.current_time;
        self.reference_ns = self.clock.now_ns();
        self.state = PlaybackState::Playing;
        tracing::debug!(from = self.current_time, "Playback started");
        true
    }

    /// Freeze at the elapsed position. Returns false unless playing.
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.current_time = self.elapsed_position().min(self.duration);
        self.state = PlaybackState::Stopped;
        tracing::debug!(at = self.current_time, "Playback paused");
        true
    }

    /// Advance while playing. Reaching the duration stops and rewinds.
    pub fn tick(&mut self) -> Tick {
        if self.state != PlaybackState::Playing {
            return Tick::Idle;
        }
        let position = self.elapsed_position();
        if position >= self.duration {
            self.state = PlaybackState::Stopped;
            self.current_time = 0.0;
            tracing::debug!(duration = self.duration, "Playback reached the end");
            return Tick::Finished;
        }
        self.current_time = position;
        Tick::Advanced(position)
    }

    /// Jump to `time`, clamped to the timeline. Ignored unless stopped.
    pub fn seek(&mut self, time: f64) -> bool {
        if self.state != PlaybackState::Stopped || !time.is_finite() {
            return false;
        }
        self.current_time = time.clamp(0.0, self.duration);
        true
    }

    /// Clamp and apply a new timeline length. Returns the value applied.
    pub fn set_duration(&mut self, duration: f64) -> f64 {
        self.duration = clamp_timeline_duration(duration);
        self.current_time = self.current_time.min(self.duration);
        self.duration
    }

    /// Enter the exporting state, pausing playback first. Returns the time to
    /// restore afterwards, or `None` when an export is already running.
    pub fn begin_export(&mut self) -> Option<f64> {
        match self.state {
            PlaybackState::Exporting => return None,
            PlaybackState::Playing => {
                self.pause();
            }
            PlaybackState::Stopped => {}
        }
        self.state = PlaybackState::Exporting;
        Some(self.current_time)
    }

    /// Set the position while exporting.
    pub fn set_export_time(&mut self, time: f64) {
        if self.state == PlaybackState::Exporting {
            self.current_time = time.clamp(0.0, self.duration);
        }
    }

    /// Leave the exporting state and restore `saved`.
    pub fn end_export(&mut self, saved: f64) {
        if self.state == PlaybackState::Exporting {
            self.state = PlaybackState::Stopped;
            self.current_time = saved.clamp(0.0, self.duration);
        }
    }

    fn elapsed_position(&self) -> f64 {
        let elapsed = ns_to_secs(self.clock.now_ns().saturating_sub(self.reference_ns));
        self.reference_time + elapsed
    }
}
