//! Swept sine tones.

use instavid_common::SeededRng;

/// A sine blip whose frequency and gain both ramp exponentially from their
/// start to their end value over `duration_secs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub start_hz: f64,
    pub end_hz: f64,
    pub start_gain: f64,
    pub end_gain: f64,
    pub duration_secs: f64,
}

impl ToneSpec {
    /// Keystroke used in exported tracks: 800-1100 Hz down to 200 Hz in 30 ms.
    pub fn export_keystroke(rng: &mut SeededRng) -> Self {
        Self {
            start_hz: 800.0 + rng.next_f64() * 300.0,
            end_hz: 200.0,
            start_gain: 0.08,
            end_gain: 0.001,
            duration_secs: 0.03,
        }
    }

    /// Keystroke used during live playback: slightly longer and louder.
    pub fn live_keystroke(rng: &mut SeededRng) -> Self {
        Self {
            start_hz: 800.0 + rng.next_f64() * 400.0,
            end_hz: 200.0,
            start_gain: 0.1,
            end_gain: 0.01,
            duration_secs: 0.05,
        }
    }

    pub fn sample_count(&self, sample_rate: u32) -> usize {
        (self.duration_secs.max(0.0) * sample_rate as f64).round() as usize
    }

    /// Render the tone as mono samples in [-1, 1].
    pub fn synthesize(&self, sample_rate: u32) -> Vec<f32> {
        let n = self.sample_count(sample_rate);
        let dt = 1.0 / sample_rate as f64;
        let mut phase = 0.0f64;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let x = i as f64 / n as f64;
            let freq = exp_ramp(self.start_hz, self.end_hz, x);
            let gain = exp_ramp(self.start_gain, self.end_gain, x);
            out.push((phase.sin() * gain) as f32);
            phase = (phase + std::f64::consts::TAU * freq * dt) % std::f64::consts::TAU;
        }
        out
    }
}

/// Exponential interpolation `a·(b/a)^x`. Falls back to linear when either
/// end is not strictly positive, since the ratio is then undefined.
pub fn exp_ramp(a: f64, b: f64, x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    if a > 0.0 && b > 0.0 {
        a * (b / a).powf(x)
    } else {
        a + (b - a) * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_keystroke_pitch_range() {
        let mut rng = SeededRng::new(3);
        for _ in 0..50 {
            let tone = ToneSpec::export_keystroke(&mut rng);
            assert!((800.0..1100.0).contains(&tone.start_hz));
            assert_eq!(tone.end_hz, 200.0);
        }
    }

    #[test]
    fn test_synthesize_length_and_envelope() {
        let tone = ToneSpec::live_keystroke(&mut SeededRng::new(9));
        let samples = tone.synthesize(48_000);
        assert_eq!(samples.len(), 2400);
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak <= 0.1 + 1e-6);
        // gain decays, so the tail is quieter than the head
        let head = samples[..240].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = samples[2160..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail < head);
    }

    #[test]
    fn test_exp_ramp_endpoints() {
        assert!((exp_ramp(800.0, 200.0, 0.0) - 800.0).abs() < 1e-9);
        assert!((exp_ramp(800.0, 200.0, 1.0) - 200.0).abs() < 1e-9);
        assert!((exp_ramp(800.0, 200.0, 0.5) - 400.0).abs() < 1e-9);
        assert_eq!(exp_ramp(0.0, 1.0, 0.5), 0.5);
    }
}
