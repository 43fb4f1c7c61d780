//! Named entrance animations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Entrance animation applied during an element's first
/// `animation_duration / animation_speed` seconds of local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationCurve {
    None,
    #[default]
    Fade,
    SlideUp,
    SlideDown,
    SlideLeft,
    SlideRight,
    Scale,
    ZoomIn,
    ZoomOut,
    Rotate,
    Typewriter,
    TypewriterSlow,
    TypewriterFast,
    Glitch,
    Bounce,
    Wave,
    BlurIn,
    Focus,
    Shake,
    Flip,
    Pop,
    Rainbow,
}

impl AnimationCurve {
    pub const ALL: [AnimationCurve; 22] = [
        Self::None,
        Self::Fade,
        Self::SlideUp,
        Self::SlideDown,
        Self::SlideLeft,
        Self::SlideRight,
        Self::Scale,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::Rotate,
        Self::Typewriter,
        Self::TypewriterSlow,
        Self::TypewriterFast,
        Self::Glitch,
        Self::Bounce,
        Self::Wave,
        Self::BlurIn,
        Self::Focus,
        Self::Shake,
        Self::Flip,
        Self::Pop,
        Self::Rainbow,
    ];

    /// Kebab-case name as used in scene files.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fade => "fade",
            Self::SlideUp => "slide-up",
            Self::SlideDown => "slide-down",
            Self::SlideLeft => "slide-left",
            Self::SlideRight => "slide-right",
            Self::Scale => "scale",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::Rotate => "rotate",
            Self::Typewriter => "typewriter",
            Self::TypewriterSlow => "typewriter-slow",
            Self::TypewriterFast => "typewriter-fast",
            Self::Glitch => "glitch",
            Self::Bounce => "bounce",
            Self::Wave => "wave",
            Self::BlurIn => "blur-in",
            Self::Focus => "focus",
            Self::Shake => "shake",
            Self::Flip => "flip",
            Self::Pop => "pop",
            Self::Rainbow => "rainbow",
        }
    }

    /// Whether the curve reveals text one character at a time.
    pub fn is_typewriter(self) -> bool {
        matches!(
            self,
            Self::Typewriter | Self::TypewriterSlow | Self::TypewriterFast
        )
    }

    /// Whether opacity and offsets only ever move toward their resting value.
    pub fn is_monotone(self) -> bool {
        matches!(
            self,
            Self::Fade
                | Self::SlideUp
                | Self::SlideDown
                | Self::SlideLeft
                | Self::SlideRight
                | Self::Scale
                | Self::ZoomIn
                | Self::ZoomOut
        )
    }

    /// Speed multiplier that replaces the element's own speed, if any.
    pub fn speed_override(self) -> Option<f64> {
        match self {
            Self::TypewriterSlow => Some(0.5),
            Self::TypewriterFast => Some(2.0),
            _ => None,
        }
    }

    /// Seconds the entrance takes for the given authored duration and speed.
    pub fn effective_duration(self, animation_duration: f64, speed: f64) -> f64 {
        let speed = self.speed_override().unwrap_or(speed);
        let speed = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
        animation_duration / speed
    }
}

impl fmt::Display for AnimationCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationCurve {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown animation '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_serde() {
        for curve in AnimationCurve::ALL {
            let json = serde_json::to_string(&curve).unwrap();
            assert_eq!(json, format!("\"{}\"", curve.name()));
            assert_eq!(curve.name().parse::<AnimationCurve>().unwrap(), curve);
        }
    }

    #[test]
    fn test_typewriter_speed_overrides() {
        assert_eq!(AnimationCurve::Typewriter.effective_duration(2.0, 1.0), 2.0);
        assert_eq!(AnimationCurve::TypewriterSlow.effective_duration(2.0, 1.0), 4.0);
        assert_eq!(AnimationCurve::TypewriterFast.effective_duration(2.0, 3.0), 1.0);
        assert_eq!(AnimationCurve::Fade.effective_duration(1.0, 2.0), 0.5);
    }

    #[test]
    fn test_bad_speed_falls_back_to_one() {
        assert_eq!(AnimationCurve::Fade.effective_duration(1.5, 0.0), 1.5);
        assert_eq!(AnimationCurve::Fade.effective_duration(1.5, f64::NAN), 1.5);
    }
}
