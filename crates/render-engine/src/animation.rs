//! Resolves an element's entrance curve at a point in time.

use std::f64::consts::{PI, TAU};

use serde::Serialize;

use instavid_common::SeededRng;
use instavid_project_model::{AnimationCurve, Element};

use crate::easing::{ease_out_bounce, ease_out_cubic, progress};

/// Visual adjustments applied around the element centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualTransform {
    pub opacity: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    /// Radians, clockwise on screen.
    pub rotation: f64,
    /// Gaussian blur radius in canvas units.
    pub blur: f64,
}

impl Default for VisualTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl VisualTransform {
    pub const IDENTITY: VisualTransform = VisualTransform {
        opacity: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
        rotation: 0.0,
        blur: 0.0,
    };
}

/// Everything the painters need to know about an element at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationFrame {
    /// Seconds since the element's start.
    pub local_time: f64,
    /// Linear entrance progress in [0, 1].
    pub progress: f64,
    /// `ease_out_cubic(progress)`.
    pub eased: f64,
    pub transform: VisualTransform,
    /// Characters shown by the typewriter curves; `None` shows everything.
    pub revealed: Option<usize>,
}

impl AnimationFrame {
    /// Whether the typewriter caret blinks on at this instant.
    pub fn caret_visible(&self) -> bool {
        self.revealed.is_some() && self.progress < 1.0 && (self.local_time * 2.0).floor() as i64 % 2 == 0
    }
}

/// Resolve `element` at timeline time `time`. Returns `None` outside the
/// element's visible window.
///
/// `seed` drives the glitch jitter. The generator is rebuilt from the seed,
/// the element id and the time on every call, so the same inputs always give
/// the same frame.
pub fn resolve(element: &Element, time: f64, seed: u64) -> Option<AnimationFrame> {
    if !element.is_visible_at(time) {
        return None;
    }
    let t = element.local_time(time);
    let p = progress(t, element.effective_animation_duration());
    let e = ease_out_cubic(p);

    let mut rng = SeededRng::derive(seed ^ element.id.0, time.to_bits());
    let transform = curve_transform(element.animation, t, p, e, &mut rng);

    let revealed = element
        .text()
        .filter(|_| element.animation.is_typewriter())
        .map(|text| revealed_chars(text.char_count(), p));

    Some(AnimationFrame {
        local_time: t,
        progress: p,
        eased: e,
        transform,
        revealed,
    })
}

/// `floor(p × len)`, clamped to `len`.
pub fn revealed_chars(len: usize, p: f64) -> usize {
    ((p.clamp(0.0, 1.0) * len as f64).floor() as usize).min(len)
}

/// Transform for `curve` at local time `t`, linear progress `p` and eased
/// progress `e`.
pub fn curve_transform(curve: AnimationCurve, t: f64, p: f64, e: f64, rng: &mut SeededRng) -> VisualTransform {
    let mut v = VisualTransform::IDENTITY;
    match curve {
        AnimationCurve::None
        | AnimationCurve::Typewriter
        | AnimationCurve::TypewriterSlow
        | AnimationCurve::TypewriterFast => {}
        AnimationCurve::Fade | AnimationCurve::Rainbow => v.opacity = e,
        AnimationCurve::SlideUp => {
            v.opacity = e;
            v.offset_y = (1.0 - e) * 100.0;
        }
        AnimationCurve::SlideDown => {
            v.opacity = e;
            v.offset_y = (e - 1.0) * 100.0;
        }
        AnimationCurve::SlideLeft => {
            v.opacity = e;
            v.offset_x = (1.0 - e) * 100.0;
        }
        AnimationCurve::SlideRight => {
            v.opacity = e;
            v.offset_x = (e - 1.0) * 100.0;
        }
        AnimationCurve::Scale => {
            v.opacity = e;
            v.scale = 0.5 + 0.5 * e;
        }
        AnimationCurve::ZoomIn => {
            v.opacity = e;
            v.scale = e;
        }
        AnimationCurve::ZoomOut => {
            v.opacity = e;
            v.scale = 2.0 - e;
        }
        AnimationCurve::Rotate => {
            v.opacity = e;
            v.rotation = (1.0 - e) * TAU;
            v.scale = 0.5 + 0.5 * e;
        }
        AnimationCurve::Glitch => {
            if p < 1.0 {
                let damp = 1.0 - p;
                v.offset_x = (rng.next_f64() - 0.5) * 20.0 * damp;
                v.offset_y = (rng.next_f64() - 0.5) * 20.0 * damp;
                if rng.next_f64() > 0.7 {
                    v.offset_x += (rng.next_f64() - 0.5) * 30.0 * damp;
                }
            }
            v.opacity = (1.2 * e).min(1.0);
        }
        AnimationCurve::Bounce => {
            v.scale = ease_out_bounce((1.5 * p).min(1.0));
            v.opacity = (2.0 * p).min(1.0);
        }
        AnimationCurve::Wave => {
            v.opacity = e;
            v.offset_y = (4.0 * t).sin() * 20.0 * (1.0 - p);
        }
        AnimationCurve::BlurIn => {
            v.opacity = e;
            v.blur = (1.0 - e) * 20.0;
        }
        AnimationCurve::Focus => {
            v.blur = ((1.0 - e) * PI).sin().abs() * 10.0;
            v.scale = 0.9 + 0.1 * e;
            v.opacity = (1.5 * e).min(1.0);
        }
        AnimationCurve::Shake => {
            if p < 0.8 {
                v.offset_x = (50.0 * t).sin() * 10.0 * (1.0 - p);
                v.offset_y = (50.0 * t).cos() * 10.0 * (1.0 - p);
            }
            v.opacity = (1.5 * e).min(1.0);
        }
        AnimationCurve::Flip => {
            v.opacity = e;
            v.scale = ((1.0 - e) * PI / 2.0).cos().abs();
        }
        AnimationCurve::Pop => {
            let q = (2.0 * p).min(1.0);
            v.scale = if q < 0.5 { 2.4 * q } else { 1.2 - (q - 0.5) * 0.4 };
            v.opacity = (3.0 * p).min(1.0);
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use instavid_project_model::{ElementId, ElementKind, ElementPatch};
    use proptest::prelude::*;

    fn heading(curve: AnimationCurve) -> Element {
        Element::create(
            ElementId(7),
            ElementKind::Heading,
            10.0,
            &ElementPatch {
                animation: Some(curve),
                ..Default::default()
            },
        )
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_slide_up_entrance() {
        let el = heading(AnimationCurve::SlideUp);
        let start = resolve(&el, 0.0, 1).unwrap();
        assert!(approx(start.transform.opacity, 0.0));
        assert!(approx(start.transform.offset_y, 100.0));

        let done = resolve(&el, 1.0, 1).unwrap();
        assert!(approx(done.transform.opacity, 1.0));
        assert!(approx(done.transform.offset_y, 0.0));

        assert!(resolve(&el, 10.01, 1).is_none());
        assert!(resolve(&el, 10.0, 1).is_some());
    }

    #[test]
    fn test_identity_after_entrance_for_settling_curves() {
        for curve in AnimationCurve::ALL {
            let el = heading(curve);
            let frame = resolve(&el, 5.0, 3).unwrap();
            let v = frame.transform;
            assert!(approx(v.opacity, 1.0), "{curve} opacity {}", v.opacity);
            assert!(approx(v.scale, 1.0), "{curve} scale {}", v.scale);
            assert!(approx(v.offset_x, 0.0) && approx(v.offset_y, 0.0), "{curve} offset");
            assert!(approx(v.blur, 0.0), "{curve} blur");
        }
    }

    #[test]
    fn test_rotate_and_pop_midway() {
        let v = curve_transform(AnimationCurve::Rotate, 0.0, 0.0, 0.0, &mut SeededRng::new(1));
        assert!(approx(v.rotation, TAU));
        assert!(approx(v.scale, 0.5));

        let v = curve_transform(AnimationCurve::Pop, 0.0, 0.125, 0.0, &mut SeededRng::new(1));
        // q = 0.25
        assert!(approx(v.scale, 0.6));
        assert!(approx(v.opacity, 0.375));
    }

    #[test]
    fn test_glitch_is_deterministic_per_frame() {
        let el = heading(AnimationCurve::Glitch);
        let a = resolve(&el, 0.2, 42).unwrap();
        let b = resolve(&el, 0.2, 42).unwrap();
        assert_eq!(a, b);
        assert!(a.transform.offset_x.abs() <= 10.0 + 15.0);
        assert!(a.transform.offset_y.abs() <= 10.0);
    }

    #[test]
    fn test_typewriter_reveals_by_character() {
        let mut el = heading(AnimationCurve::Typewriter);
        if let instavid_project_model::ElementContent::Text(t) = &mut el.content {
            t.text = "abcd".into();
        }
        assert_eq!(resolve(&el, 0.0, 0).unwrap().revealed, Some(0));
        assert_eq!(resolve(&el, 0.5, 0).unwrap().revealed, Some(2));
        assert_eq!(resolve(&el, 1.0, 0).unwrap().revealed, Some(4));
        assert_eq!(resolve(&heading(AnimationCurve::Fade), 0.5, 0).unwrap().revealed, None);
    }

    #[test]
    fn test_caret_blinks_during_typing() {
        let el = heading(AnimationCurve::TypewriterSlow);
        // slow: effective duration 2 s
        assert!(resolve(&el, 0.25, 0).unwrap().caret_visible());
        assert!(!resolve(&el, 0.75, 0).unwrap().caret_visible());
        assert!(!resolve(&el, 2.0, 0).unwrap().caret_visible());
    }

    proptest! {
        #[test]
        fn prop_revealed_count_is_monotone(len in 0usize..200, a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(revealed_chars(len, lo) <= revealed_chars(len, hi));
            prop_assert_eq!(revealed_chars(len, 1.0), len);
        }

        #[test]
        fn prop_monotone_curves_approach_rest(a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for curve in AnimationCurve::ALL.into_iter().filter(|c| c.is_monotone()) {
                let mut rng = SeededRng::new(1);
                let v0 = curve_transform(curve, lo, lo, ease_out_cubic(lo), &mut rng);
                let v1 = curve_transform(curve, hi, hi, ease_out_cubic(hi), &mut rng);
                prop_assert!(v0.opacity <= v1.opacity + 1e-12);
                prop_assert!(v0.offset_x.abs() + 1e-12 >= v1.offset_x.abs());
                prop_assert!(v0.offset_y.abs() + 1e-12 >= v1.offset_y.abs());
                prop_assert!((v0.scale - 1.0).abs() + 1e-12 >= (v1.scale - 1.0).abs());
            }
        }
    }
}
