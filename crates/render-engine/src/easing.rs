//! Easing functions on normalized progress.

/// Cubic ease-out, `1 - (1 - p)^3`. Input is clamped to [0, 1].
pub fn ease_out_cubic(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Piecewise-quadratic bounce that settles at 1.
pub fn ease_out_bounce(p: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    let p = p.clamp(0.0, 1.0);
    if p < 1.0 / D1 {
        N1 * p * p
    } else if p < 2.0 / D1 {
        let p = p - 1.5 / D1;
        N1 * p * p + 0.75
    } else if p < 2.5 / D1 {
        let p = p - 2.25 / D1;
        N1 * p * p + 0.9375
    } else {
        let p = p - 2.625 / D1;
        N1 * p * p + 0.984_375
    }
}

/// Linear progress of `local_time` through an entrance of `duration`
/// seconds, clamped to [0, 1]. A non-positive duration means the entrance
/// is already complete.
pub fn progress(local_time: f64, duration: f64) -> f64 {
    if !(duration > 0.0) {
        return if local_time >= 0.0 { 1.0 } else { 0.0 };
    }
    (local_time / duration).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
        assert_eq!(ease_out_cubic(-3.0), 0.0);
        assert_eq!(ease_out_cubic(7.0), 1.0);
    }

    #[test]
    fn test_ease_out_bounce_endpoints() {
        assert_eq!(ease_out_bounce(0.0), 0.0);
        assert!((ease_out_bounce(1.0) - 1.0).abs() < 1e-12);
        // first landing
        assert!((ease_out_bounce(1.0 / 2.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_progress_with_zero_duration() {
        assert_eq!(progress(0.5, 0.0), 1.0);
        assert_eq!(progress(-0.5, 0.0), 0.0);
        assert_eq!(progress(0.25, 1.0), 0.25);
        assert_eq!(progress(3.0, 1.0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_ease_out_cubic_monotone(a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ease_out_cubic(lo) <= ease_out_cubic(hi));
        }

        #[test]
        fn prop_ease_out_cubic_stays_in_unit_range(p in -10.0f64..10.0) {
            let e = ease_out_cubic(p);
            prop_assert!((0.0..=1.0).contains(&e));
        }

        #[test]
        fn prop_ease_out_bounce_bounded(p in 0.0f64..=1.0) {
            let e = ease_out_bounce(p);
            prop_assert!((0.0..=1.0 + 1e-9).contains(&e));
        }
    }
}
