//! Integration tests for easing curves and scroll tweens.

use pagenav_core::animation::*;
use proptest::prelude::*;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

#[test]
fn easing_functions_are_monotonic() {
    for kind in EasingKind::ALL {
        let easing = kind.function();
        let mut prev = 0.0f64;
        for i in 0..=1000 {
            let t = f64::from(i) / 1000.0;
            let v = easing(t);
            assert!(v >= prev - 1e-12, "{kind} should be monotonic at t={t}");
            prev = v;
        }
    }
}

#[test]
fn link_scroll_settles_within_duration() {
    // 800ms at ~60fps: 50 frames.
    let mut tween = ScrollTween::new(0.0, 1520.0, Duration::from_millis(800));
    let mut frames = 0;
    while !tween.is_complete() {
        tween.tick(FRAME);
        frames += 1;
        assert!(frames <= 50, "tween overran its duration");
    }
    assert_eq!(frames, 50);
    assert_eq!(tween.position(), 1520.0);
}

#[test]
fn tween_overshoot_is_reported() {
    let mut tween = ScrollTween::new(0.0, 100.0, Duration::from_millis(100));
    tween.tick(Duration::from_millis(130));
    assert_eq!(tween.overshoot(), Duration::from_millis(30));
}

proptest! {
    #[test]
    fn easing_output_stays_in_unit_range(t in -10.0f64..10.0, idx in 0usize..EasingKind::ALL.len()) {
        let v = EasingKind::ALL[idx].function()(t);
        prop_assert!((0.0..=1.0).contains(&v), "value out of range: {}", v);
    }

    #[test]
    fn tween_position_is_bounded_by_endpoints(
        from in 0.0f64..10_000.0,
        to in 0.0f64..10_000.0,
        elapsed_ms in 0u64..2_000,
        idx in 0usize..EasingKind::ALL.len(),
    ) {
        let mut tween = ScrollTween::new(from, to, Duration::from_millis(800))
            .easing(EasingKind::ALL[idx].function());
        tween.tick(Duration::from_millis(elapsed_ms));
        let pos = tween.position();
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        prop_assert!(pos >= lo - 1e-6 && pos <= hi + 1e-6, "pos {} outside [{}, {}]", pos, lo, hi);
    }

    #[test]
    fn tween_completes_exactly_on_target(from in -5_000.0f64..5_000.0, to in -5_000.0f64..5_000.0) {
        let mut tween = ScrollTween::new(from, to, Duration::from_millis(800));
        tween.tick(Duration::from_millis(800));
        prop_assert_eq!(tween.position(), to);
    }
}
