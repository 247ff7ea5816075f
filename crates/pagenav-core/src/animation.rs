#![forbid(unsafe_code)]

//! Time-based animation primitives for scroll and entrance effects.
//!
//! Animations advance only when the caller ticks them with an explicit `dt`,
//! so a host-driven page (no wall clock) gets identical results on replay.
//!
//! - [`ScrollTween`] interpolates a vertical scroll offset between two positions.
//! - [`Fade`] produces normalized entrance progress for revealed elements.
//!
//! Both report progress through the [`Animation`] trait. Easing curves are
//! plain `fn(f64) -> f64` values, named by [`EasingKind`] when they have to
//! cross a configuration or serialization boundary.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-in (slower start than quadratic).
#[inline]
pub fn ease_in_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

/// Cubic ease-out (slower end than quadratic).
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Quartic ease-in-out. Used for link-driven scrolling: a gentle start, a fast
/// middle and a long settle onto the target.
#[inline]
pub fn ease_in_out_quart(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        8.0 * t.powi(4)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
    }
}

/// Named easing curve, for configuration and recorded traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingKind {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInCubic,
    EaseOutCubic,
    #[default]
    EaseInOutQuart,
}

impl EasingKind {
    /// Every named curve, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Linear,
        Self::EaseIn,
        Self::EaseOut,
        Self::EaseInOut,
        Self::EaseInCubic,
        Self::EaseOutCubic,
        Self::EaseInOutQuart,
    ];

    /// The easing function for this curve.
    #[must_use]
    pub fn function(self) -> EasingFn {
        match self {
            Self::Linear => linear,
            Self::EaseIn => ease_in,
            Self::EaseOut => ease_out,
            Self::EaseInOut => ease_in_out,
            Self::EaseInCubic => ease_in_cubic,
            Self::EaseOutCubic => ease_out_cubic,
            Self::EaseInOutQuart => ease_in_out_quart,
        }
    }

    /// Stable lowercase name (`"ease_in_out_quart"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease_in",
            Self::EaseOut => "ease_out",
            Self::EaseInOut => "ease_in_out",
            Self::EaseInCubic => "ease_in_cubic",
            Self::EaseOutCubic => "ease_out_cubic",
            Self::EaseInOutQuart => "ease_in_out_quart",
        }
    }

    /// Parse a curve name. Accepts snake_case and the camelCase names used by
    /// browser motion libraries (`"easeInOutQuart"`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL.into_iter().find(|kind| {
            kind.name()
                .chars()
                .filter(|c| *c != '_')
                .eq(normalized.chars())
        })
    }
}

impl core::fmt::Display for EasingKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f64;

    /// Reset the animation to its initial state.
    fn reset(&mut self);

    /// Time elapsed past completion.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

/// Zero durations are bumped to one nanosecond so progress stays finite and
/// the first non-zero tick completes the animation.
fn non_zero(duration: Duration) -> Duration {
    if duration.is_zero() {
        Duration::from_nanos(1)
    } else {
        duration
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f64 {
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Fade
// ---------------------------------------------------------------------------

/// Progression from 0.0 to 1.0 over a duration, with configurable easing.
///
/// Tracks elapsed time as [`Duration`] internally for precise accumulation.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a fade with the given duration and default linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: non_zero(duration),
            easing: linear,
        }
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    pub fn raw_progress(&self) -> f64 {
        progress(self.elapsed, self.duration)
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        (self.easing)(self.raw_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

// ---------------------------------------------------------------------------
// ScrollTween
// ---------------------------------------------------------------------------

/// Interpolates a scroll offset from `from` to `to` over a duration.
///
/// [`Animation::value`] returns eased progress; [`ScrollTween::position`]
/// returns the interpolated offset. Once complete, `position()` is exactly
/// `to` regardless of floating-point rounding in the interpolation.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTween {
    from: f64,
    to: f64,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl ScrollTween {
    /// Create a tween from `from` to `to` over `duration` (ease-in-out-quart).
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: non_zero(duration),
            easing: ease_in_out_quart,
        }
    }

    /// Set the easing function (builder).
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Starting offset.
    pub fn from(&self) -> f64 {
        self.from
    }

    /// Destination offset.
    pub fn to(&self) -> f64 {
        self.to
    }

    /// Configured duration (at least one nanosecond).
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Current interpolated offset.
    pub fn position(&self) -> f64 {
        if self.is_complete() {
            return self.to;
        }
        let t = (self.easing)(progress(self.elapsed, self.duration));
        self.from + (self.to - self.from) * t
    }
}

impl Animation for ScrollTween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        (self.easing)(progress(self.elapsed, self.duration))
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);
    const MS_100: Duration = Duration::from_millis(100);
    const MS_400: Duration = Duration::from_millis(400);
    const MS_800: Duration = Duration::from_millis(800);
    const SEC_1: Duration = Duration::from_secs(1);

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ---- Easing tests ----

    #[test]
    fn easing_endpoints_are_exact() {
        for kind in EasingKind::ALL {
            let f = kind.function();
            assert!(approx(f(0.0), 0.0), "{kind} at 0");
            assert!(approx(f(1.0), 1.0), "{kind} at 1");
        }
    }

    #[test]
    fn easing_clamps_input() {
        assert!(approx(linear(-1.0), 0.0));
        assert!(approx(linear(2.0), 1.0));
        assert!(approx(ease_in(-0.5), 0.0));
        assert!(approx(ease_out(1.5), 1.0));
        assert!(approx(ease_in_out_quart(7.0), 1.0));
    }

    #[test]
    fn ease_in_out_quart_is_symmetric() {
        assert!(approx(ease_in_out_quart(0.5), 0.5));
        for i in 0..=10 {
            let t = f64::from(i) / 20.0;
            let lhs = ease_in_out_quart(t);
            let rhs = 1.0 - ease_in_out_quart(1.0 - t);
            assert!((lhs - rhs).abs() < 1e-12, "asymmetric at t={t}");
        }
    }

    #[test]
    fn ease_in_out_quart_slower_start_than_quadratic() {
        assert!(ease_in_out_quart(0.2) < ease_in_out(0.2));
        assert!(ease_in_out_quart(0.8) > ease_in_out(0.8));
    }

    #[test]
    fn easing_kind_names_round_trip() {
        for kind in EasingKind::ALL {
            assert_eq!(EasingKind::parse(kind.name()), Some(kind));
        }
    }

    #[test]
    fn easing_kind_parses_camel_case() {
        assert_eq!(
            EasingKind::parse("easeInOutQuart"),
            Some(EasingKind::EaseInOutQuart)
        );
        assert_eq!(EasingKind::parse(" Linear "), Some(EasingKind::Linear));
        assert_eq!(EasingKind::parse("ease-out"), Some(EasingKind::EaseOut));
        assert_eq!(EasingKind::parse("bounce"), None);
    }

    #[test]
    fn easing_kind_default_is_quart() {
        assert_eq!(EasingKind::default(), EasingKind::EaseInOutQuart);
    }

    // ---- Fade tests ----

    #[test]
    fn fade_starts_at_zero() {
        let fade = Fade::new(SEC_1);
        assert!(approx(fade.value(), 0.0));
        assert!(!fade.is_complete());
    }

    #[test]
    fn fade_with_ease_out() {
        let mut fade = Fade::new(SEC_1).easing(ease_out);
        fade.tick(Duration::from_millis(500));
        assert!((fade.value() - 0.75).abs() < 1e-6);
        assert!((fade.raw_progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn fade_zero_duration_completes_on_first_tick() {
        let mut fade = Fade::new(Duration::ZERO);
        assert!(!fade.is_complete());
        fade.tick(MS_16);
        assert!(fade.is_complete());
        assert!(approx(fade.value(), 1.0));
    }

    #[test]
    fn fade_reset() {
        let mut fade = Fade::new(MS_100);
        fade.tick(SEC_1);
        assert!(fade.is_complete());
        assert_eq!(fade.overshoot(), Duration::from_millis(900));
        fade.reset();
        assert!(!fade.is_complete());
    }

    // ---- ScrollTween tests ----

    #[test]
    fn tween_starts_at_from() {
        let tween = ScrollTween::new(120.0, 720.0, MS_800);
        assert!(approx(tween.position(), 120.0));
    }

    #[test]
    fn tween_lands_exactly_on_target() {
        let mut tween = ScrollTween::new(0.1, 0.3, MS_800).easing(linear);
        tween.tick(MS_800);
        assert!(tween.is_complete());
        assert_eq!(tween.position(), 0.3);
    }

    #[test]
    fn tween_midpoint_with_linear() {
        let mut tween = ScrollTween::new(0.0, 1600.0, MS_800).easing(linear);
        tween.tick(MS_400);
        assert!((tween.position() - 800.0).abs() < 1e-6);
    }

    #[test]
    fn tween_scrolls_upward() {
        let mut tween = ScrollTween::new(2400.0, 0.0, MS_800);
        tween.tick(MS_400);
        assert!((tween.position() - 1200.0).abs() < 1e-6);
        tween.tick(MS_400);
        assert_eq!(tween.position(), 0.0);
    }

    #[test]
    fn tween_incremental_frames_complete() {
        let mut tween = ScrollTween::new(0.0, 720.0, MS_800);
        let mut prev = tween.position();
        for _ in 0..50 {
            tween.tick(MS_16);
            let pos = tween.position();
            assert!(pos >= prev, "tween went backwards: {prev} -> {pos}");
            prev = pos;
        }
        assert!(tween.is_complete());
        assert_eq!(tween.position(), 720.0);
    }

    #[test]
    fn tween_zero_duration() {
        let mut tween = ScrollTween::new(0.0, 500.0, Duration::ZERO);
        assert_eq!(tween.duration(), Duration::from_nanos(1));
        tween.tick(Duration::from_nanos(1));
        assert_eq!(tween.position(), 500.0);
    }

    #[test]
    fn tween_reset() {
        let mut tween = ScrollTween::new(10.0, 90.0, SEC_1);
        tween.tick(SEC_1);
        assert_eq!(tween.position(), 90.0);
        tween.reset();
        assert!(approx(tween.position(), 10.0));
        assert_eq!(tween.from(), 10.0);
        assert_eq!(tween.to(), 90.0);
    }

    #[test]
    fn tick_after_complete_is_safe() {
        let mut tween = ScrollTween::new(0.0, 100.0, MS_100);
        tween.tick(SEC_1);
        tween.tick(Duration::from_secs(3600));
        assert_eq!(tween.position(), 100.0);
        assert!(approx(tween.value(), 1.0));
    }
}
