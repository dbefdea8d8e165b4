//! Easing curves and time-based tweens

use serde::{Deserialize, Serialize};

/// Easing curve applied to normalized progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    /// Quadratic ease-out
    #[default]
    Power1Out,
    /// Cubic ease-out
    Power2Out,
    /// Quartic ease-out
    Power3Out,
    /// Symmetric sine ease-in-out (used for pulses)
    SineInOut,
}

impl Ease {
    /// Map progress in [0, 1] to eased progress in [0, 1]
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t).powi(2),
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::Power3Out => 1.0 - (1.0 - t).powi(4),
            Ease::SineInOut => 0.5 - 0.5 * (std::f32::consts::PI * t).cos(),
        }
    }
}

/// A value animated from `from` to `to` over a fixed window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub start_ms: f64,
    pub duration_ms: f64,
    pub ease: Ease,
}

impl Tween {
    pub fn new(start_ms: f64, duration_ms: f64, ease: Ease) -> Self {
        Self {
            start_ms,
            duration_ms,
            ease,
        }
    }

    /// Linear progress at `now_ms`, clamped to [0, 1]
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return if now_ms >= self.start_ms { 1.0 } else { 0.0 };
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Eased progress at `now_ms`
    pub fn sample(&self, now_ms: f64) -> f32 {
        self.ease.apply(self.progress(now_ms))
    }

    pub fn is_done(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// Repeating `rest -> peak -> rest` keyframe loop
///
/// Returns `rest` at phase 0, `peak` at half period.
pub fn pulse(elapsed_ms: f64, period_ms: f64, rest: f32, peak: f32) -> f32 {
    if period_ms <= 0.0 {
        return rest;
    }
    let phase = (elapsed_ms.max(0.0) % period_ms / period_ms) as f32;
    let t = 1.0 - (2.0 * phase - 1.0).abs();
    crate::lerp(rest, peak, Ease::SineInOut.apply(t))
}
