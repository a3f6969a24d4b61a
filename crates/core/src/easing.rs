//! Easing curves for property tweens.
//!
//! Each curve maps normalized progress `t ∈ [0, 1]` to a blend factor. Most
//! curves stay within `[0, 1]`; `InBack` dips below zero before accelerating
//! and `OutBounce` touches 1 several times before settling.

use std::f32::consts::FRAC_PI_2;

/// Overshoot constant for the back curve (Penner's `s`).
const BACK_OVERSHOOT: f32 = 1.70158;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Easing {
    Linear,
    /// Accelerating `t²`.
    Quadratic,
    /// Decelerating quarter-cosine.
    InCos,
    /// Accelerating quarter-cosine.
    OutCos,
    InBack,
    OutBounce,
}

impl Easing {
    /// Blend factor for progress `t`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Quadratic => t * t,
            Easing::InCos => ((1.0 - t) * FRAC_PI_2).cos(),
            Easing::OutCos => 1.0 - (t * FRAC_PI_2).cos(),
            Easing::InBack => t * t * ((BACK_OVERSHOOT + 1.0) * t - BACK_OVERSHOOT),
            Easing::OutBounce => out_bounce(t),
        }
    }

    /// Interpolate between `from` and `to` at progress `t`.
    pub fn blend(self, from: f32, to: f32, t: f32) -> f32 {
        from + self.apply(t) * (to - from)
    }
}

fn out_bounce(mut t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;

    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        t -= 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        t -= 2.25 / D;
        N * t * t + 0.9375
    } else {
        t -= 2.625 / D;
        N * t * t + 0.984375
    }
}
