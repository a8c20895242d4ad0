//! Composable scorer primitives
//!
//! Actions assemble their scores from these blocks instead of ad-hoc
//! arithmetic, so every score stays inside [0,1] by construction.

/// Clamp to the unit interval
#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

/// Clamped ramp: 0 at `min`, 1 at `max`
///
/// A degenerate range (`max <= min`) acts as a step at `min`.
#[inline]
pub fn linear(min: f32, max: f32, value: f32) -> f32 {
    if max <= min {
        return if value >= min { 1.0 } else { 0.0 };
    }
    clamp01((value - min) / (max - min))
}

/// 1 − ramp: 1 at `min`, 0 at `max`
#[inline]
pub fn inverse(min: f32, max: f32, value: f32) -> f32 {
    1.0 - linear(min, max, value)
}

/// Response curve: raises the normalized value to `base`
///
/// `base > 1` suppresses small inputs (slow start), `base < 1` amplifies
/// them (fast start).
#[inline]
pub fn exponential(base: f32, value: f32) -> f32 {
    clamp01(value).powf(base)
}

/// Step function: 1 when `value >= cutoff`
#[inline]
pub fn threshold(cutoff: f32, value: f32) -> f32 {
    if value >= cutoff { 1.0 } else { 0.0 }
}

/// Product of two unit-interval scores
#[inline]
pub fn multiply(a: f32, b: f32) -> f32 {
    clamp01(a) * clamp01(b)
}

/// Sum saturating at 1.0
#[inline]
pub fn add(a: f32, b: f32) -> f32 {
    clamp01(a + b)
}
