//! Cross-fade curves.
//!
//! A curve maps normalized fade progress `t` in `[0, 1]` to the weight of the
//! incoming slot. The outgoing slot always receives the complementary weight.

use serde::{Deserialize, Serialize};

/// A single curve key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Weight curve evaluated during a cross-fade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    #[default]
    Linear,
    /// Smoothstep easing, flat at both ends.
    EaseInOut,
    /// Piecewise-linear interpolation through user keys.
    Keys(Vec<CurveKey>),
}

impl FadeCurve {
    /// Build a keyed curve. Keys are sorted by time.
    pub fn from_keys(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self::Keys(keys)
    }

    /// Sample the curve at normalized time `t`.
    ///
    /// # Arguments
    ///
    /// * `t` - Fade progress, clamped to `[0, 1]`.
    ///
    /// # Returns
    ///
    /// The incoming-slot weight. Keyed curves are clamped to their first and
    /// last key values outside the key range; an empty key list behaves as
    /// [`FadeCurve::Linear`].
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            FadeCurve::Linear => t,
            FadeCurve::EaseInOut => t * t * (3.0 - 2.0 * t),
            FadeCurve::Keys(keys) => evaluate_keys(keys, t),
        }
    }

    /// Validate user keys. Returns a description of the first problem found.
    pub fn check(&self) -> Result<(), String> {
        let FadeCurve::Keys(keys) = self else {
            return Ok(());
        };
        for key in keys {
            if !key.time.is_finite() || !key.value.is_finite() {
                return Err(format!("curve key ({}, {}) is not finite", key.time, key.value));
            }
        }
        Ok(())
    }
}

fn evaluate_keys(keys: &[CurveKey], t: f32) -> f32 {
    let (first, last) = match (keys.first(), keys.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return t,
    };
    if t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }

    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t >= a.time && t <= b.time {
            let span = b.time - a.time;
            if span <= f32::EPSILON {
                return b.value;
            }
            let alpha = (t - a.time) / span;
            return a.value + (b.value - a.value) * alpha;
        }
    }

    last.value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_identity_and_clamped() {
        let curve = FadeCurve::Linear;
        assert_eq!(curve.evaluate(0.25), 0.25);
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert_eq!(curve.evaluate(2.0), 1.0);
    }

    #[test]
    fn ease_in_out_hits_endpoints_and_midpoint() {
        let curve = FadeCurve::EaseInOut;
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(1.0), 1.0);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!(curve.evaluate(0.1) < 0.1);
    }

    #[test]
    fn keys_interpolate_between_neighbours() {
        let curve = FadeCurve::from_keys(vec![
            CurveKey::new(1.0, 1.0),
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.5, 0.8),
        ]);
        assert!((curve.evaluate(0.25) - 0.4).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.9).abs() < 1e-6);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn keys_clamp_outside_range() {
        let curve = FadeCurve::from_keys(vec![CurveKey::new(0.2, 0.1), CurveKey::new(0.6, 0.7)]);
        assert_eq!(curve.evaluate(0.0), 0.1);
        assert_eq!(curve.evaluate(0.9), 0.7);
    }

    #[test]
    fn curve_deserializes_from_json() {
        let curve: FadeCurve = serde_json::from_str(r#""ease_in_out""#).expect("deserialize");
        assert_eq!(curve, FadeCurve::EaseInOut);
        let keyed: FadeCurve =
            serde_json::from_str(r#"{"keys":[{"time":0.0,"value":0.0},{"time":1.0,"value":1.0}]}"#)
                .expect("deserialize keys");
        assert!((keyed.evaluate(0.3) - 0.3).abs() < 1e-6);
    }
}
