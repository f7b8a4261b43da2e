use crate::mmm::types::SaturationCurve;
use serde::Serialize;

/// Sampling span, as a multiple of max capacity.
const CURVE_SPAN: f64 = 1.2;

/// Default number of segments when sampling a curve for display.
pub const DEFAULT_CURVE_STEPS: usize = 50;

/// Hill saturation as a fraction of max capacity, in [0, 1).
///
/// fraction(x) = x^s / (x^s + k^s), with k = half saturation, s = slope.
/// Zero spend (or less) gives zero response.
#[inline]
pub fn hill_fraction(curve: &SaturationCurve, spend: f64) -> f64 {
    if spend <= 0.0 || !spend.is_finite() {
        return 0.0;
    }
    // Divide through by x^s so large spends cannot overflow.
    let ratio = (curve.half_saturation / spend).powf(curve.slope);
    1.0 / (1.0 + ratio)
}

/// Absolute Hill response: max_capacity * fraction(spend).
#[inline]
pub fn hill_response(curve: &SaturationCurve, spend: f64) -> f64 {
    curve.max_capacity * hill_fraction(curve, spend)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    pub x: f64,
    /// Saturation percentage (0-100)
    pub y: f64,
    pub is_marker: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveSeries {
    pub channel: String,
    pub color: String,
    pub points: Vec<CurvePoint>,
    pub current_x: f64,
    pub current_y: f64,
}

/// Sample a curve from 0 to 1.2x capacity in `steps` segments and insert the
/// current-spend marker in x order.
pub fn curve_points(curve: &SaturationCurve, steps: usize) -> CurveSeries {
    let steps = steps.max(1);
    let max_x = curve.max_capacity * CURVE_SPAN;
    let step = max_x / steps as f64;

    let mut points: Vec<CurvePoint> = (0..=steps)
        .map(|i| {
            let x = step * i as f64;
            CurvePoint {
                x,
                y: hill_fraction(curve, x) * 100.0,
                is_marker: false,
            }
        })
        .collect();

    let current_x = curve.current_spend;
    let current_y = hill_fraction(curve, current_x) * 100.0;
    let idx = points.partition_point(|p| p.x <= current_x);
    points.insert(
        idx,
        CurvePoint {
            x: current_x,
            y: current_y,
            is_marker: true,
        },
    );

    CurveSeries {
        channel: curve.channel.clone(),
        color: curve.color.clone(),
        points,
        current_x,
        current_y,
    }
}
