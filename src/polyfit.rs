// src/polyfit.rs
//
// Least-squares quadratic fit of a stripe's accumulated contour points,
// solved through the explicit 3x3 normal equations. The fit runs in the
// detector's swapped space: image rows are the independent variable,
// columns the dependent one. Stack-allocated, no linear-algebra crate.

use tracing::debug;

use crate::error::TrackerError;
use crate::types::{Point2, PolyCurve, StripeFrame};

/// Default magnitude gate on the fitted quadratic coefficient. Fits with
/// `|a| >= gate` are discarded as not-a-lane. The gate is a tunable policy,
/// not part of the solver: override it through `detection.quadratic_gate`.
pub const QUADRATIC_GATE_DEFAULT: f64 = 1e-4;

/// Diagonal magnitude below which the normal equations count as singular.
const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct PolynomialFitter {
    quadratic_gate: f64,
}

impl Default for PolynomialFitter {
    fn default() -> Self {
        Self {
            quadratic_gate: QUADRATIC_GATE_DEFAULT,
        }
    }
}

impl PolynomialFitter {
    pub fn new(quadratic_gate: f64) -> Self {
        Self { quadratic_gate }
    }

    /// Fit `col = a*row^2 + b*row + c` through one stripe's points.
    ///
    /// No points is not an error, just an empty stripe. One or two points
    /// cannot determine three parameters and fail as `DegenerateFit`, as
    /// does an ill-conditioned solve. A solved fit whose quadratic
    /// coefficient trips the gate is discarded to an empty slot.
    pub fn fit_points(&self, points: &[Point2]) -> Result<Option<PolyCurve>, TrackerError> {
        if points.is_empty() {
            return Ok(None);
        }
        let n = points.len();
        if n < 3 {
            return Err(TrackerError::DegenerateFit { points: n });
        }

        // Normal equations A * res = B with A[j][k] = sum(x^(j+k)) and
        // B[j] = sum(x^j * y), where x is the row and y the column.
        let mut a = [[0.0f64; 3]; 3];
        let mut b = [0.0f64; 3];
        for p in points {
            let x = p.y;
            let y = p.x;
            for j in 0..3 {
                for k in 0..3 {
                    if j == 0 && k == 0 {
                        a[j][k] += 1.0;
                    } else {
                        a[j][k] += x.powi((j + k) as i32);
                    }
                }
                b[j] += x.powi(j as i32) * y;
            }
        }

        // Forward elimination with per-row normalization, no pivoting. The
        // normal matrix of a reasonably dense point set keeps its diagonal
        // away from zero; anything else is a degenerate stripe.
        for i in 0..3 {
            let d = a[i][i];
            if d.abs() < PIVOT_EPSILON {
                return Err(TrackerError::DegenerateFit { points: n });
            }
            for j in i..3 {
                a[i][j] /= d;
            }
            b[i] /= d;
            for j in (i + 1)..3 {
                let factor = a[j][i];
                for k in i..3 {
                    a[j][k] -= factor * a[i][k];
                }
                b[j] -= factor * b[i];
            }
        }

        // Back substitution; res[j] is the coefficient of row^j.
        let mut res = [0.0f64; 3];
        for i in (0..3).rev() {
            let mut value = b[i];
            for j in (i + 1)..3 {
                value -= a[i][j] * res[j];
            }
            res[i] = value;
        }

        if res[2].abs() < self.quadratic_gate {
            Ok(Some(PolyCurve::new(res[2], res[1], res[0])))
        } else {
            debug!(
                quadratic = res[2],
                gate = self.quadratic_gate,
                "discarding fit, quadratic coefficient over the gate"
            );
            Ok(None)
        }
    }

    /// Fit every stripe of a frame, recovering per-stripe failures as empty
    /// slots so the frame loop keeps running.
    pub fn fit_frame(&self, stripe_points: &[Vec<Point2>]) -> StripeFrame<PolyCurve> {
        let mut frame = StripeFrame::empty(stripe_points.len());
        for (stripe, points) in stripe_points.iter().enumerate() {
            match self.fit_points(points) {
                Ok(curve) => frame.set(stripe, curve),
                Err(err) => {
                    debug!(stripe, error = %err, "stripe fit failed");
                }
            }
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;

    fn sample_quadratic(a: f64, b: f64, c: f64, rows: &[f64]) -> Vec<Point2> {
        rows.iter()
            .map(|&row| Point2::new(a * row * row + b * row + c, row))
            .collect()
    }

    #[test]
    fn test_round_trip_of_a_known_quadratic() {
        let (a, b, c) = (5e-5, -0.3, 640.0);
        let rows: Vec<f64> = (0..12).map(|i| i as f64 * 60.0).collect();
        let points = sample_quadratic(a, b, c, &rows);

        let fitter = PolynomialFitter::default();
        let curve = fitter.fit_points(&points).unwrap().unwrap();
        assert!((curve.a - a).abs() < 1e-6, "a: {} vs {}", curve.a, a);
        assert!((curve.b - b).abs() < 1e-4, "b: {} vs {}", curve.b, b);
        assert!((curve.c - c).abs() < 1e-2, "c: {} vs {}", curve.c, c);
    }

    #[test]
    fn test_straight_line_fits_with_zero_quadratic() {
        let points = sample_quadratic(0.0, 0.5, 300.0, &[0.0, 100.0, 200.0, 300.0, 400.0]);
        let curve = PolynomialFitter::default()
            .fit_points(&points)
            .unwrap()
            .unwrap();
        assert!(curve.a.abs() < 1e-7);
        assert!((curve.b - 0.5).abs() < 1e-5);
        assert!((curve.c - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_stripe_is_not_an_error() {
        let result = PolynomialFitter::default().fit_points(&[]).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_too_few_points_fail_explicitly() {
        let fitter = PolynomialFitter::default();
        for count in 1..3 {
            let points = sample_quadratic(0.0, 1.0, 0.0, &vec![10.0; count]);
            match fitter.fit_points(&points[..count]) {
                Err(TrackerError::DegenerateFit { points }) => assert_eq!(points, count),
                other => panic!("expected DegenerateFit, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_coincident_rows_are_degenerate() {
        // Three points on one row: the normal equations collapse.
        let points = vec![
            Point2::new(100.0, 50.0),
            Point2::new(110.0, 50.0),
            Point2::new(120.0, 50.0),
        ];
        assert!(matches!(
            PolynomialFitter::default().fit_points(&points),
            Err(TrackerError::DegenerateFit { .. })
        ));
    }

    #[test]
    fn test_gate_discards_strong_curvature() {
        // A parabola with |a| far over the gate is dropped, not returned.
        let points = sample_quadratic(0.01, 0.0, 100.0, &[0.0, 100.0, 200.0, 300.0, 400.0]);
        let result = PolynomialFitter::default().fit_points(&points).unwrap();
        assert!(result.is_none());

        // Raising the gate lets the same fit through.
        let curve = PolynomialFitter::new(0.1).fit_points(&points).unwrap().unwrap();
        assert!((curve.a - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_fit_frame_recovers_per_stripe() {
        let stripes = vec![
            Vec::new(),                                                 // empty
            sample_quadratic(0.0, 0.0, 310.0, &[0.0, 100.0, 200.0]),    // fits
            vec![Point2::new(1.0, 2.0)],                                // degenerate
        ];
        let frame = PolynomialFitter::default().fit_frame(&stripes);
        assert!(frame.get(0).is_none());
        assert!((frame.get(1).unwrap().c - 310.0).abs() < 1e-6);
        assert!(frame.get(2).is_none());
    }
}
