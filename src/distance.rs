// src/distance.rs
//
// Converts the stabilized lane curves into real-world lateral distances
// from the vehicle center. Curves live in rectified bird's-eye space;
// sampled points go back through the inverse rectification transform and
// then through the calibration matrix into world coordinates.

use serde::Serialize;
use tracing::debug;

use crate::error::{Side, TrackerError};
use crate::perspective::{Calibration, PerspectiveTransform};
use crate::types::{Curve, Point2, StripeFrame};

/// One sampled point's offset from the world-space vehicle center: `dx` is
/// signed, `dy` is a one-axis absolute distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Per-frame distance output: the scalar left/right pair measured at the
/// nearest sampled row, plus a near/mid/far breakdown per side.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceReport {
    pub left: f64,
    pub right: f64,
    pub left_samples: [WorldOffset; 3],
    pub right_samples: [WorldOffset; 3],
}

pub struct DistanceEngine {
    transform: PerspectiveTransform,
    calibration: Calibration,
    image_height: f64,
    center_column: f64,
}

impl DistanceEngine {
    pub fn new(
        transform: PerspectiveTransform,
        calibration: Calibration,
        output_width: u32,
        output_height: u32,
    ) -> Self {
        Self {
            transform,
            calibration,
            image_height: output_height as f64,
            center_column: (output_width as f64 / 2.0).floor(),
        }
    }

    /// The curves adjacent to the image's vertical centerline, judged by
    /// where each curve crosses the bottom row. Bounds-checked: a side with
    /// no qualifying curve is an explicit error, never a wild index.
    fn adjacent_curves<C: Curve>(
        &self,
        frame: &StripeFrame<C>,
    ) -> Result<(usize, usize), TrackerError> {
        let bottom = self.image_height;
        let column = |stripe: usize| {
            frame
                .get(stripe)
                .and_then(|curve| curve.column_at(bottom))
        };

        let right = (0..frame.len())
            .find(|&i| column(i).is_some_and(|x| x >= self.center_column))
            .ok_or(TrackerError::NoLaneOnSide { side: Side::Right })?;
        let left = (0..frame.len())
            .rev()
            .find(|&i| column(i).is_some_and(|x| x <= self.center_column))
            .ok_or(TrackerError::NoLaneOnSide { side: Side::Left })?;

        Ok((left, right))
    }

    /// A curve sampled at the full-height, half-height and zero rows, in
    /// bird's-eye coordinates.
    fn sample_rows<C: Curve>(&self, curve: &C) -> [Point2; 3] {
        let rows = [self.image_height, self.image_height / 2.0, 0.0];
        rows.map(|row| Point2::new(curve.column_at(row).unwrap_or(f64::NAN), row))
    }

    fn to_world(&self, bird_point: Point2) -> Point2 {
        self.calibration.to_world(self.transform.to_camera(bird_point))
    }

    /// Measure lateral distances for one stabilized frame.
    pub fn measure<C: Curve>(&self, frame: &StripeFrame<C>) -> Result<DistanceReport, TrackerError> {
        let (left_idx, right_idx) = self.adjacent_curves(frame)?;
        debug!(left_idx, right_idx, "adjacent lane curves selected");

        let left_curve = frame
            .get(left_idx)
            .ok_or(TrackerError::NoLaneOnSide { side: Side::Left })?;
        let right_curve = frame
            .get(right_idx)
            .ok_or(TrackerError::NoLaneOnSide { side: Side::Right })?;
        let left_points = self.sample_rows(left_curve);
        let right_points = self.sample_rows(right_curve);

        // World position of the bottom-row image center. The per-sample
        // breakdown is also measured against this point.
        let center = self.to_world(Point2::new(self.center_column, self.image_height));

        let euclid = |p: Point2| {
            let w = self.to_world(p);
            ((w.x - center.x).powi(2) + (w.y - center.y).powi(2)).sqrt()
        };
        let offset = |p: Point2| {
            let w = self.to_world(p);
            WorldOffset {
                dx: center.x - w.x,
                dy: (center.y - w.y).abs(),
            }
        };

        Ok(DistanceReport {
            left: euclid(left_points[0]),
            right: euclid(right_points[0]),
            left_samples: left_points.map(offset),
            right_samples: right_points.map(offset),
        })
    }
}
