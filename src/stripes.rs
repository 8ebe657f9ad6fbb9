// src/stripes.rs
//
// Spatial partitioning of raw line detections into fixed-width stripes.
// The detection primitive returns lines in row/column swapped space; a
// line's home stripe is decided by where it crosses the reference row.

use crate::error::TrackerError;
use crate::tracker::HistoryWindow;
use crate::types::{Curve, LinearLine, StripeFrame};

/// Slant-filter threshold on `|-b/a|`. Lines at or below it are sampling
/// noise running across the road rather than along it.
pub const SLANT_TANGENT_THRESHOLD: f64 = 7.0;

/// Drop noise lines whose slant tangent magnitude is at or below the
/// threshold. Lines with `a == 0` have no slant and always survive.
pub fn rm_slanted_lines(lines: &mut Vec<LinearLine>) {
    lines.retain(|line| match line.slant_tangent() {
        Some(tangent) => tangent.abs() > SLANT_TANGENT_THRESHOLD,
        None => true,
    });
}

/// Contiguous `(min, max)` reference-row ranges, one per stripe, covering
/// `stripe_count * stripe_width` columns.
pub fn stripe_ranges(stripe_count: usize, stripe_width: f64) -> Vec<(f64, f64)> {
    (0..stripe_count)
        .map(|i| (i as f64 * stripe_width, (i + 1) as f64 * stripe_width))
        .collect()
}

/// Whether a stabilized frame still carries at least one curve. A per-frame
/// health signal, not an error.
pub fn lines_found<T>(frame: &StripeFrame<T>) -> bool {
    frame.any_occupied()
}

/// Assigns each frame's detected lines to stripes and keeps its own history
/// of the resulting frames.
#[derive(Debug)]
pub struct StripePartitioner {
    ranges: Vec<(f64, f64)>,
    window: HistoryWindow<LinearLine>,
}

impl StripePartitioner {
    pub fn new(
        stripe_count: usize,
        image_width: f64,
        history_depth: usize,
    ) -> Result<Self, TrackerError> {
        if stripe_count == 0 {
            return Err(TrackerError::Configuration(
                "stripe count must be at least 1".into(),
            ));
        }
        let stripe_width = image_width / stripe_count as f64;
        Ok(Self {
            ranges: stripe_ranges(stripe_count, stripe_width),
            window: HistoryWindow::new(history_depth, stripe_count),
        })
    }

    pub fn stripe_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[(f64, f64)] {
        &self.ranges
    }

    /// Select one line per stripe: the last detected line whose reference
    /// intercept falls strictly inside the stripe's range. Lines that never
    /// cross the reference row are skipped. The resulting frame is pushed
    /// into the partitioner's history window.
    pub fn partition(&mut self, lines: &[LinearLine]) -> StripeFrame<LinearLine> {
        let mut frame = StripeFrame::empty(self.ranges.len());

        for (stripe, &(min, max)) in self.ranges.iter().enumerate() {
            for line in lines {
                if let Some(intercept) = line.reference_intercept() {
                    if intercept > min && intercept < max {
                        frame.set(stripe, Some(*line));
                    }
                }
            }
        }

        self.window.push(frame.clone());
        frame
    }

    pub fn window(&self) -> &HistoryWindow<LinearLine> {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_line(col: f64) -> LinearLine {
        LinearLine::new(0.0, 1.0, -col)
    }

    #[test]
    fn test_every_line_lands_in_exactly_one_stripe() {
        let mut partitioner = StripePartitioner::new(8, 1200.0, 10).unwrap();
        let lines = vec![vertical_line(310.0), vertical_line(890.0)];
        let frame = partitioner.partition(&lines);

        let occupied: Vec<usize> = (0..frame.len()).filter(|&i| frame.is_occupied(i)).collect();
        assert_eq!(occupied, vec![2, 5]);

        // The chosen stripe's range always contains the line's intercept.
        for &stripe in &occupied {
            let (min, max) = partitioner.ranges()[stripe];
            let intercept = frame.get(stripe).unwrap().reference_intercept().unwrap();
            assert!(intercept > min && intercept < max);
        }
    }

    #[test]
    fn test_last_qualifying_line_wins() {
        let mut partitioner = StripePartitioner::new(4, 400.0, 10).unwrap();
        let lines = vec![vertical_line(120.0), vertical_line(130.0)];
        let frame = partitioner.partition(&lines);
        assert_eq!(frame.get(1), Some(&vertical_line(130.0)));
    }

    #[test]
    fn test_boundary_and_outside_intercepts_are_skipped() {
        let mut partitioner = StripePartitioner::new(4, 400.0, 10).unwrap();
        // Exactly on a stripe boundary (strictly-inside test) and off-image.
        let lines = vec![vertical_line(100.0), vertical_line(450.0)];
        let frame = partitioner.partition(&lines);
        assert!(!frame.any_occupied());
    }

    #[test]
    fn test_row_parallel_line_is_skipped() {
        let mut partitioner = StripePartitioner::new(4, 400.0, 10).unwrap();
        // b == 0: never crosses the reference row.
        let frame = partitioner.partition(&[LinearLine::new(1.0, 0.0, -50.0)]);
        assert!(!frame.any_occupied());
    }

    #[test]
    fn test_rm_slanted_lines() {
        let mut lines = vec![
            LinearLine::new(0.0, 1.0, -310.0),  // no slant, kept
            LinearLine::new(1.0, -20.0, 5.0),   // tangent 20, kept
            LinearLine::new(1.0, -7.0, 5.0),    // tangent exactly 7, dropped
            LinearLine::new(1.0, -0.5, 5.0),    // tangent 0.5, dropped
        ];
        rm_slanted_lines(&mut lines);
        assert_eq!(
            lines,
            vec![LinearLine::new(0.0, 1.0, -310.0), LinearLine::new(1.0, -20.0, 5.0)]
        );
    }

    #[test]
    fn test_lines_found() {
        let mut frame: StripeFrame<LinearLine> = StripeFrame::empty(3);
        assert!(!lines_found(&frame));
        frame.set(0, Some(vertical_line(10.0)));
        assert!(lines_found(&frame));
    }
}
