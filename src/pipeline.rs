// src/pipeline.rs
//
// Per-frame orchestration. Single-threaded and frame-synchronous: every
// stage runs to completion before the next frame, in a fixed order —
// slant filter, partition (+history push), contour association, dash
// classification, polynomial fit, tracker push, normalization (after
// warm-up), distance measurement. Per-frame numeric failures substitute
// absent values and the loop keeps going; only configuration problems
// abort at construction.

use serde::Deserialize;
use tracing::{debug, info};

use crate::association::{associate_contours, classify_segments};
use crate::distance::DistanceEngine;
use crate::error::TrackerError;
use crate::perspective::{Calibration, PerspectiveTransform};
use crate::polyfit::PolynomialFitter;
use crate::report::FrameReport;
use crate::stripes::{lines_found, rm_slanted_lines, StripePartitioner};
use crate::tracker::StripeTracker;
use crate::types::{Config, LinearLine, Point2, PolyCurve};

/// One frame's worth of upstream detection output: straight lines from the
/// detection primitive and contour blobs from the thresholding stage, both
/// in rectified bird's-eye space.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameInput {
    pub lines: Vec<LinearLine>,
    pub contours: Vec<Vec<Point2>>,
}

pub struct LaneTrackingPipeline {
    partitioner: StripePartitioner,
    tracker: StripeTracker<PolyCurve>,
    fitter: PolynomialFitter,
    distance: DistanceEngine,
    line_search_width: f64,
    warmup_frames: u64,
    frame_index: u64,
}

impl LaneTrackingPipeline {
    pub fn new(config: &Config) -> Result<Self, TrackerError> {
        config.validate()?;

        let transform = PerspectiveTransform::from_bird_params(&config.bird)?;
        let calibration = Calibration::new(config.calibration.matrix);

        info!(
            stripes = config.tracker.stripe_count,
            history = config.tracker.history_depth,
            sense = config.tracker.sense,
            "lane tracking pipeline ready"
        );

        Ok(Self {
            partitioner: StripePartitioner::new(
                config.tracker.stripe_count,
                config.bird.output_width as f64,
                config.tracker.history_depth,
            )?,
            tracker: StripeTracker::new(
                config.tracker.history_depth,
                config.tracker.stripe_count,
                config.tracker.sense,
            ),
            fitter: PolynomialFitter::new(config.detection.quadratic_gate),
            distance: DistanceEngine::new(
                transform,
                calibration,
                config.bird.output_width,
                config.bird.output_height,
            ),
            line_search_width: config.detection.line_search_width,
            warmup_frames: config.tracker.warmup_frames,
            frame_index: 0,
        })
    }

    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    /// Run one frame through every stage and report the stabilized result.
    pub fn process_frame(&mut self, input: &FrameInput) -> FrameReport {
        self.frame_index += 1;

        let mut lines = input.lines.clone();
        rm_slanted_lines(&mut lines);

        let stripe_lines = self.partitioner.partition(&lines);
        let association =
            associate_contours(&stripe_lines, &input.contours, self.line_search_width);
        let styles = classify_segments(&association.segment_counts);

        self.tracker.push(self.fitter.fit_frame(&association.points));
        // Normalization needs settled history; the first frames after start
        // have none worth trusting.
        if self.frame_index > self.warmup_frames {
            self.tracker.normalize();
        }

        let curves = self.tracker.latest().clone();
        debug!(frame = self.frame_index, curves = ?curves, "stabilized curves");
        let distances = match self.distance.measure(&curves) {
            Ok(report) => Some(report),
            Err(err) => {
                debug!(frame = self.frame_index, error = %err, "no distance this frame");
                None
            }
        };

        FrameReport {
            frame_index: self.frame_index,
            lines_detected: lines_found(&curves),
            curves,
            styles,
            distances,
        }
    }
}
