// src/report.rs
//
// Per-frame numeric outputs handed to the (external) rendering and
// telemetry layer, plus the one-line ASCII road map used in logs.

use serde::Serialize;

use crate::distance::DistanceReport;
use crate::types::{LineStyle, PolyCurve, StripeFrame};

#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Stabilized lane curves, one slot per stripe.
    pub curves: StripeFrame<PolyCurve>,
    /// Solid/dashed label per stripe for the current frame.
    pub styles: Vec<LineStyle>,
    /// Lateral distances; absent when a side had no lane this frame.
    pub distances: Option<DistanceReport>,
    /// Health signal: whether any stripe carries a curve.
    pub lines_detected: bool,
}

/// One glyph per stripe: `|` solid, `:` dashed, blank when absent.
pub fn road_map(curves: &StripeFrame<PolyCurve>, styles: &[LineStyle]) -> String {
    let mut map = String::from("..");
    for stripe in 0..curves.len() {
        if curves.is_occupied(stripe) {
            match styles.get(stripe) {
                Some(LineStyle::Dashed) => map.push_str(" : ."),
                _ => map.push_str(" | ."),
            }
        } else {
            map.push_str("   .");
        }
    }
    map.push_str("..");
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_map_glyphs() {
        let mut curves: StripeFrame<PolyCurve> = StripeFrame::empty(3);
        curves.set(0, Some(PolyCurve::new(0.0, 0.0, 100.0)));
        curves.set(2, Some(PolyCurve::new(0.0, 0.0, 500.0)));
        let styles = vec![LineStyle::Solid, LineStyle::Solid, LineStyle::Dashed];

        assert_eq!(road_map(&curves, &styles), ".. | .   . : ...");
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = FrameReport {
            frame_index: 7,
            curves: StripeFrame::empty(2),
            styles: vec![LineStyle::Solid, LineStyle::Solid],
            distances: None,
            lines_detected: false,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"frame_index\":7"));
    }
}
