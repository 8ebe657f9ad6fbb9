// src/association.rs
//
// Associates raw contour blobs with the per-stripe lines and labels each
// stripe's marking solid or dashed from its blob count. A broken line leaves
// several short paint blobs inside one search window, a solid line leaves
// one long blob.

use crate::types::{LineStyle, LinearLine, Point2, StripeFrame};

/// Per-stripe association result: the union of every associated blob's
/// points, and how many distinct blobs joined each stripe.
#[derive(Debug, Clone)]
pub struct Association {
    pub points: Vec<Vec<Point2>>,
    pub segment_counts: Vec<usize>,
}

fn bounding_box_center(contour: &[Point2]) -> Option<Point2> {
    let first = contour.first()?;
    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    for p in &contour[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    // Swapped to match the space the lines were fitted in: x from the box's
    // vertical extent, y from the horizontal one.
    Some(Point2::new(
        min_y + (max_y - min_y) / 2.0,
        min_x + (max_x - min_x) / 2.0,
    ))
}

/// Associate each contour with the first stripe line (in stripe order)
/// whose perpendicular distance to the contour's bounding-box center is
/// below `search_width`. Each contour joins at most one stripe.
pub fn associate_contours(
    frame: &StripeFrame<LinearLine>,
    contours: &[Vec<Point2>],
    search_width: f64,
) -> Association {
    let stripe_count = frame.len();
    let mut points: Vec<Vec<Point2>> = vec![Vec::new(); stripe_count];
    let mut segment_counts = vec![0usize; stripe_count];

    for contour in contours {
        let Some(center) = bounding_box_center(contour) else {
            continue;
        };
        for stripe in 0..stripe_count {
            let Some(line) = frame.get(stripe) else {
                continue;
            };
            if line.distance_to(center) < search_width {
                points[stripe].extend_from_slice(contour);
                segment_counts[stripe] += 1;
                break;
            }
        }
    }

    Association {
        points,
        segment_counts,
    }
}

/// Solid/dashed label per stripe from its associated-blob count. More than
/// one disjoint blob means the paint is broken; zero or one means solid.
/// Instantaneous, per-frame; the history window smooths only curves.
pub fn classify_segments(segment_counts: &[usize]) -> Vec<LineStyle> {
    segment_counts
        .iter()
        .map(|&count| {
            if count > 1 {
                LineStyle::Dashed
            } else {
                LineStyle::Solid
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_line(col: f64) -> LinearLine {
        LinearLine::new(0.0, 1.0, -col)
    }

    fn blob(col: f64, row_start: f64, row_end: f64) -> Vec<Point2> {
        vec![
            Point2::new(col, row_start),
            Point2::new(col + 2.0, (row_start + row_end) / 2.0),
            Point2::new(col, row_end),
        ]
    }

    fn two_line_frame() -> StripeFrame<LinearLine> {
        let mut frame = StripeFrame::empty(8);
        frame.set(2, Some(vertical_line(310.0)));
        frame.set(5, Some(vertical_line(890.0)));
        frame
    }

    #[test]
    fn test_blob_joins_nearest_stripe_only() {
        let frame = two_line_frame();
        let contours = vec![blob(312.0, 100.0, 200.0), blob(888.0, 300.0, 700.0)];
        let assoc = associate_contours(&frame, &contours, 40.0);

        assert_eq!(assoc.segment_counts[2], 1);
        assert_eq!(assoc.segment_counts[5], 1);
        assert_eq!(assoc.points[2].len(), 3);
        assert_eq!(assoc.points[5].len(), 3);
        // No other stripe received anything.
        for stripe in [0, 1, 3, 4, 6, 7] {
            assert_eq!(assoc.segment_counts[stripe], 0);
            assert!(assoc.points[stripe].is_empty());
        }
    }

    #[test]
    fn test_far_blob_is_ignored() {
        let frame = two_line_frame();
        let assoc = associate_contours(&frame, &[blob(600.0, 0.0, 50.0)], 40.0);
        assert!(assoc.segment_counts.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_multiple_blobs_accumulate() {
        let frame = two_line_frame();
        let contours = vec![
            blob(310.0, 0.0, 100.0),
            blob(308.0, 250.0, 350.0),
            blob(313.0, 500.0, 600.0),
        ];
        let assoc = associate_contours(&frame, &contours, 40.0);
        assert_eq!(assoc.segment_counts[2], 3);
        assert_eq!(assoc.points[2].len(), 9);
    }

    #[test]
    fn test_classify_segments() {
        let styles = classify_segments(&[0, 1, 2, 5]);
        assert_eq!(
            styles,
            vec![
                LineStyle::Solid,
                LineStyle::Solid,
                LineStyle::Dashed,
                LineStyle::Dashed,
            ]
        );
        assert!(styles[0].is_solid());
        assert!(!styles[2].is_solid());
    }
}
