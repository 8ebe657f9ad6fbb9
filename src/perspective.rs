// src/perspective.rs
//
// The projective transform pair behind the bird's-eye rectification, and
// the pixel-to-world calibration matrix. Only matrix construction and point
// mapping live here; warping images is the rectification stage's job.
//
// Matrix math is inline and stack-allocated; the 3x3s involved do not
// justify a linear-algebra dependency.

use crate::error::TrackerError;
use crate::types::{BirdConfig, Point2};

/// 3x3 matrix stored row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3(pub [f64; 9]);

impl Mat3 {
    pub fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[row * 3 + col]
    }

    /// Multiply by the homogeneous extension of `p` without dividing
    /// through: the affine application the calibration matrix uses.
    pub fn apply_affine(&self, p: Point2) -> Point2 {
        Point2::new(
            self.get(0, 0) * p.x + self.get(0, 1) * p.y + self.get(0, 2),
            self.get(1, 0) * p.x + self.get(1, 1) * p.y + self.get(1, 2),
        )
    }

    /// Full projective application with the homogeneous divide.
    pub fn project(&self, p: Point2) -> Point2 {
        let w = self.get(2, 0) * p.x + self.get(2, 1) * p.y + self.get(2, 2);
        if w.abs() < 1e-15 {
            return Point2::new(f64::NAN, f64::NAN);
        }
        let q = self.apply_affine(p);
        Point2::new(q.x / w, q.y / w)
    }
}

impl From<[[f64; 3]; 3]> for Mat3 {
    fn from(rows: [[f64; 3]; 3]) -> Self {
        Self([
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ])
    }
}

/// Homography mapping the four `src` points onto the four `dst` points, in
/// order. Solves the standard 8x8 correspondence system with h33 fixed at 1,
/// by Gaussian elimination with partial pivoting.
fn quad_to_quad(src: [Point2; 4], dst: [Point2; 4]) -> Result<Mat3, TrackerError> {
    let mut m = [[0.0f64; 9]; 8];
    for i in 0..4 {
        let (u, v) = (src[i].x, src[i].y);
        let (x, y) = (dst[i].x, dst[i].y);
        m[2 * i] = [u, v, 1.0, 0.0, 0.0, 0.0, -x * u, -x * v, x];
        m[2 * i + 1] = [0.0, 0.0, 0.0, u, v, 1.0, -y * u, -y * v, y];
    }

    for col in 0..8 {
        let pivot = (col..8)
            .max_by(|&p, &q| {
                m[p][col]
                    .abs()
                    .partial_cmp(&m[q][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if m[pivot][col].abs() < 1e-9 {
            return Err(TrackerError::Configuration(
                "degenerate rectification quad".into(),
            ));
        }
        m.swap(col, pivot);
        for row in 0..8 {
            if row == col {
                continue;
            }
            let factor = m[row][col] / m[col][col];
            for k in col..9 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let h: Vec<f64> = (0..8).map(|i| m[i][8] / m[i][i]).collect();
    Ok(Mat3([h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0]))
}

/// Forward/inverse projective transform pair between the camera image and
/// the rectified bird's-eye image.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveTransform {
    forward: Mat3,
    inverse: Mat3,
}

impl PerspectiveTransform {
    /// Build both directions from the calibrated corner parameters: the
    /// road trapezoid in the camera image maps onto the full output
    /// rectangle.
    pub fn from_bird_params(bird: &BirdConfig) -> Result<Self, TrackerError> {
        let c = &bird.corners;
        let trapezoid = [
            Point2::new(c[0], c[1]),
            Point2::new(c[2], c[3]),
            Point2::new(c[4], c[5]),
            Point2::new(c[6], c[7]),
        ];
        let w = bird.output_width as f64;
        let h = bird.output_height as f64;
        let rect = [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(0.0, h),
            Point2::new(w, h),
        ];
        Ok(Self {
            forward: quad_to_quad(trapezoid, rect)?,
            inverse: quad_to_quad(rect, trapezoid)?,
        })
    }

    pub fn identity() -> Self {
        Self {
            forward: Mat3::identity(),
            inverse: Mat3::identity(),
        }
    }

    /// Camera image point into rectified bird's-eye space.
    pub fn to_bird(&self, p: Point2) -> Point2 {
        self.forward.project(p)
    }

    /// Rectified bird's-eye point back into the camera image.
    pub fn to_camera(&self, p: Point2) -> Point2 {
        self.inverse.project(p)
    }
}

/// The fixed pixel-to-world calibration matrix, applied without a
/// homogeneous divide.
#[derive(Debug, Clone, Copy)]
pub struct Calibration(Mat3);

impl Calibration {
    pub fn new(matrix: [[f64; 3]; 3]) -> Self {
        Self(Mat3::from(matrix))
    }

    pub fn identity() -> Self {
        Self(Mat3::identity())
    }

    pub fn to_world(&self, p: Point2) -> Point2 {
        self.0.apply_affine(p)
    }
}
