use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub detection: DetectionConfig,
    pub bird: BirdConfig,
    pub calibration: CalibrationConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Number of fixed-width bins partitioning the rectified image width.
    pub stripe_count: usize,
    /// Depth of the sliding history window, in frames.
    pub history_depth: usize,
    /// Flicker-suppression threshold: a state flip must persist this many
    /// frames before it is accepted, and gaps are filled for up to this many
    /// consecutive frames.
    pub sense: u32,
    /// Frames to process before the normalization pass starts running.
    pub warmup_frames: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Maximum perpendicular distance between a contour center and a stripe
    /// line for the contour to be associated with that line.
    pub line_search_width: f64,
    /// Quadratic-coefficient magnitude at which a polynomial fit is
    /// discarded. See `polyfit::QUADRATIC_GATE_DEFAULT`.
    pub quadratic_gate: f64,
}

/// Bird's-eye rectification parameters. The four corner points are the road
/// trapezoid in the camera image, in the order top-left, top-right,
/// bottom-left, bottom-right; they map onto the corners of an
/// `output_width` x `output_height` rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BirdConfig {
    pub corners: [f64; 8],
    pub output_height: u32,
    pub output_width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// 3x3 pixel-to-world calibration matrix, row major.
    pub matrix: [[f64; 3]; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// When set, per-frame reports are appended here as JSON lines.
    pub report_path: Option<String>,
}

/// A 2D point in image coordinates: `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Common capability of both line representations: they can be sampled at an
/// image row and asked where they cross the reference row.
pub trait Curve {
    /// Column coordinate where the curve crosses the given row, if defined.
    fn column_at(&self, row: f64) -> Option<f64>;

    /// Column at the reference row (row 0).
    fn reference_intercept(&self) -> Option<f64> {
        self.column_at(0.0)
    }
}

/// A straight line from the detection primitive, in linear form
/// `a*x + b*y + c = 0`. The detection stage fits in row/column swapped
/// space, so `x` is the image row and `y` is the image column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearLine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LinearLine {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Tangent of the line's slant, `-b/a`. `None` for `a == 0` (the line
    /// runs along the column axis and cannot be slanted).
    pub fn slant_tangent(&self) -> Option<f64> {
        if self.a == 0.0 {
            None
        } else {
            Some(-self.b / self.a)
        }
    }

    /// Perpendicular distance from a point (in the same swapped space) to
    /// the line.
    pub fn distance_to(&self, p: Point2) -> f64 {
        let norm = (self.a * self.a + self.b * self.b).sqrt();
        if norm == 0.0 {
            return f64::INFINITY;
        }
        (self.a * p.x + self.b * p.y + self.c).abs() / norm
    }
}

impl Curve for LinearLine {
    fn column_at(&self, row: f64) -> Option<f64> {
        if self.b == 0.0 {
            None
        } else {
            Some(-(self.a * row + self.c) / self.b)
        }
    }
}

/// A fitted lane curve in polynomial form: `col = a*row^2 + b*row + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolyCurve {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PolyCurve {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn eval(&self, row: f64) -> f64 {
        self.a * row * row + self.b * row + self.c
    }
}

impl Curve for PolyCurve {
    fn column_at(&self, row: f64) -> Option<f64> {
        Some(self.eval(row))
    }
}

/// One frame's worth of per-stripe slots. A `None` slot means the stripe had
/// no detection this frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StripeFrame<T> {
    slots: Vec<Option<T>>,
}

impl<T> StripeFrame<T> {
    pub fn empty(stripe_count: usize) -> Self {
        let mut slots = Vec::with_capacity(stripe_count);
        for _ in 0..stripe_count {
            slots.push(None);
        }
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, stripe: usize) -> Option<&T> {
        self.slots.get(stripe).and_then(Option::as_ref)
    }

    pub fn set(&mut self, stripe: usize, value: Option<T>) {
        self.slots[stripe] = value;
    }

    pub fn slot_mut(&mut self, stripe: usize) -> &mut Option<T> {
        &mut self.slots[stripe]
    }

    pub fn is_occupied(&self, stripe: usize) -> bool {
        self.get(stripe).is_some()
    }

    /// Occupancy flag per stripe, in stripe order.
    pub fn occupancy(&self) -> Vec<bool> {
        self.slots.iter().map(Option::is_some).collect()
    }

    pub fn any_occupied(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> {
        self.slots.iter().map(Option::as_ref)
    }
}

impl<T> From<Vec<Option<T>>> for StripeFrame<T> {
    fn from(slots: Vec<Option<T>>) -> Self {
        Self { slots }
    }
}

/// Solid vs. dashed paint classification for one stripe's marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dashed,
}

impl LineStyle {
    pub fn is_solid(&self) -> bool {
        matches!(self, Self::Solid)
    }
}
