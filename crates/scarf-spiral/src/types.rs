//! Shared types for the scarf stitching engine.

use serde::{Deserialize, Serialize};

/// A 2D point in curve coordinates (origin at the ellipse center).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// The coordinate origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Distance from the origin.
    #[must_use]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Component-wise linear interpolation: `(1 - t) * self + t * other`.
    ///
    /// Returns `self` exactly at `t == 0.0` and `other` exactly at
    /// `t == 1.0`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let s = 1.0 - t;
        Self::new(s.mul_add(self.x, t * other.x), s.mul_add(self.y, t * other.y))
    }
}

/// A point with height, as read back from `X,Y,Z` toolpath files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Height.
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point, height included.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx.mul_add(dx, dy.mul_add(dy, dz * dz)).sqrt()
    }

    /// The point dropped onto the `z = 0` plane.
    #[must_use]
    pub const fn planar(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A point type that path analysis can measure.
///
/// Step lengths use the type's own metric; bounds and radii use the
/// projection onto the XY plane.
pub trait PathPoint: Copy {
    /// Distance to the next point along a path.
    fn step_to(self, next: Self) -> f64;

    /// Projection onto the XY plane.
    fn planar(self) -> Point;
}

impl PathPoint for Point {
    fn step_to(self, next: Self) -> f64 {
        self.distance(next)
    }

    fn planar(self) -> Point {
        self
    }
}

impl PathPoint for Point3 {
    fn step_to(self, next: Self) -> f64 {
        self.distance(next)
    }

    fn planar(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// An ordered sequence of samples along one curve instance or one seam.
///
/// Ellipse curves are closed conceptually but stored open: the sample at
/// parameter `2π` is not repeated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curve(Vec<Point>);

impl Curve {
    /// Create a new curve from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the curve has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of samples in the curve.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the curve and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Returns a copy of the curve shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self(
            self.0
                .iter()
                .map(|p| Point::new(p.x + dx, p.y + dy))
                .collect(),
        )
    }

    /// Axis-aligned bounding box, or `None` for an empty curve.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(&self.0)
    }
}

/// Semi-axes `(a, b)` of one ellipse in the family.
///
/// `a` is measured along X and `b` along Y. Both are strictly positive
/// and finite. `a >= b` is conventional but not required; swapping them
/// simply rotates the ellipse by 90°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParameters {
    a: f64,
    b: f64,
}

impl CurveParameters {
    /// Create validated semi-axes.
    ///
    /// # Errors
    ///
    /// Returns [`SpiralError::InvalidParameter`] if either axis is
    /// non-positive or not finite.
    pub fn new(a: f64, b: f64) -> Result<Self, SpiralError> {
        let params = Self { a, b };
        params.validate()?;
        Ok(params)
    }

    /// Build parameters known to be valid at compile time.
    pub(crate) const fn from_valid(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Semi-axis along X.
    #[must_use]
    pub const fn a(self) -> f64 {
        self.a
    }

    /// Semi-axis along Y.
    #[must_use]
    pub const fn b(self) -> f64 {
        self.b
    }

    /// Larger of the two semi-axes.
    #[must_use]
    pub fn max_axis(self) -> f64 {
        self.a.max(self.b)
    }

    /// Re-check the positivity invariant.
    ///
    /// Values built through [`new`](Self::new) always pass; this exists
    /// for parameters that arrive through deserialization.
    ///
    /// # Errors
    ///
    /// Returns [`SpiralError::InvalidParameter`] naming the offending axis.
    pub fn validate(self) -> Result<(), SpiralError> {
        for (name, value) in [("a", self.a), ("b", self.b)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SpiralError::InvalidParameter(format!(
                    "semi-axis {name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Perimeter estimate (Ramanujan's second approximation).
    #[must_use]
    pub fn perimeter(self) -> f64 {
        crate::sample::ellipse_perimeter(self.a, self.b)
    }

    /// Both axes increased by `step`.
    ///
    /// # Errors
    ///
    /// Returns [`SpiralError::InvalidParameter`] if the result is not a
    /// valid ellipse.
    pub fn grown(self, step: f64) -> Result<Self, SpiralError> {
        Self::new(self.a + step, self.b + step)
    }

    /// Both axes decreased by `step`, or `None` once either axis would
    /// reach zero or below.
    #[must_use]
    pub fn shrunk(self, step: f64) -> Option<Self> {
        Self::new(self.a - step, self.b - step).ok()
    }

    /// Value of the implicit ellipse equation `x²/a² + y²/b²` at `point`.
    ///
    /// `< 1` inside, `== 1` on the curve, `> 1` outside.
    #[must_use]
    pub fn implicit_value(self, point: Point) -> f64 {
        let u = point.x / self.a;
        let v = point.y / self.b;
        u.mul_add(u, v * v)
    }
}

impl std::fmt::Display for CurveParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a={}, b={}", self.a, self.b)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest X.
    pub min_x: f64,
    /// Smallest Y.
    pub min_y: f64,
    /// Largest X.
    pub max_x: f64,
    /// Largest Y.
    pub max_y: f64,
}

impl Bounds {
    /// Bounding box of a point slice, or `None` if it is empty.
    #[must_use]
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points[1..].iter().fold(init, |b, p| Self {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// The box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Errors that can occur while sampling, stitching or generating.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum SpiralError {
    /// A parameter is out of range (non-positive axis, spacing, count or
    /// step, or an inconsistent generation policy).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A seam was requested between curves with different sample counts.
    #[error("cannot stitch curves of unequal length ({left} vs {right} samples)")]
    LengthMismatch {
        /// Sample count of the first curve.
        left: usize,
        /// Sample count of the second curve.
        right: usize,
    },

    /// The iteration cap was reached before the termination predicate
    /// held.
    #[error("no termination after {iterations} iterations (last valid curve {last})")]
    NonConvergent {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Parameters of the last curve that was accepted into the path.
        last: CurveParameters,
    },
}
