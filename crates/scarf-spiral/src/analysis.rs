//! Distance analysis over point sequences.
//!
//! Used to check spacing after re-sampling or decimation, and to verify
//! that an outward spiral keeps widening until it terminates.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::path::SpiralPath;
use crate::types::{Bounds, PathPoint, Point};

/// Distance from each point to the next.
///
/// One entry per point; the last point has no successor and gets `0.0`.
/// Works for planar [`Point`]s and for [`Point3`](crate::Point3)s, whose
/// distances include height.
///
/// # Examples
///
/// ```
/// use scarf_spiral::Point;
/// use scarf_spiral::analysis::segment_lengths;
///
/// let lengths = segment_lengths(&[
///     Point::new(0.0, 0.0),
///     Point::new(3.0, 4.0),
///     Point::new(3.0, 5.0),
/// ]);
/// assert_eq!(lengths, vec![5.0, 1.0, 0.0]);
/// ```
#[must_use]
pub fn segment_lengths<P: PathPoint>(points: &[P]) -> Vec<f64> {
    let mut lengths: Vec<f64> = points.windows(2).map(|w| w[0].step_to(w[1])).collect();
    if !points.is_empty() {
        lengths.push(0.0);
    }
    lengths
}

/// Largest distance from the origin within each stitched segment.
#[must_use]
pub fn segment_max_radii(path: &SpiralPath) -> Vec<f64> {
    path.segments()
        .map(|segment| segment.iter().map(|p| p.norm()).fold(0.0, f64::max))
        .collect()
}

/// Summary statistics of a point sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStats {
    /// Number of points.
    pub point_count: usize,
    /// Sum of all consecutive distances.
    pub total_length: f64,
    /// Shortest consecutive distance (`0.0` with fewer than 2 points).
    pub min_step: f64,
    /// Longest consecutive distance (`0.0` with fewer than 2 points).
    pub max_step: f64,
    /// Mean consecutive distance (`0.0` with fewer than 2 points).
    pub mean_step: f64,
    /// Bounding box in the XY plane, `None` when empty.
    pub bounds: Option<Bounds>,
    /// Largest distance from the Z axis (`0.0` when empty).
    pub max_radius: f64,
}

impl PathStats {
    /// Compute statistics for `points`.
    ///
    /// Steps are measured with the point type's metric, so heights count
    /// for [`Point3`](crate::Point3) input.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_points<P: PathPoint>(points: &[P]) -> Self {
        let steps: Vec<f64> = points.windows(2).map(|w| w[0].step_to(w[1])).collect();
        let planar: Vec<Point> = points.iter().map(|p| p.planar()).collect();
        let total_length: f64 = steps.iter().sum();
        let (min_step, max_step, mean_step) = if steps.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                steps.iter().copied().fold(f64::INFINITY, f64::min),
                steps.iter().copied().fold(0.0, f64::max),
                total_length / steps.len() as f64,
            )
        };
        Self {
            point_count: points.len(),
            total_length,
            min_step,
            max_step,
            mean_step,
            bounds: Bounds::of(&planar),
            max_radius: planar.iter().map(|p| p.norm()).fold(0.0, f64::max),
        }
    }

    /// Human-readable multi-line report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = format!(
            "Points: {}\nTotal length: {:.3}\nStep: min={:.4} mean={:.4} max={:.4}\nMax radius: {:.3}",
            self.point_count,
            self.total_length,
            self.min_step,
            self.mean_step,
            self.max_step,
            self.max_radius,
        );
        if let Some(b) = self.bounds {
            let _ = write!(
                out,
                "\nBounds: x=[{:.3}, {:.3}] y=[{:.3}, {:.3}] ({:.3} x {:.3})",
                b.min_x,
                b.max_x,
                b.min_y,
                b.max_y,
                b.width(),
                b.height(),
            );
        }
        out
    }
}
