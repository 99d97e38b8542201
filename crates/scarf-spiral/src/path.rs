//! The stitched spiral path and the append-only builder that produces it.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::types::{Bounds, Curve, CurveParameters, Point};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The next grown curve reached the bounding ellipse.
    BoundaryIntersection,
    /// The next shrunk curve would have had a non-positive semi-axis.
    AxisDegenerate,
}

/// Bookkeeping for one generator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Loop iterations performed, including the terminal one.
    pub iterations: usize,
    /// Curves sampled and accepted into the path, seed included.
    pub curves: usize,
    /// Segments in the exported path.
    pub segments: usize,
    /// Points in the exported path.
    pub points: usize,
    /// Samples per curve for this run.
    pub sample_count: usize,
    /// Parameters of the last accepted curve.
    pub final_parameters: CurveParameters,
    /// What stopped the run.
    pub termination: TerminationReason,
}

/// Append-only accumulator for a path under construction.
///
/// Owned exclusively by one generator run and frozen into a
/// [`SpiralPath`] by [`finish`](Self::finish).
#[derive(Debug, Default)]
pub(crate) struct PathBuilder {
    points: Vec<Point>,
    segments: Vec<Range<usize>>,
}

impl PathBuilder {
    pub(crate) fn with_capacity(points: usize) -> Self {
        Self {
            points: Vec::with_capacity(points),
            segments: Vec::new(),
        }
    }

    /// Append one curve as a new segment.
    pub(crate) fn push_segment(&mut self, curve: Curve) {
        let start = self.points.len();
        self.points.extend(curve.into_points());
        self.segments.push(start..self.points.len());
    }

    pub(crate) const fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub(crate) const fn point_count(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn finish(self, seed: Curve, summary: RunSummary) -> SpiralPath {
        SpiralPath {
            points: self.points,
            segments: self.segments,
            seed,
            summary,
        }
    }
}

/// A fully stitched, open spiral path.
///
/// The exported points run from the seed end of the family to the
/// terminal end. The seed curve is always kept for reference; it is
/// part of [`points`](Self::points) only when the run was configured to
/// export it. The path is immutable once produced: renderers read it
/// through slices or take a copy with [`to_points`](Self::to_points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiralPath {
    points: Vec<Point>,
    segments: Vec<Range<usize>>,
    seed: Curve,
    summary: RunSummary,
}

impl SpiralPath {
    /// All exported points in path order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Owned copy of the exported points.
    #[must_use]
    pub fn to_points(&self) -> Vec<Point> {
        self.points.clone()
    }

    /// Number of exported points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no points were exported.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The exported points split back into their stitched segments.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &[Point]> + '_ {
        self.segments.iter().map(move |r| &self.points[r.clone()])
    }

    /// The seed curve, exported or not.
    #[must_use]
    pub const fn seed(&self) -> &Curve {
        &self.seed
    }

    /// Run bookkeeping.
    #[must_use]
    pub const fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Bounding box of the exported points.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(&self.points)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            iterations: 2,
            curves: 2,
            segments: 2,
            points: 3,
            sample_count: 2,
            final_parameters: CurveParameters::new(1.0, 1.0).unwrap(),
            termination: TerminationReason::AxisDegenerate,
        }
    }

    #[test]
    fn builder_records_segment_boundaries() {
        let mut builder = PathBuilder::with_capacity(3);
        builder.push_segment(Curve::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]));
        builder.push_segment(Curve::new(vec![Point::new(2.0, 0.0)]));
        assert_eq!(builder.segment_count(), 2);

        let path = builder.finish(Curve::default(), summary());
        assert_eq!(path.len(), 3);
        let segments: Vec<&[Point]> = path.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1], &[Point::new(2.0, 0.0)]);
    }

    #[test]
    fn to_points_is_an_independent_copy() {
        let mut builder = PathBuilder::default();
        builder.push_segment(Curve::new(vec![Point::new(1.0, 2.0)]));
        let path = builder.finish(Curve::default(), summary());

        let mut copy = path.to_points();
        copy[0] = Point::new(9.0, 9.0);
        assert_eq!(path.points(), &[Point::new(1.0, 2.0)]);
    }

    #[test]
    fn empty_path_has_no_bounds() {
        let path = PathBuilder::default().finish(Curve::default(), summary());
        assert!(path.is_empty());
        assert!(path.bounds().is_none());
        assert_eq!(path.segments().len(), 0);
    }
}
