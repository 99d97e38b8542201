//! Seam stitching: join two curve instances with a scarf joint.
//!
//! A seam is a per-sample linear morph, not a geometric blend of
//! shapes. Sample `i` of the seam lies on the segment between sample `i`
//! of each input, at `t_i = i / (N - 1)`, so the seam starts exactly on
//! the first curve and ends exactly on the second.
//!
//! # Contract
//!
//! Both curves must come from the same [`SamplingKind`](crate::SamplingKind)
//! with the same sample count and phase origin, so that index `i` names
//! "the same side" of both ellipses. Equal length is checked; matching
//! phase is the caller's responsibility.

use crate::types::{Curve, Point, SpiralError};

/// Interpolation parameter of sample `i` in an `n`-sample seam.
///
/// `0.0` for the first sample, `1.0` for the last. A single-sample seam
/// stays on the first curve.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn seam_parameter(i: usize, n: usize) -> f64 {
    if n < 2 {
        0.0
    } else {
        i as f64 / (n - 1) as f64
    }
}

/// Stitch `from` into `to`: `seam[i] = (1 - t_i)·from[i] + t_i·to[i]`.
///
/// # Errors
///
/// Returns [`SpiralError::LengthMismatch`] if the curves have different
/// sample counts.
///
/// # Examples
///
/// ```
/// use scarf_spiral::{Curve, Point};
/// use scarf_spiral::seam::stitch;
///
/// let inner = Curve::new(vec![Point::new(1.0, 0.0), Point::new(0.0, 1.0), Point::new(-1.0, 0.0)]);
/// let outer = Curve::new(vec![Point::new(2.0, 0.0), Point::new(0.0, 2.0), Point::new(-2.0, 0.0)]);
/// let seam = stitch(&inner, &outer).unwrap();
/// assert_eq!(seam.points()[0], Point::new(1.0, 0.0));
/// assert_eq!(seam.points()[1], Point::new(0.0, 1.5));
/// assert_eq!(seam.points()[2], Point::new(-2.0, 0.0));
/// ```
pub fn stitch(from: &Curve, to: &Curve) -> Result<Curve, SpiralError> {
    if from.len() != to.len() {
        return Err(SpiralError::LengthMismatch {
            left: from.len(),
            right: to.len(),
        });
    }
    let n = from.len();
    Ok(Curve::new(
        from.points()
            .iter()
            .zip(to.points())
            .enumerate()
            .map(|(i, (p, q))| p.lerp(*q, seam_parameter(i, n)))
            .collect(),
    ))
}

/// Collapse `curve` into the origin: `seam[i] = (1 - t_i)·curve[i]`.
///
/// Equivalent to stitching against the origin repeated `N` times. The
/// last sample is exactly `(0, 0)`.
#[must_use]
pub fn stitch_to_origin(curve: &Curve) -> Curve {
    let n = curve.len();
    Curve::new(
        curve
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| p.lerp(Point::ORIGIN, seam_parameter(i, n)))
            .collect(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::sample::{CurveSampler, SamplingKind};
    use crate::types::CurveParameters;

    fn ellipse(a: f64, b: f64, n: usize) -> Curve {
        SamplingKind::UniformAngle
            .sample(CurveParameters::new(a, b).unwrap(), n)
            .unwrap()
    }

    #[test]
    fn seam_parameter_spans_unit_interval() {
        assert_relative_eq!(seam_parameter(0, 5), 0.0);
        assert_relative_eq!(seam_parameter(2, 5), 0.5);
        assert_relative_eq!(seam_parameter(4, 5), 1.0);
        assert_relative_eq!(seam_parameter(0, 1), 0.0);
    }

    #[test]
    fn stitching_curve_to_itself_is_identity() {
        let c = ellipse(5.0, 3.0, 64);
        let seam = stitch(&c, &c).unwrap();
        assert_eq!(seam.len(), c.len());
        for (s, p) in seam.points().iter().zip(c.points()) {
            assert_relative_eq!(s.x, p.x, epsilon = 1e-12);
            assert_relative_eq!(s.y, p.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn seam_endpoints_match_inputs_exactly() {
        let inner = ellipse(5.0, 3.0, 100);
        let outer = ellipse(6.0, 4.0, 100);
        let seam = stitch(&inner, &outer).unwrap();
        assert_eq!(seam.first(), inner.first());
        assert_eq!(seam.last(), outer.last());
    }

    #[test]
    fn seam_radius_grows_between_concentric_circles() {
        let inner = ellipse(1.0, 1.0, 50);
        let outer = ellipse(2.0, 2.0, 50);
        let seam = stitch(&inner, &outer).unwrap();
        let radii: Vec<f64> = seam.points().iter().map(|p| p.norm()).collect();
        for w in radii.windows(2) {
            assert!(w[1] > w[0]);
        }
        assert_relative_eq!(radii[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(radii[49], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(1.0, 1.0);
        let result = stitch(&Curve::new(vec![p1, p2]), &Curve::new(vec![p1]));
        assert_eq!(result, Err(SpiralError::LengthMismatch { left: 2, right: 1 }));
    }

    #[test]
    fn single_sample_seam_stays_on_first_curve() {
        let a = Curve::new(vec![Point::new(3.0, 4.0)]);
        let b = Curve::new(vec![Point::new(9.0, 9.0)]);
        assert_eq!(stitch(&a, &b).unwrap().points(), &[Point::new(3.0, 4.0)]);
    }

    #[test]
    fn empty_curves_stitch_to_empty_seam() {
        let seam = stitch(&Curve::default(), &Curve::default()).unwrap();
        assert!(seam.is_empty());
    }

    #[test]
    fn stitch_to_origin_ends_at_origin() {
        let c = ellipse(5.0, 10.0, 500);
        let collapse = stitch_to_origin(&c);
        assert_eq!(collapse.len(), 500);
        assert_eq!(collapse.first(), c.first());
        assert_eq!(collapse.last(), Some(&Point::ORIGIN));
    }

    #[test]
    fn stitch_to_origin_matches_explicit_origin_curve() {
        let c = ellipse(4.0, 2.0, 20);
        let origin = Curve::new(vec![Point::ORIGIN; 20]);
        assert_eq!(stitch_to_origin(&c), stitch(&c, &origin).unwrap());
    }
}
