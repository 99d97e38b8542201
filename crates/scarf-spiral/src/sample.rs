//! Curve sampling: discretize one ellipse into an ordered point sequence.
//!
//! Every sampling policy starts at `(a, 0)` and walks counter-clockwise,
//! and emits exactly the requested number of points. Seam stitching
//! pairs samples by index, so two curves stitched together must share
//! both policy and count. This module defines the [`CurveSampler`]
//! trait for pluggable policies and the [`SamplingKind`] enum for
//! runtime selection.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::types::{Curve, CurveParameters, Point, SpiralError};

/// Lower bound on the sample count derived from a spacing request.
pub const MIN_DERIVED_SAMPLES: usize = 10;

/// Smallest explicit sample count accepted by a sampler.
pub const MIN_SAMPLES: usize = 3;

/// Largest sample count per curve, explicit or derived.
pub const MAX_SAMPLES: usize = 1_000_000;

/// Candidate points walked per emitted point in arc-length mode.
const ARC_LENGTH_OVERSAMPLE: usize = 16;

/// Perimeter of an ellipse, Ramanujan's second approximation:
/// `π·(3(a+b) − √((3a+b)(a+3b)))`.
///
/// Exact for circles; relative error stays below 1e-4 even for very
/// elongated ellipses.
///
/// # Examples
///
/// ```
/// use scarf_spiral::sample::ellipse_perimeter;
///
/// let circle = ellipse_perimeter(2.0, 2.0);
/// assert!((circle - 4.0 * std::f64::consts::PI).abs() < 1e-12);
/// ```
#[must_use]
pub fn ellipse_perimeter(a: f64, b: f64) -> f64 {
    let h = (3.0f64.mul_add(a, b) * 3.0f64.mul_add(b, a)).sqrt();
    PI * 3.0f64.mul_add(a + b, -h)
}

/// Point spacing suited to the size of an ellipse.
///
/// `max(a, b) / 300`, clamped to `[0.1, 1.0]`: small ellipses get
/// ~0.1-unit spacing, large ones ~1 unit.
#[must_use]
pub fn auto_spacing(params: CurveParameters) -> f64 {
    (params.max_axis() / 300.0).clamp(0.1, 1.0)
}

/// Point on the ellipse at parameter angle `theta`.
#[must_use]
pub fn point_at(params: CurveParameters, theta: f64) -> Point {
    Point::new(params.a() * theta.cos(), params.b() * theta.sin())
}

/// How many samples each curve of a run gets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Resolution {
    /// Derive the spacing from the curve size with [`auto_spacing`].
    #[default]
    Auto,

    /// Use exactly this many samples.
    Count(usize),

    /// Aim for this distance between consecutive samples.
    Spacing(f64),
}

impl Resolution {
    /// Resolve to a concrete sample count for an ellipse of size `params`.
    ///
    /// Spacing-based variants yield `max(10, round(perimeter / spacing))`.
    ///
    /// # Errors
    ///
    /// Returns [`SpiralError::InvalidParameter`] for a non-positive /
    /// non-finite spacing, or when the count falls outside
    /// [`MIN_SAMPLES`]`..=`[`MAX_SAMPLES`].
    pub fn sample_count(self, params: CurveParameters) -> Result<usize, SpiralError> {
        let count = match self {
            Self::Auto => count_for_spacing(params, auto_spacing(params)),
            Self::Count(n) => n,
            Self::Spacing(s) if !s.is_finite() || s <= 0.0 => {
                return Err(SpiralError::InvalidParameter(format!(
                    "spacing must be positive, got {s}"
                )));
            }
            Self::Spacing(s) => count_for_spacing(params, s),
        };
        check_count(count)
    }
}

fn check_count(count: usize) -> Result<usize, SpiralError> {
    if count < MIN_SAMPLES {
        Err(SpiralError::InvalidParameter(format!(
            "sample count must be at least {MIN_SAMPLES}, got {count}"
        )))
    } else if count > MAX_SAMPLES {
        Err(SpiralError::InvalidParameter(format!(
            "sample count must be at most {MAX_SAMPLES}, got {count}"
        )))
    } else {
        Ok(count)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn count_for_spacing(params: CurveParameters, spacing: f64) -> usize {
    let n = (params.perimeter() / spacing).round();
    if n >= usize::MAX as f64 {
        usize::MAX
    } else {
        (n as usize).max(MIN_DERIVED_SAMPLES)
    }
}

/// Selects which sampling policy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SamplingKind {
    /// Equal steps of the parameter angle: `θ_i = 2π·i/N`.
    ///
    /// Cheapest. Points bunch up near the ends of the major axis on
    /// elongated ellipses.
    #[default]
    UniformAngle,

    /// Equal Euclidean distance between consecutive samples.
    ///
    /// Walks dense equal-angle candidates, accumulating chord length,
    /// and emits a point each time the accumulated distance reaches
    /// `perimeter / N`. Gives visually even density regardless of local
    /// curvature.
    ArcLength,
}

/// Trait for curve sampling policies.
///
/// Implementations must return exactly `count` points, start at
/// `(a, 0)` and run counter-clockwise without repeating the start.
pub trait CurveSampler {
    /// Sample one ellipse.
    ///
    /// # Errors
    ///
    /// Returns [`SpiralError::InvalidParameter`] if `count` is outside
    /// [`MIN_SAMPLES`]`..=`[`MAX_SAMPLES`] or `params` fails validation.
    fn sample(&self, params: CurveParameters, count: usize) -> Result<Curve, SpiralError>;
}

impl CurveSampler for SamplingKind {
    fn sample(&self, params: CurveParameters, count: usize) -> Result<Curve, SpiralError> {
        params.validate()?;
        let count = check_count(count)?;
        Ok(match *self {
            Self::UniformAngle => sample_uniform_angle(params, count),
            Self::ArcLength => sample_arc_length(params, count),
        })
    }
}

/// Sample an ellipse from raw semi-axes.
///
/// Convenience wrapper validating `a` and `b`, resolving `resolution`
/// against the ellipse itself and sampling with `kind`.
///
/// # Errors
///
/// Returns [`SpiralError::InvalidParameter`] if `a <= 0`, `b <= 0` or
/// the resolution is invalid.
///
/// # Examples
///
/// ```
/// use scarf_spiral::sample::{Resolution, SamplingKind, sample_ellipse};
///
/// let curve = sample_ellipse(5.0, 10.0, SamplingKind::UniformAngle, Resolution::Count(8)).unwrap();
/// assert_eq!(curve.len(), 8);
/// assert!(sample_ellipse(-1.0, 5.0, SamplingKind::UniformAngle, Resolution::Auto).is_err());
/// ```
pub fn sample_ellipse(
    a: f64,
    b: f64,
    kind: SamplingKind,
    resolution: Resolution,
) -> Result<Curve, SpiralError> {
    let params = CurveParameters::new(a, b)?;
    let count = resolution.sample_count(params)?;
    kind.sample(params, count)
}

#[allow(clippy::cast_precision_loss)]
fn sample_uniform_angle(params: CurveParameters, count: usize) -> Curve {
    let n = count as f64;
    Curve::new(
        (0..count)
            .map(|i| point_at(params, TAU * i as f64 / n))
            .collect(),
    )
}

#[allow(clippy::cast_precision_loss)]
fn sample_arc_length(params: CurveParameters, count: usize) -> Curve {
    let dense = count.saturating_mul(ARC_LENGTH_OVERSAMPLE);
    let angle = |j: usize| TAU * j as f64 / dense as f64;

    // Closed candidate walk: the final candidate is the start again.
    let perimeter: f64 = (0..dense)
        .map(|j| point_at(params, angle(j)).distance(point_at(params, angle(j + 1))))
        .sum();
    let spacing = perimeter / count as f64;

    let mut points = Vec::with_capacity(count);
    points.push(point_at(params, 0.0));
    let mut accumulated = 0.0;

    for j in 0..dense {
        if points.len() == count {
            break;
        }
        let (theta_end, to) = (angle(j + 1), point_at(params, angle(j + 1)));
        let mut theta_from = angle(j);
        let mut remaining = point_at(params, theta_from).distance(to);

        while points.len() < count && accumulated + remaining >= spacing {
            let t = (spacing - accumulated) / remaining;
            theta_from += t * (theta_end - theta_from);
            let emitted = point_at(params, theta_from);
            points.push(emitted);
            remaining = emitted.distance(to);
            accumulated = 0.0;
        }
        accumulated += remaining;
    }

    Curve::new(points)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn params(a: f64, b: f64) -> CurveParameters {
        CurveParameters::new(a, b).unwrap()
    }

    fn assert_on_ellipse(curve: &Curve, p: CurveParameters, tolerance: f64) {
        for (i, pt) in curve.points().iter().enumerate() {
            let v = p.implicit_value(*pt);
            assert!(
                (v - 1.0).abs() < tolerance,
                "sample {i} ({}, {}) off the ellipse: x²/a² + y²/b² = {v}",
                pt.x,
                pt.y,
            );
        }
    }

    // --- Perimeter / spacing ---

    #[test]
    fn perimeter_of_circle_is_exact() {
        assert_relative_eq!(ellipse_perimeter(10.0, 10.0), TAU * 10.0, epsilon = 1e-9);
    }

    #[test]
    fn perimeter_is_symmetric_in_axes() {
        assert_relative_eq!(ellipse_perimeter(5.0, 10.0), ellipse_perimeter(10.0, 5.0));
    }

    #[test]
    fn perimeter_of_known_ellipse() {
        // a=10, b=5: reference value 48.4422...
        assert_relative_eq!(ellipse_perimeter(10.0, 5.0), 48.442_2, epsilon = 1e-3);
    }

    #[test]
    fn auto_spacing_is_clamped() {
        assert_relative_eq!(auto_spacing(params(3.0, 1.0)), 0.1);
        assert_relative_eq!(auto_spacing(params(150.0, 60.0)), 0.5);
        assert_relative_eq!(auto_spacing(params(1000.0, 2.0)), 1.0);
    }

    // --- Resolution ---

    #[test]
    fn explicit_count_is_used_verbatim() {
        assert_eq!(Resolution::Count(500).sample_count(params(1.0, 1.0)).unwrap(), 500);
    }

    #[test]
    fn spacing_count_has_floor_of_ten() {
        // Perimeter ~6.28 with spacing 5 → round(1.26) = 1 → floored to 10.
        assert_eq!(
            Resolution::Spacing(5.0).sample_count(params(1.0, 1.0)).unwrap(),
            MIN_DERIVED_SAMPLES
        );
    }

    #[test]
    fn spacing_count_rounds_perimeter_ratio() {
        // Circle r=10: perimeter 62.83 / 0.5 = 125.66 → 126.
        assert_eq!(
            Resolution::Spacing(0.5).sample_count(params(10.0, 10.0)).unwrap(),
            126
        );
    }

    #[test]
    fn auto_resolution_uses_auto_spacing() {
        // r=30 → spacing 0.1 → 1884.96 → 1885.
        assert_eq!(
            Resolution::Auto.sample_count(params(30.0, 30.0)).unwrap(),
            1885
        );
    }

    #[test]
    fn invalid_resolutions_are_rejected() {
        let p = params(1.0, 1.0);
        for r in [
            Resolution::Count(2),
            Resolution::Spacing(0.0),
            Resolution::Spacing(-1.0),
            Resolution::Spacing(f64::INFINITY),
            Resolution::Spacing(1e-300),
            Resolution::Count(MAX_SAMPLES + 1),
            Resolution::Count(usize::MAX),
        ] {
            assert!(
                matches!(r.sample_count(p), Err(SpiralError::InvalidParameter(_))),
                "{r:?} should be rejected"
            );
        }
    }

    // --- Uniform angle ---

    #[test]
    fn uniform_angle_points_lie_on_ellipse() {
        let p = params(5.0, 10.0);
        let curve = SamplingKind::UniformAngle.sample(p, 200).unwrap();
        assert_eq!(curve.len(), 200);
        assert_on_ellipse(&curve, p, 1e-9);
    }

    #[test]
    fn uniform_angle_starts_at_major_end_and_does_not_repeat() {
        let p = params(4.0, 2.0);
        let curve = SamplingKind::UniformAngle.sample(p, 4).unwrap();
        let pts = curve.points();
        assert_relative_eq!(pts[0].x, 4.0);
        assert_relative_eq!(pts[0].y, 0.0);
        assert_relative_eq!(pts[1].x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(pts[1].y, 2.0);
        assert_relative_eq!(pts[2].x, -4.0);
        assert_relative_eq!(pts[3].y, -2.0);
    }

    #[test]
    fn sampler_rejects_out_of_range_counts() {
        for count in [2, MAX_SAMPLES + 1, usize::MAX] {
            for kind in [SamplingKind::UniformAngle, SamplingKind::ArcLength] {
                let result = kind.sample(params(1.0, 1.0), count);
                assert!(
                    matches!(result, Err(SpiralError::InvalidParameter(_))),
                    "{kind:?} with {count} samples"
                );
            }
        }
    }

    #[test]
    fn largest_count_is_accepted() {
        assert_eq!(
            Resolution::Count(MAX_SAMPLES).sample_count(params(1.0, 1.0)).unwrap(),
            MAX_SAMPLES
        );
    }

    // --- Arc length ---

    #[test]
    fn arc_length_emits_exact_count_on_ellipse() {
        let p = params(60.0, 2.0);
        for count in [3, 10, 97, 400] {
            let curve = SamplingKind::ArcLength.sample(p, count).unwrap();
            assert_eq!(curve.len(), count, "count {count}");
            assert_on_ellipse(&curve, p, 1e-9);
        }
    }

    #[test]
    fn arc_length_spacing_is_even_on_elongated_ellipse() {
        let p = params(60.0, 20.0);
        let curve = SamplingKind::ArcLength.sample(p, 300).unwrap();
        let pts = curve.points();
        let steps: Vec<f64> = pts.windows(2).map(|w| w[0].distance(w[1])).collect();
        let mean = steps.iter().sum::<f64>() / 299.0;
        for (i, s) in steps.iter().enumerate() {
            assert!(
                (s - mean).abs() / mean < 0.02,
                "step {i} is {s}, mean {mean}"
            );
        }
    }

    #[test]
    fn arc_length_is_more_even_than_uniform_angle() {
        let p = params(60.0, 20.0);
        let spread = |curve: &Curve| {
            let steps: Vec<f64> = curve
                .points()
                .windows(2)
                .map(|w| w[0].distance(w[1]))
                .collect();
            let max = steps.iter().copied().fold(f64::MIN, f64::max);
            let min = steps.iter().copied().fold(f64::MAX, f64::min);
            max / min
        };
        let angle = SamplingKind::UniformAngle.sample(p, 300).unwrap();
        let arc = SamplingKind::ArcLength.sample(p, 300).unwrap();
        assert!(spread(&arc) < spread(&angle));
    }

    #[test]
    fn both_policies_share_phase_origin() {
        let p = params(7.0, 3.0);
        let angle = SamplingKind::UniformAngle.sample(p, 50).unwrap();
        let arc = SamplingKind::ArcLength.sample(p, 50).unwrap();
        assert_eq!(angle.first(), arc.first());
        // Both run counter-clockwise: second sample in the upper half.
        assert!(angle.points()[1].y > 0.0);
        assert!(arc.points()[1].y > 0.0);
    }

    // --- Raw-axis convenience ---

    #[test]
    fn sample_ellipse_rejects_negative_axis() {
        let result = sample_ellipse(-1.0, 5.0, SamplingKind::UniformAngle, Resolution::Auto);
        assert!(matches!(result, Err(SpiralError::InvalidParameter(_))));
    }

    #[test]
    fn sample_ellipse_auto_resolution_is_non_empty() {
        let curve = sample_ellipse(5.0, 10.0, SamplingKind::ArcLength, Resolution::Auto).unwrap();
        assert!(!curve.is_empty());
        assert_on_ellipse(&curve, params(5.0, 10.0), 1e-9);
    }
}
