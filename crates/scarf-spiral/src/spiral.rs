//! Spiral generation: grow or shrink an ellipse family and stitch it into
//! one continuous path.
//!
//! Each iteration advances the semi-axes by a fixed step, samples the new
//! curve, tests the termination predicate, and only then stitches. Testing
//! before stitching means the curve that trips the predicate is never part
//! of the output, so an outward spiral never leaves its bounding ellipse.
//!
//! Two policies are supported, selected by [`SpiralConfig`]:
//!
//! - **Outward growth** ([`Direction::Grow`] +
//!   [`Termination::BoundaryIntersection`]): stops when any sample of the
//!   next curve satisfies `x²/A² + y²/B² >= 1` for the bounding ellipse
//!   `(A, B)`. The path closes with a final lap on the outermost accepted
//!   curve.
//! - **Inward shrink** ([`Direction::Shrink`] +
//!   [`Termination::AxisDegenerate`]): stops when the next curve would
//!   have a non-positive semi-axis. The path closes with a seam that
//!   collapses the last curve into the origin.

use serde::{Deserialize, Serialize};

use crate::path::{PathBuilder, RunSummary, SpiralPath, TerminationReason};
use crate::sample::{CurveSampler, Resolution, SamplingKind};
use crate::seam::{stitch, stitch_to_origin};
use crate::types::{Curve, CurveParameters, SpiralError};

/// Extra iterations allowed on top of the derived estimate.
const ITERATION_MARGIN: usize = 2;

/// Upper bound on the points reserved before a run starts; the path
/// grows past it on demand.
const PREALLOCATED_POINTS: usize = 1 << 20;

/// Which way the family's semi-axes move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Both semi-axes increase by `step` each iteration.
    #[default]
    Grow,
    /// Both semi-axes decrease by `step` each iteration.
    Shrink,
}

/// What ends a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Termination {
    /// Stop once a grown curve reaches the bounding ellipse `bound`.
    BoundaryIntersection {
        /// Semi-axes of the bounding ellipse.
        bound: CurveParameters,
    },
    /// Stop once a shrunk curve would have a non-positive semi-axis.
    AxisDegenerate,
}

/// Configuration for one spiral run.
///
/// Deserialized configurations are not validated until
/// [`validate`](Self::validate) (called by [`generate`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralConfig {
    /// Semi-axes of the first curve.
    pub seed: CurveParameters,

    /// Change applied to both semi-axes per iteration. Must be positive;
    /// [`direction`](Self::direction) decides the sign.
    pub step: f64,

    /// Growth or shrink.
    pub direction: Direction,

    /// Termination predicate. Must pair with `direction`:
    /// growth with boundary intersection, shrink with axis degeneration.
    pub termination: Termination,

    /// Sampling policy shared by every curve of the run.
    pub sampling: SamplingKind,

    /// Sample count policy. Resolved once per run against the largest
    /// curve: the bounding ellipse when growing, the seed when shrinking.
    pub resolution: Resolution,

    /// Whether the seed curve itself is part of the exported points.
    pub export_seed: bool,

    /// Iteration cap. Derived from the step and the distance to travel
    /// when `None`.
    pub max_iterations: Option<usize>,
}

impl SpiralConfig {
    /// Default seed semi-axes `(60, 2)`.
    pub const DEFAULT_SEED: CurveParameters = CurveParameters::from_valid(60.0, 2.0);

    /// Default step between consecutive curves.
    pub const DEFAULT_STEP: f64 = 5.0;

    /// Default bound as a multiple of the seed axes.
    pub const DEFAULT_BOUND_SCALE: f64 = 21.0;

    /// Outward growth from `seed` until the bounding ellipse `bound`.
    #[must_use]
    pub fn outward(seed: CurveParameters, step: f64, bound: CurveParameters) -> Self {
        Self {
            seed,
            step,
            direction: Direction::Grow,
            termination: Termination::BoundaryIntersection { bound },
            ..Self::default()
        }
    }

    /// Inward shrink from `seed` until an axis degenerates.
    #[must_use]
    pub fn inward(seed: CurveParameters, step: f64) -> Self {
        Self {
            seed,
            step,
            direction: Direction::Shrink,
            termination: Termination::AxisDegenerate,
            ..Self::default()
        }
    }

    /// Check every parameter and the direction/termination pairing.
    ///
    /// # Errors
    ///
    /// Returns [`SpiralError::InvalidParameter`] describing the first
    /// problem found.
    pub fn validate(&self) -> Result<(), SpiralError> {
        self.seed.validate()?;
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(SpiralError::InvalidParameter(format!(
                "step must be positive and finite, got {}",
                self.step
            )));
        }
        match (self.direction, self.termination) {
            (Direction::Grow, Termination::BoundaryIntersection { bound }) => bound.validate(),
            (Direction::Shrink, Termination::AxisDegenerate) => Ok(()),
            (direction, termination) => Err(SpiralError::InvalidParameter(format!(
                "{direction:?} cannot terminate on {termination:?}"
            ))),
        }
    }

    /// The iteration cap in effect: the configured one, or an estimate of
    /// the iterations needed plus a small margin.
    #[must_use]
    pub fn effective_max_iterations(&self) -> usize {
        if let Some(max) = self.max_iterations {
            return max;
        }
        let travel = match self.termination {
            Termination::BoundaryIntersection { bound } => {
                (bound.a() - self.seed.a()).max(bound.b() - self.seed.b())
            }
            Termination::AxisDegenerate => self.seed.a().min(self.seed.b()),
        };
        ceil_to_usize(travel / self.step).saturating_add(ITERATION_MARGIN)
    }

    /// Parameters of the largest curve the run can produce.
    fn largest_curve(&self) -> CurveParameters {
        match self.termination {
            Termination::BoundaryIntersection { bound } => bound,
            Termination::AxisDegenerate => self.seed,
        }
    }
}

impl Default for SpiralConfig {
    fn default() -> Self {
        let seed = Self::DEFAULT_SEED;
        Self {
            seed,
            step: Self::DEFAULT_STEP,
            direction: Direction::Grow,
            termination: Termination::BoundaryIntersection {
                bound: CurveParameters::from_valid(
                    seed.a() * Self::DEFAULT_BOUND_SCALE,
                    seed.b() * Self::DEFAULT_BOUND_SCALE,
                ),
            },
            sampling: SamplingKind::default(),
            resolution: Resolution::default(),
            export_seed: false,
            max_iterations: None,
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn ceil_to_usize(value: f64) -> usize {
    let value = value.ceil();
    if value <= 0.0 {
        0
    } else if value >= usize::MAX as f64 {
        usize::MAX
    } else {
        value as usize
    }
}

/// Generator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// Adding progressively larger curves.
    Growing,
    /// Adding progressively smaller curves.
    Shrinking,
    /// The predicate held; the closing seam is pending.
    Terminating,
    /// The path is complete.
    Done,
}

/// Step-by-step spiral generator.
///
/// Owns the trailing `previous` curve and the path accumulator for one
/// run. Most callers want [`generate`]; this type exists for callers
/// that need to observe the run as it progresses.
#[derive(Debug)]
pub struct SpiralGenerator {
    config: SpiralConfig,
    sample_count: usize,
    max_iterations: usize,
    state: GenerationState,
    params: CurveParameters,
    previous: Curve,
    seed: Curve,
    iterations: usize,
    curves: usize,
    closing: Option<Curve>,
    termination: Option<TerminationReason>,
    builder: PathBuilder,
}

impl SpiralGenerator {
    /// Validate `config`, sample the seed curve and prepare the run.
    ///
    /// # Errors
    ///
    /// Returns [`SpiralError::InvalidParameter`] if the configuration is
    /// invalid, the resolved sample count is out of range, the sample
    /// count times the iteration cap overflows `usize` or, when growing,
    /// the seed already reaches the boundary.
    pub fn new(config: &SpiralConfig) -> Result<Self, SpiralError> {
        config.validate()?;
        let sample_count = config.resolution.sample_count(config.largest_curve())?;
        let seed = config.sampling.sample(config.seed, sample_count)?;

        if let Termination::BoundaryIntersection { bound } = config.termination
            && reaches_boundary(&seed, bound)
        {
            return Err(SpiralError::InvalidParameter(format!(
                "seed curve ({}) already reaches the boundary ({bound})",
                config.seed
            )));
        }

        let max_iterations = config.effective_max_iterations();
        let point_budget = sample_count
            .checked_mul(max_iterations.saturating_add(1))
            .ok_or_else(|| {
                SpiralError::InvalidParameter(format!(
                    "{sample_count} samples over up to {max_iterations} iterations \
                     exceeds the addressable point count"
                ))
            })?;
        let mut builder = PathBuilder::with_capacity(point_budget.min(PREALLOCATED_POINTS));
        if config.export_seed {
            builder.push_segment(seed.clone());
        }

        let state = match config.direction {
            Direction::Grow => GenerationState::Growing,
            Direction::Shrink => GenerationState::Shrinking,
        };

        log::debug!(
            "starting {:?} run from {} with {sample_count} samples per curve (cap {max_iterations})",
            config.direction,
            config.seed,
        );

        Ok(Self {
            config: config.clone(),
            sample_count,
            max_iterations,
            state,
            params: config.seed,
            previous: seed.clone(),
            seed,
            iterations: 0,
            curves: 1,
            closing: None,
            termination: None,
            builder,
        })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GenerationState {
        self.state
    }

    /// Iterations performed so far.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Parameters of the last accepted curve.
    #[must_use]
    pub const fn current_parameters(&self) -> CurveParameters {
        self.params
    }

    /// Advance the state machine by one transition.
    ///
    /// # Errors
    ///
    /// Returns [`SpiralError::NonConvergent`] once the iteration cap is
    /// exhausted without termination. Sampling and stitching errors are
    /// propagated unchanged.
    pub fn advance(&mut self) -> Result<GenerationState, SpiralError> {
        match self.state {
            GenerationState::Growing | GenerationState::Shrinking => self.iterate()?,
            GenerationState::Terminating => {
                if let Some(closing) = self.closing.take() {
                    self.builder.push_segment(closing);
                }
                log::info!(
                    "spiral terminated by {:?} after {} iterations at {}",
                    self.termination,
                    self.iterations,
                    self.params,
                );
                self.state = GenerationState::Done;
            }
            GenerationState::Done => {}
        }
        Ok(self.state)
    }

    /// Run to completion and return the finished path.
    ///
    /// # Errors
    ///
    /// See [`advance`](Self::advance).
    pub fn run(mut self) -> Result<SpiralPath, SpiralError> {
        while self.state != GenerationState::Done {
            self.advance()?;
        }
        let termination = self.termination.unwrap_or(match self.config.termination {
            Termination::BoundaryIntersection { .. } => TerminationReason::BoundaryIntersection,
            Termination::AxisDegenerate => TerminationReason::AxisDegenerate,
        });
        let summary = RunSummary {
            iterations: self.iterations,
            curves: self.curves,
            segments: self.builder.segment_count(),
            points: self.builder.point_count(),
            sample_count: self.sample_count,
            final_parameters: self.params,
            termination,
        };
        Ok(self.builder.finish(self.seed, summary))
    }

    fn iterate(&mut self) -> Result<(), SpiralError> {
        if self.iterations >= self.max_iterations {
            return Err(SpiralError::NonConvergent {
                iterations: self.iterations,
                last: self.params,
            });
        }
        self.iterations += 1;

        let (params, curve) = match (self.config.direction, self.config.termination) {
            (Direction::Grow, Termination::BoundaryIntersection { bound }) => {
                let next = self.params.grown(self.config.step)?;
                let curve = self.config.sampling.sample(next, self.sample_count)?;
                if reaches_boundary(&curve, bound) {
                    // Close with a final lap on the outermost accepted curve.
                    let closing = stitch(&self.previous, &self.previous)?;
                    self.terminate(closing, TerminationReason::BoundaryIntersection);
                    return Ok(());
                }
                (next, curve)
            }
            _ => {
                let Some(next) = self.params.shrunk(self.config.step) else {
                    let closing = stitch_to_origin(&self.previous);
                    self.terminate(closing, TerminationReason::AxisDegenerate);
                    return Ok(());
                };
                let curve = self.config.sampling.sample(next, self.sample_count)?;
                (next, curve)
            }
        };

        let seam = stitch(&self.previous, &curve)?;
        self.builder.push_segment(seam);
        self.previous = curve;
        self.params = params;
        self.curves += 1;
        log::debug!("iteration {}: accepted curve {params}", self.iterations);
        Ok(())
    }

    fn terminate(&mut self, closing: Curve, reason: TerminationReason) {
        self.closing = Some(closing);
        self.termination = Some(reason);
        self.state = GenerationState::Terminating;
    }
}

/// Whether any sample of `curve` lies on or outside the ellipse `bound`.
fn reaches_boundary(curve: &Curve, bound: CurveParameters) -> bool {
    curve
        .points()
        .iter()
        .any(|p| bound.implicit_value(*p) >= 1.0)
}

/// Generate a complete spiral path for `config`.
///
/// # Errors
///
/// - [`SpiralError::InvalidParameter`] for an invalid configuration.
/// - [`SpiralError::NonConvergent`] if the iteration cap is reached
///   first; carries the last accepted curve's parameters.
/// - [`SpiralError::LengthMismatch`] never occurs for valid samplers,
///   since every curve of a run shares one sample count.
///
/// # Examples
///
/// ```
/// use scarf_spiral::{CurveParameters, Resolution, SpiralConfig, generate};
///
/// let config = SpiralConfig {
///     resolution: Resolution::Count(200),
///     ..SpiralConfig::inward(CurveParameters::new(50.0, 100.0).unwrap(), 5.0)
/// };
/// let path = generate(&config).unwrap();
/// let last = path.points().last().unwrap();
/// assert_eq!((last.x, last.y), (0.0, 0.0));
/// ```
pub fn generate(config: &SpiralConfig) -> Result<SpiralPath, SpiralError> {
    SpiralGenerator::new(config)?.run()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn params(a: f64, b: f64) -> CurveParameters {
        CurveParameters::new(a, b).unwrap()
    }

    fn small_outward() -> SpiralConfig {
        SpiralConfig {
            resolution: Resolution::Count(64),
            ..SpiralConfig::outward(params(1.0, 1.0), 1.0, params(5.0, 5.0))
        }
    }

    // --- Validation ---

    #[test]
    fn default_config_is_valid() {
        assert!(SpiralConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_or_negative_step_is_rejected() {
        for step in [0.0, -1.0, f64::NAN] {
            let config = SpiralConfig {
                step,
                ..small_outward()
            };
            assert!(
                matches!(generate(&config), Err(SpiralError::InvalidParameter(_))),
                "step {step} should be rejected"
            );
        }
    }

    #[test]
    fn mismatched_policy_is_rejected() {
        let config = SpiralConfig {
            termination: Termination::AxisDegenerate,
            ..small_outward()
        };
        assert!(matches!(
            config.validate(),
            Err(SpiralError::InvalidParameter(_))
        ));

        let config = SpiralConfig {
            direction: Direction::Shrink,
            ..small_outward()
        };
        assert!(matches!(
            config.validate(),
            Err(SpiralError::InvalidParameter(_))
        ));
    }

    #[test]
    fn seed_outside_boundary_is_rejected() {
        let config = SpiralConfig {
            resolution: Resolution::Count(64),
            ..SpiralConfig::outward(params(10.0, 10.0), 1.0, params(5.0, 5.0))
        };
        assert!(matches!(
            generate(&config),
            Err(SpiralError::InvalidParameter(_))
        ));
    }

    #[test]
    fn oversized_resolution_is_rejected_before_allocating() {
        for resolution in [Resolution::Spacing(1e-300), Resolution::Count(usize::MAX)] {
            let config = SpiralConfig {
                resolution,
                ..SpiralConfig::inward(params(50.0, 100.0), 5.0)
            };
            assert!(
                matches!(generate(&config), Err(SpiralError::InvalidParameter(_))),
                "{resolution:?} should be rejected"
            );
        }
    }

    #[test]
    fn oversized_resolution_from_json_is_rejected() {
        let config: SpiralConfig =
            serde_json::from_str(r#"{"resolution": {"Count": 18446744073709551615}}"#).unwrap();
        assert!(matches!(
            generate(&config),
            Err(SpiralError::InvalidParameter(_))
        ));
    }

    #[test]
    fn point_budget_overflow_is_rejected() {
        // A vanishing step derives a cap that saturates at usize::MAX.
        let config = SpiralConfig {
            resolution: Resolution::Count(64),
            ..SpiralConfig::inward(params(50.0, 100.0), 1e-300)
        };
        assert_eq!(config.effective_max_iterations(), usize::MAX);
        assert!(matches!(
            generate(&config),
            Err(SpiralError::InvalidParameter(_))
        ));
    }

    #[test]
    fn derived_iteration_cap() {
        let config = SpiralConfig::outward(params(1.0, 1.0), 1.0, params(21.0, 21.0));
        assert_eq!(config.effective_max_iterations(), 22);

        let config = SpiralConfig::inward(params(50.0, 100.0), 5.0);
        assert_eq!(config.effective_max_iterations(), 12);

        let config = SpiralConfig {
            max_iterations: Some(3),
            ..config
        };
        assert_eq!(config.effective_max_iterations(), 3);
    }

    // --- Outward growth ---

    #[test]
    fn outward_path_stays_inside_boundary() {
        let path = generate(&small_outward()).unwrap();
        let bound = params(5.0, 5.0);
        for p in path.points() {
            assert!(bound.implicit_value(*p) < 1.0, "({}, {}) escapes", p.x, p.y);
        }
    }

    #[test]
    fn outward_segments_have_equal_length() {
        let path = generate(&small_outward()).unwrap();
        assert!(path.segments().all(|s| s.len() == 64));
        assert_eq!(path.summary().sample_count, 64);
    }

    #[test]
    fn outward_closes_with_lap_on_outermost_curve() {
        let path = generate(&small_outward()).unwrap();
        let summary = path.summary();
        // Curves at r = 2, 3, 4 are accepted; r = 5 touches the boundary.
        assert_eq!(summary.iterations, 4);
        assert_eq!(summary.curves, 4);
        assert_eq!(summary.final_parameters, params(4.0, 4.0));
        assert_eq!(summary.termination, TerminationReason::BoundaryIntersection);
        // Three seams plus the closing lap.
        assert_eq!(summary.segments, 4);

        let closing = path.segments().last().unwrap();
        for p in closing {
            assert!((p.norm() - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn seed_is_excluded_unless_requested() {
        let without = generate(&small_outward()).unwrap();
        let with = generate(&SpiralConfig {
            export_seed: true,
            ..small_outward()
        })
        .unwrap();
        assert_eq!(with.len(), without.len() + 64);
        assert_eq!(&with.points()[..64], without.seed().points());
        assert_eq!(with.seed(), without.seed());
        assert_eq!(with.summary().points, with.len());
    }

    #[test]
    fn path_starts_on_seed_and_is_continuous_across_seams() {
        let path = generate(&small_outward()).unwrap();
        assert_eq!(path.points().first(), path.seed().first());
        // Each seam ends on the curve the next seam starts from, at the
        // same phase, so consecutive seams meet one sample step apart.
        let segments: Vec<&[Point]> = path.segments().collect();
        for w in segments.windows(2) {
            let end = w[0].last().unwrap();
            let start = w[1].first().unwrap();
            assert!(end.distance(*start) < 1.0, "gap between segments");
        }
    }

    #[test]
    fn iteration_cap_reports_last_valid_curve() {
        let config = SpiralConfig {
            max_iterations: Some(2),
            ..small_outward()
        };
        let err = generate(&config).unwrap_err();
        assert_eq!(
            err,
            SpiralError::NonConvergent {
                iterations: 2,
                last: params(3.0, 3.0),
            }
        );
    }

    // --- Inward shrink ---

    #[test]
    fn inward_path_ends_at_origin() {
        let config = SpiralConfig {
            resolution: Resolution::Count(500),
            ..SpiralConfig::inward(params(50.0, 100.0), 5.0)
        };
        let path = generate(&config).unwrap();
        assert_eq!(path.points().last(), Some(&Point::ORIGIN));
        let summary = path.summary();
        assert_eq!(summary.termination, TerminationReason::AxisDegenerate);
        // a: 45, 40, ..., 5 accepted (9 curves), a = 0 degenerates.
        assert_eq!(summary.final_parameters, params(5.0, 55.0));
        assert_eq!(summary.iterations, 10);
        assert_eq!(summary.segments, 10);
    }

    #[test]
    fn inward_resolution_follows_seed() {
        let config = SpiralConfig {
            resolution: Resolution::Spacing(1.0),
            ..SpiralConfig::inward(params(10.0, 10.0), 5.0)
        };
        let path = generate(&config).unwrap();
        // round(20π) = 63
        assert_eq!(path.summary().sample_count, 63);
    }

    #[test]
    fn inward_step_larger_than_seed_collapses_immediately() {
        let config = SpiralConfig {
            resolution: Resolution::Count(32),
            ..SpiralConfig::inward(params(3.0, 4.0), 10.0)
        };
        let path = generate(&config).unwrap();
        assert_eq!(path.summary().segments, 1);
        assert_eq!(path.len(), 32);
        assert_eq!(path.points().last(), Some(&Point::ORIGIN));
    }

    // --- State machine ---

    #[test]
    fn generator_walks_through_states() {
        let config = SpiralConfig {
            resolution: Resolution::Count(16),
            ..SpiralConfig::inward(params(2.0, 2.0), 1.0)
        };
        let mut generator = SpiralGenerator::new(&config).unwrap();
        assert_eq!(generator.state(), GenerationState::Shrinking);
        // a = 1 accepted.
        assert_eq!(generator.advance().unwrap(), GenerationState::Shrinking);
        assert_eq!(generator.current_parameters(), params(1.0, 1.0));
        // a = 0 degenerates.
        assert_eq!(generator.advance().unwrap(), GenerationState::Terminating);
        assert_eq!(generator.advance().unwrap(), GenerationState::Done);
        assert_eq!(generator.advance().unwrap(), GenerationState::Done);
        assert_eq!(generator.iterations(), 2);

        let path = generator.run().unwrap();
        assert_eq!(path.summary().termination, TerminationReason::AxisDegenerate);
        assert_eq!(path.summary().segments, 2);
    }

    #[test]
    fn arc_length_runs_keep_fixed_resolution() {
        let config = SpiralConfig {
            sampling: SamplingKind::ArcLength,
            resolution: Resolution::Count(120),
            ..SpiralConfig::outward(params(6.0, 2.0), 1.0, params(12.0, 8.0))
        };
        let path = generate(&config).unwrap();
        assert!(path.segments().all(|s| s.len() == 120));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SpiralConfig {
            sampling: SamplingKind::ArcLength,
            export_seed: true,
            max_iterations: Some(40),
            ..SpiralConfig::inward(params(50.0, 100.0), 5.0)
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SpiralConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_json_config_fills_defaults() {
        let config: SpiralConfig = serde_json::from_str(r#"{"step": 2.5}"#).unwrap();
        assert!((config.step - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.seed, SpiralConfig::DEFAULT_SEED);
        assert_eq!(config.direction, Direction::Grow);
    }
}
