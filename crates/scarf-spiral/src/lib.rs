//! scarf-spiral: Pure ellipse-family stitching engine (sans-IO).
//!
//! Turns a growing or shrinking family of ellipses into one continuous
//! open path through:
//! curve sampling -> seam stitching -> spiral generation.
//!
//! Consecutive curves are joined by a *scarf joint*: a per-sample linear
//! morph from one curve into the next, so the path never jumps between
//! rings. Generation stops when the family reaches a bounding ellipse
//! (outward) or an axis degenerates (inward).
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! point sequences. CSV and SVG serialization lives in `scarf-export`.

pub mod analysis;
pub mod path;
pub mod sample;
pub mod seam;
pub mod spiral;
pub mod types;

pub use path::{RunSummary, SpiralPath, TerminationReason};
pub use sample::{CurveSampler, Resolution, SamplingKind};
pub use seam::{stitch, stitch_to_origin};
pub use spiral::{
    Direction, GenerationState, SpiralConfig, SpiralGenerator, Termination, generate,
};
pub use types::{Bounds, Curve, CurveParameters, PathPoint, Point, Point3, SpiralError};
