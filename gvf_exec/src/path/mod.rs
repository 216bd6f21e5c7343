//! # Path module
//!
//! A path is a smooth curve through an ordered list of waypoints, globally
//! parametrised by arc length `s`.
//!
//! Between each pair of waypoints a polynomial segment is fitted (cubic
//! Hermite, or quintic if a curvature is given at either end). Polynomials
//! are naturally parametrised by `t` in [0, 1], which does not advance at a
//! constant rate along the curve. Each segment therefore owns a table of
//! circular arcs, produced by adaptive bisection of the curve, which maps arc
//! length back to `t`. Forward evaluation is then chain-ruled into the
//! arc-length domain using `dt/ds = 1/|r'(t)|`.
//!
//! The heading of the robot along the path is given by a `HeadingInterp`,
//! which may follow the tangent or be independent of it, since the drivetrain
//! is omnidirectional.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arc;
pub mod heading;
pub mod knot;
pub mod param;
#[allow(clippy::module_inception)]
pub mod path;
pub mod poly;
pub mod segment;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use arc::Arc;
pub use heading::{HeadingDerivs, HeadingInterp, HeadingInterpolator};
pub use knot::{Knot, Waypoint};
pub use param::{ArcParams, ArcTable};
pub use path::*;
pub use poly::{PolySegment, Polynomial};
pub use segment::{Order, PathSegment, SegmentDerivs};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building or querying a path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("At least two waypoints are required to build a path, found {0}")]
    NotEnoughWaypoints(usize),

    /// Two consecutive waypoints are at the same position, so the chord
    /// used to scale the tangents is zero.
    #[error("Waypoints {0} and {1} are coincident")]
    CoincidentKnots(usize, usize),

    #[error("A path segment has zero length")]
    DegenerateSegment,

    #[error("The boundary conditions of a segment could not be solved")]
    SingularFit,

    #[error("Derivative order {0} is not supported, expected 0 to 3")]
    UnsupportedDerivative(usize),

    /// No segment of the path could find a point whose tangent is
    /// orthogonal to the direction to the query point.
    #[error("The point ({0}, {1}) is outside the projection domain of the path")]
    PointOutsideProjectionDomain(f64, f64),

    #[error("Invalid arc parametrisation parameters: {0}")]
    InvalidArcParams(&'static str),
}
