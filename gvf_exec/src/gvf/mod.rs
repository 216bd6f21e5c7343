//! # Guiding vector field module
//!
//! The guiding vector field gives, at any point near a path, the direction to
//! drive in. Far from the path it points mostly towards it, on the path it
//! points along the tangent. The blend is set by a convergence gain and an
//! error map shaping the signed cross track error.
//!
//! The field is evaluated together with its derivative with respect to the
//! distance travelled along it, which the controller uses for acceleration
//! feed forward.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod error_map;
pub mod field;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use error_map::{ErrorMap, ErrorMapping};
pub use field::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while evaluating the field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GvfError {
    /// The path tangent has no direction, so neither has the field.
    #[error("The path tangent at s = {0} has zero length")]
    ZeroDirection(f64),

    /// The point is at the centre of curvature of the path, where the
    /// projection does not move smoothly with the point.
    #[error("The projection onto the path is singular (denominator {0})")]
    SingularProjection(f64),

    #[error("Invalid error map: {0}")]
    InvalidErrorMap(&'static str),

    #[error("The convergence gain must be finite and non-negative, found {0}")]
    InvalidGain(f64),
}
