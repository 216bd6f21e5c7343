//! # Displacement profile module
//!
//! Motion profiles in this module give velocity and acceleration as a
//! function of the distance travelled along a path rather than of time. The
//! speed at which the robot actually covers the path is decided by the closed
//! loop, so indexing the profile by displacement keeps the two consistent.
//!
//! A full profile is built from a forward pass (accelerating from the start
//! state), a backward pass (accelerating backwards from the goal state) and a
//! merge keeping the lower of the two at every displacement. The online
//! variant recomputes a safe velocity every cycle from the last velocity that
//! was actually commanded.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod constraints;
pub mod gen;
pub mod online;
#[allow(clippy::module_inception)]
pub mod profile;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use constraints::{DriveConstraints, MotionConstraints, PathConstraints, SimpleConstraints};
pub use gen::{generate_online_profile, generate_profile, DEFAULT_RESOLUTION_M};
pub use online::OnlineProfile;
pub use profile::DisplacementProfile;
pub use state::{DisplacementSegment, DisplacementState};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while generating a profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile length must be finite and non-negative, found {0}")]
    InvalidLength(f64),

    #[error("Profile resolution must be finite and positive, found {0}")]
    InvalidResolution(f64),

    #[error("Invalid motion constraints: {0}")]
    InvalidConstraints(&'static str),
}
