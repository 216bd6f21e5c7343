//! # GVF control module
//!
//! GVF control keeps the robot on a path while moving it along the path at
//! the speed allowed by an online displacement profile.
//!
//! Each cycle the robot's position is projected onto the path, using the
//! previous cycle's arc length as the starting guess. The guiding vector field
//! at that point gives the direction to drive in, and the profile gives the
//! speed and acceleration. Because the field's argument is itself a function
//! of the distance travelled, the acceleration demand picks up a term in the
//! square of the speed:
//!
//!   vel   = u v
//!   accel = u a + u' v^2
//!
//! The heading demand follows the path's heading interpolator, chain-ruled
//! through the rate at which the projection moves, with a PID on the heading
//! error near the end of the path. The field frame demands are rotated into
//! the body frame and passed through a kinematic feed forward model to give
//! drive powers.
//!
//! Within `epsilon_m` of the end of the path the projection can move no
//! further, so the field is replaced by the direction to the end point.
//!
//! Once the robot is at the end of the path the module switches to the
//! `Finished` mode and commands a stop every cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::Params;
pub use state::*;
