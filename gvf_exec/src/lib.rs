//! # GVF path following library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to
//! access items defined inside the executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Path geometry - polynomial segments, arc-length parametrisation and projection
pub mod path;

/// Displacement motion profiles - velocity and acceleration as a function of distance
pub mod profile;

/// Guiding vector field - the direction to drive in to converge onto a path
pub mod gvf;

/// GVF control module - keeps the robot on the given path
pub mod gvf_ctrl;

/// Kinematic simulation of an omnidirectional drivetrain
pub mod sim;

/// 2D vector helpers shared by the geometry modules
pub mod vec2;
