//! # Drive interface crate.
//!
//! Provides the types and traits through which the path follower talks to
//! the rest of the robot: odometry comes in through a `PoseSource`, commands
//! go out through a `DriveSink`.
//!
//! All quantities are expressed in the field frame unless the name says
//! otherwise. Angles follow the right hand rule about the Z+ (upwards) axis.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Pose and velocity types
pub mod pose;

/// Odometry source interface
pub mod odom;

/// Drivetrain command and sink interface
pub mod drive;

// ------------------------------------------------------------------------------------------------
// REEXPORTS
// ------------------------------------------------------------------------------------------------

pub use drive::{DriveCmd, DriveSink};
pub use odom::{OdomSample, PoseSource};
pub use pose::{Pose, Twist};
