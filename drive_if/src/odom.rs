//! # Odometry source

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::pose::{Pose, Twist};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One synchronous reading of the robot's state.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OdomSample {
    /// Current pose in the field frame
    pub pose: Pose,

    /// Current velocity in the field frame. The angular part damps the
    /// heading controller.
    pub field_vel: Twist,

    /// Time at which the sample was taken, from a monotonic clock
    pub time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Anything which can report where the robot is.
///
/// Read once per control cycle, before the controller runs.
pub trait PoseSource {
    fn sample(&mut self) -> OdomSample;
}
