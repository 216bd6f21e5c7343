//! # Pose and twist

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The pose (position and heading in the field frame) of the robot.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {
    /// Position in the field frame
    pub position_m: Vector2<f64>,

    /// Heading, the angle between the robot's X+ axis and the field X+ axis.
    pub heading_rad: f64,
}

/// A planar rate quantity: a linear part and an angular part.
///
/// Used for velocities, accelerations and drive powers alike. The frame is
/// given by whoever holds the twist.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Twist {
    /// Linear component (x, y)
    pub linear: Vector2<f64>,

    /// Angular component about Z+
    pub angular: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            heading_rad,
        }
    }
}

impl Twist {
    pub fn new(x: f64, y: f64, angular: f64) -> Self {
        Self {
            linear: Vector2::new(x, y),
            angular,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

