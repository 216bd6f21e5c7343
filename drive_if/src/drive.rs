//! # Drivetrain commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::pose::Twist;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command which can be executed by an omnidirectional drivetrain.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriveCmd {
    /// Actuator-level powers in the robot body frame.
    ///
    /// `linear` is (forward, left), `angular` is the turn power following the
    /// right hand rule about the robot's Z+ (upwards) axis.
    BodyPowers(Twist),

    /// Stop the robot, setting all drive powers to zero.
    Stop,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Anything which can actuate a drive command.
///
/// Called once per control cycle; there is no response.
pub trait DriveSink {
    fn send(&mut self, cmd: &DriveCmd);
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DriveCmd {
    /// The body powers this command represents, zero for `Stop`.
    pub fn powers(&self) -> Twist {
        match self {
            DriveCmd::BodyPowers(p) => *p,
            DriveCmd::Stop => Twist::zero(),
        }
    }
}
