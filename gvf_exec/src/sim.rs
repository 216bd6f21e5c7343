//! # Drivetrain simulation
//!
//! A kinematic model of an omnidirectional drivetrain, in which the body
//! velocity is the commanded power divided by the velocity gain. Used to run
//! the controller without hardware.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Deserialize;

// Internal
use crate::vec2;
use drive_if::{DriveCmd, DriveSink, OdomSample, Pose, PoseSource, Twist};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a simulated run.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Pose the robot starts at
    pub start_pose: Pose,

    /// Power required per unit velocity
    pub k_v: f64,

    /// Simulated time after which the run is abandoned
    pub max_duration_s: f64,
}

/// Simulated drivetrain and odometry.
#[derive(Debug, Clone)]
pub struct SimDrive {
    pose: Pose,

    /// Velocity in the field frame
    field_vel: Twist,

    time_s: f64,

    /// Power required per unit velocity
    k_v: f64,

    last_cmd: DriveCmd,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimDrive {
    /// Create a stationary drivetrain at `pose`.
    pub fn new(pose: Pose, time_s: f64, k_v: f64) -> Self {
        Self {
            pose,
            field_vel: Twist::zero(),
            time_s,
            k_v,
            last_cmd: DriveCmd::Stop,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Integrate the last command forward to `now_s`.
    pub fn step(&mut self, now_s: f64) {
        let dt = now_s - self.time_s;
        if dt <= 0.0 {
            return;
        }

        let powers = self.last_cmd.powers();
        let body_vel = if self.k_v > 0.0 {
            Twist {
                linear: powers.linear / self.k_v,
                angular: powers.angular / self.k_v,
            }
        } else {
            Twist::zero()
        };

        self.field_vel = Twist {
            linear: vec2::rotate(&body_vel.linear, self.pose.heading_rad),
            angular: body_vel.angular,
        };

        self.pose.position_m += self.field_vel.linear * dt;
        self.pose.heading_rad += self.field_vel.angular * dt;
        self.time_s = now_s;

        trace!(
            "Sim pose ({:.4}, {:.4}, {:.4}) at {:.3} s",
            self.pose.position_m[0],
            self.pose.position_m[1],
            self.pose.heading_rad,
            self.time_s
        );
    }
}

impl DriveSink for SimDrive {
    fn send(&mut self, cmd: &DriveCmd) {
        self.last_cmd = *cmd;

        if let DriveCmd::Stop = cmd {
            self.field_vel = Twist::zero();
        }
    }
}

impl PoseSource for SimDrive {
    fn sample(&mut self) -> OdomSample {
        OdomSample {
            pose: self.pose,
            field_vel: self.field_vel,
            time_s: self.time_s,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn test_body_frame_motion() {
        let mut sim = SimDrive::new(Pose::new(0.0, 0.0, std::f64::consts::FRAC_PI_2), 0.0, 2.0);

        // Forward in the body frame is +Y in the field frame
        sim.send(&DriveCmd::BodyPowers(Twist::new(2.0, 0.0, 0.0)));
        sim.step(1.0);

        let odom = sim.sample();
        assert!((odom.pose.position_m - Vector2::new(0.0, 1.0)).norm() < 1e-12);
        assert!((odom.field_vel.linear - Vector2::new(0.0, 1.0)).norm() < 1e-12);
        assert_eq!(odom.time_s, 1.0);
    }

    #[test]
    fn test_stop() {
        let mut sim = SimDrive::new(Pose::default(), 0.0, 1.0);

        sim.send(&DriveCmd::BodyPowers(Twist::new(1.0, 0.0, 0.5)));
        sim.step(0.5);
        sim.send(&DriveCmd::Stop);
        sim.step(1.0);

        let odom = sim.sample();
        assert!((odom.pose.position_m[0] - 0.5).abs() < 1e-12);
        assert!((odom.pose.heading_rad - 0.25).abs() < 1e-12);
        assert_eq!(odom.field_vel, Twist::zero());

        // Time cannot run backwards
        sim.step(0.2);
        assert_eq!(sim.sample().time_s, 1.0);
    }
}
