//! # GVF controllers module
//!
//! This module provides the heading PID controller, the feed forward model and
//! the frame conversions used by GvfCtrl.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::vec2;
use drive_if::{Pose, Twist};
use util::maths::{angle_wrap, sign};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

/// Kinematic feed forward model of the drivetrain.
///
/// Maps a velocity and acceleration demand onto a drive power, with a static
/// friction term in the direction of motion.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct FeedForward {
    pub k_s: f64,
    pub k_v: f64,
    pub k_a: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            integral: 0f64,
            prev_error: None,
        }
    }

    /// Get the value of the controller for the given error.
    ///
    /// `dt` is the time since the previous call, or `None` on the first call.
    pub fn get(&mut self, error: f64, dt: Option<f64>) -> f64 {
        let dt = dt.filter(|t| *t > 0.0);

        // There is no derivative without both a time difference and a
        // previous error, since a jump from zero produces a spike.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64,
        };

        self.output(error, deriv, dt)
    }

    /// Get the value of the controller for the given error, using a
    /// measured rate of change of the error for the derivative term.
    pub fn get_with_rate(&mut self, error: f64, error_rate: f64, dt: Option<f64>) -> f64 {
        self.output(error, error_rate, dt.filter(|t| *t > 0.0))
    }

    /// Forget the accumulated integral and previous error.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }

    fn output(&mut self, error: f64, deriv: f64, dt: Option<f64>) -> f64 {
        // If there's no time difference then we don't accumulate the
        // integral, since adding on the whole error produces a spike compared
        // to normal operation.
        if let Some(t) = dt {
            self.integral += error * t;
        }

        self.prev_error = Some(error);

        self.k_p * error + self.k_i * self.integral + self.k_d * deriv
    }
}

impl FeedForward {
    pub fn new(k_s: f64, k_v: f64, k_a: f64) -> Self {
        Self { k_s, k_v, k_a }
    }

    /// Linear power for a velocity and acceleration demand.
    pub fn linear(&self, vel: &Vector2<f64>, accel: &Vector2<f64>) -> Vector2<f64> {
        let norm = vel.norm();
        let unit = if norm > 0.0 { vel / norm } else { Vector2::zeros() };

        unit * self.k_s + vel * self.k_v + accel * self.k_a
    }

    /// Angular power for a rate and angular acceleration demand.
    pub fn angular(&self, rate: f64, accel: f64) -> f64 {
        sign(rate) * self.k_s + rate * self.k_v + accel * self.k_a
    }

    /// Drive powers for a body frame velocity and acceleration demand.
    pub fn powers(&self, vel: &Twist, accel: &Twist) -> Twist {
        Twist {
            linear: self.linear(&vel.linear, &accel.linear),
            angular: self.angular(vel.angular, accel.angular),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotate a field frame velocity into the body frame of the robot at `pose`.
pub fn field_to_body_vel(pose: &Pose, field_vel: &Twist) -> Twist {
    Twist {
        linear: vec2::rotate(&field_vel.linear, -pose.heading_rad),
        angular: field_vel.angular,
    }
}

/// Convert a field frame acceleration into the body frame of the robot at
/// `pose`, moving at `field_vel`.
///
/// As well as the rotation, the body frame itself rotates at the angular
/// rate, which adds the derivative of the rotation applied to the velocity.
pub fn field_to_body_accel(pose: &Pose, field_vel: &Twist, field_accel: &Twist) -> Twist {
    let (sin, cos) = pose.heading_rad.sin_cos();
    let vx = field_vel.linear[0];
    let vy = field_vel.linear[1];

    let frame_rate = Vector2::new(-vx * sin + vy * cos, -vx * cos - vy * sin) * field_vel.angular;

    Twist {
        linear: vec2::rotate(&field_accel.linear, -pose.heading_rad) + frame_rate,
        angular: field_accel.angular,
    }
}

/// The error from `current` to `target`, expressed in the body frame of
/// `current`.
pub fn pose_error(target: &Pose, current: &Pose) -> Pose {
    Pose {
        position_m: vec2::rotate(&(target.position_m - current.position_m), -current.heading_rad),
        heading_rad: angle_wrap(target.heading_rad - current.heading_rad),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_pid() {
        let mut pid = PidController::new(2.0, 1.0, 0.5);

        // No time difference, so proportional only
        assert_eq!(pid.get(1.0, None), 2.0);

        // Integral 0.1, derivative (0.5 - 1.0) / 0.1
        let out = pid.get(0.5, Some(0.1));
        assert!((out - (1.0 + 0.05 - 2.5)).abs() < 1e-12);

        pid.reset();
        assert_eq!(pid.get(1.0, Some(0.1)), 2.0 + 0.1);
    }

    #[test]
    fn test_pid_measured_rate() {
        let mut pid = PidController::new(2.0, 1.0, 0.5);

        // The measured rate is used even on the first call
        assert_eq!(pid.get_with_rate(1.0, -4.0, None), 2.0 - 2.0);

        // Integral 0.1, derivative from the rate rather than the difference
        let out = pid.get_with_rate(1.0, 0.0, Some(0.1));
        assert!((out - (2.0 + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_feed_forward() {
        let ff = FeedForward::new(0.1, 2.0, 0.5);

        let p = ff.linear(&Vector2::new(3.0, 4.0), &Vector2::new(1.0, 0.0));
        assert!((p - Vector2::new(0.06 + 6.0 + 0.5, 0.08 + 8.0)).norm() < 1e-12);

        // No static friction term when stationary
        let p = ff.linear(&Vector2::zeros(), &Vector2::new(0.0, 2.0));
        assert!((p - Vector2::new(0.0, 1.0)).norm() < 1e-12);

        assert!((ff.angular(-1.0, 0.0) - (-0.1 - 2.0)).abs() < 1e-12);
        assert_eq!(ff.angular(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_field_to_body() {
        let pose = Pose::new(1.0, 1.0, PI / 2.0);

        // Moving along field +Y while facing +Y is moving forward
        let vel = Twist::new(0.0, 2.0, 0.0);
        let body = field_to_body_vel(&pose, &vel);
        assert!((body.linear - Vector2::new(2.0, 0.0)).norm() < 1e-12);

        // Driving straight forward while turning: field acceleration is
        // centripetal, body acceleration is zero
        let omega = 0.5;
        let vel = Twist::new(0.0, 2.0, omega);
        let accel = Twist::new(-2.0 * omega, 0.0, 0.0);
        let body = field_to_body_accel(&pose, &vel, &accel);
        assert!(body.linear.norm() < 1e-12);
    }

    #[test]
    fn test_pose_error() {
        let target = Pose::new(2.0, 1.0, 0.1);
        let current = Pose::new(1.0, 1.0, PI / 2.0);

        let err = pose_error(&target, &current);
        assert!((err.position_m - Vector2::new(0.0, -1.0)).norm() < 1e-12);
        assert!((err.heading_rad - (0.1 - PI / 2.0)).abs() < 1e-12);
    }
}
