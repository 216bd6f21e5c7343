//! # Motion constraints
//!
//! Velocity and acceleration limits as a function of displacement along a
//! path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::ProfileError;
use crate::path::Path;
use util::maths::EPSILON;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Constant velocity and acceleration limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimpleConstraints {
    pub max_vel_ms: f64,
    pub max_accel_mss: f64,
}

/// Limits of the drivetrain, converted into path constraints by
/// `DriveConstraints::at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConstraints {
    /// Maximum linear speed, m/s
    pub max_vel_ms: f64,

    /// Maximum linear acceleration, m/s^2
    pub max_accel_mss: f64,

    /// Maximum turn rate, rad/s
    #[serde(default)]
    pub max_ang_vel_rads: Option<f64>,

    /// Maximum centripetal acceleration, m/s^2
    #[serde(default)]
    pub max_lat_accel_mss: Option<f64>,
}

/// Drive constraints evaluated along a particular path.
pub struct PathConstraints<'a> {
    path: &'a Path,
    drive: &'a DriveConstraints,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of motion constraints along a profile.
pub trait MotionConstraints {
    /// The constraints `s` metres along the profile.
    fn get(&self, s: f64) -> SimpleConstraints;

    /// The constraints at `num` evenly spaced displacements covering
    /// [0, length].
    fn sample(&self, length: f64, num: usize) -> Vec<SimpleConstraints> {
        if num < 2 {
            return vec![self.get(0.0); num];
        }

        let step = length / (num - 1) as f64;
        (0..num).map(|i| self.get(i as f64 * step)).collect()
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimpleConstraints {
    pub fn new(max_vel_ms: f64, max_accel_mss: f64) -> Self {
        Self {
            max_vel_ms,
            max_accel_mss,
        }
    }
}

impl MotionConstraints for SimpleConstraints {
    fn get(&self, _s: f64) -> SimpleConstraints {
        *self
    }
}

impl DriveConstraints {
    /// Check the limits are positive and finite.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.max_vel_ms) {
            return Err(ProfileError::InvalidConstraints(
                "max_vel_ms must be positive",
            ));
        }
        if !positive(self.max_accel_mss) {
            return Err(ProfileError::InvalidConstraints(
                "max_accel_mss must be positive",
            ));
        }
        if !self.max_ang_vel_rads.map_or(true, positive) {
            return Err(ProfileError::InvalidConstraints(
                "max_ang_vel_rads must be positive",
            ));
        }
        if !self.max_lat_accel_mss.map_or(true, positive) {
            return Err(ProfileError::InvalidConstraints(
                "max_lat_accel_mss must be positive",
            ));
        }

        Ok(())
    }

    /// The constraints at arc length `s` along `path`.
    ///
    /// The speed is limited by the segment's speed hint, by the turn rate
    /// needed to follow the heading, and by the centripetal acceleration of
    /// the local curvature.
    pub fn at(&self, path: &Path, s: f64) -> SimpleConstraints {
        let mut max_vel_ms = self.max_vel_ms;

        if let Some(limit) = path.speed_limit(s) {
            max_vel_ms = max_vel_ms.min(limit);
        }

        if let Some(max_ang_vel) = self.max_ang_vel_rads {
            let heading_rate = path.deriv(s).heading.abs();
            if heading_rate > EPSILON {
                max_vel_ms = max_vel_ms.min(max_ang_vel / heading_rate);
            }
        }

        if let Some(max_lat_accel) = self.max_lat_accel_mss {
            let curvature = path.curvature(s).abs();
            if curvature > EPSILON {
                max_vel_ms = max_vel_ms.min((max_lat_accel / curvature).sqrt());
            }
        }

        SimpleConstraints {
            max_vel_ms,
            max_accel_mss: self.max_accel_mss,
        }
    }

    /// Bind these constraints to a path.
    pub fn along<'a>(&'a self, path: &'a Path) -> PathConstraints<'a> {
        PathConstraints { path, drive: self }
    }
}

impl<'a> MotionConstraints for PathConstraints<'a> {
    fn get(&self, s: f64) -> SimpleConstraints {
        self.drive.at(self.path, s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::{ArcParams, HeadingInterp, Waypoint};

    fn drive() -> DriveConstraints {
        DriveConstraints {
            max_vel_ms: 2.0,
            max_accel_mss: 1.0,
            max_ang_vel_rads: Some(0.5),
            max_lat_accel_mss: Some(0.4),
        }
    }

    #[test]
    fn test_simple_sample() {
        let c = SimpleConstraints::new(1.0, 2.0);
        let samples = c.sample(10.0, 5);
        assert_eq!(samples.len(), 5);
        assert!(samples.iter().all(|s| *s == c));
    }

    #[test]
    fn test_straight_path_unlimited() {
        let path = Path::from_waypoints(
            &[
                Waypoint::new(0.0, 0.0, 0.0).with_speed(1.5),
                Waypoint::new(5.0, 0.0, 0.0),
                Waypoint::new(10.0, 0.0, 0.0),
            ],
            HeadingInterp::default(),
            &ArcParams::default(),
        )
        .unwrap();

        let d = drive();
        assert_eq!(d.at(&path, 2.0), SimpleConstraints::new(1.5, 1.0));
        assert_eq!(d.at(&path, 7.0), SimpleConstraints::new(2.0, 1.0));
    }

    #[test]
    fn test_curved_path_limited() {
        let path = Path::from_waypoints(
            &[
                Waypoint::new(0.0, 0.0, 0.0),
                Waypoint::new(4.0, 4.0, std::f64::consts::FRAC_PI_2),
            ],
            HeadingInterp::default(),
            &ArcParams::default(),
        )
        .unwrap();

        let d = drive();
        let along = d.along(&path);

        for i in 0..=10 {
            let s = path.length() * i as f64 / 10.0;
            let c = along.get(s);
            let k = path.curvature(s).abs();
            let w = path.deriv(s).heading.abs();

            assert!(c.max_vel_ms <= 2.0);
            assert!(c.max_vel_ms * c.max_vel_ms * k <= 0.4 + 1e-9);
            assert!(c.max_vel_ms * w <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_validate() {
        assert!(drive().validate().is_ok());

        let bad = DriveConstraints {
            max_ang_vel_rads: Some(-1.0),
            ..drive()
        };
        assert!(bad.validate().is_err());

        let bad = DriveConstraints {
            max_vel_ms: 0.0,
            ..drive()
        };
        assert!(bad.validate().is_err());
    }
}
