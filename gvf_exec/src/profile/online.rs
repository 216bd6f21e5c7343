//! # Online profile
//!
//! Recomputes the safe velocity every cycle from the last committed velocity,
//! rather than following a profile fixed in advance. Querying the profile
//! does not change it: the controller commits the velocity it acted on with
//! `update`, after which the next query is relative to that velocity.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{DisplacementProfile, DisplacementState, SimpleConstraints};
use util::maths::EPSILON;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnlineProfile {
    goal: DisplacementState,
    length_m: f64,

    /// Upper bound on velocity from a backward pass over the constraints
    backward: Option<DisplacementProfile>,

    last_vel_ms: f64,

    /// Time of the last committed velocity, `None` until the first commit
    last_time_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OnlineProfile {
    pub fn new(
        start: DisplacementState,
        goal: DisplacementState,
        length_m: f64,
        backward: Option<DisplacementProfile>,
    ) -> Self {
        Self {
            goal,
            length_m,
            backward,
            last_vel_ms: start.v,
            last_time_s: None,
        }
    }

    /// The safe state at displacement `x` at time `now_s`.
    ///
    /// The velocity is the lowest of:
    ///  - the velocity reachable from the last committed velocity,
    ///  - the velocity from which the goal velocity can still be reached in
    ///    the remaining distance,
    ///  - the constraints' maximum velocity,
    ///  - the backward pass bound, if there is one.
    ///
    /// The remaining distance is never taken as less than `error`, so that a
    /// robot far from the path but near its end is not brought to a stop
    /// before it has converged.
    ///
    /// The acceleration is the finite difference from the last committed
    /// velocity, and zero before the first commit.
    pub fn get(
        &self,
        x: f64,
        error: f64,
        constraints: &SimpleConstraints,
        now_s: f64,
    ) -> DisplacementState {
        let dt = self.last_time_s.map_or(0.0, |t| (now_s - t).max(0.0));
        let max_accel = constraints.max_accel_mss;

        let remaining = (self.length_m - x).abs().max(error.abs());
        let vel_to_stop = (self.goal.v * self.goal.v + 2.0 * max_accel * remaining).sqrt();
        let vel_from_last = self.last_vel_ms + max_accel * dt;

        let mut v = vel_from_last
            .min(vel_to_stop)
            .min(constraints.max_vel_ms)
            .max(0.0);

        if let Some(ref backward) = self.backward {
            v = v.min(backward.get(x).v);
        }

        let a = if dt > EPSILON {
            (v - self.last_vel_ms) / dt
        } else {
            0.0
        };

        DisplacementState { x, v, a }
    }

    /// Commit the velocity acted on at `now_s`.
    pub fn update(&mut self, v: f64, now_s: f64) {
        self.last_vel_ms = v;
        self.last_time_s = Some(now_s);
    }

    pub fn last_velocity(&self) -> f64 {
        self.last_vel_ms
    }

    pub fn length(&self) -> f64 {
        self.length_m
    }

    pub fn goal(&self) -> DisplacementState {
        self.goal
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::profile::{generate_online_profile, MotionConstraints};

    const LIMITS: SimpleConstraints = SimpleConstraints {
        max_vel_ms: 2.0,
        max_accel_mss: 1.0,
    };

    #[test]
    fn test_get_does_not_commit() {
        let mut p = OnlineProfile::new(
            DisplacementState::default(),
            DisplacementState::default(),
            10.0,
            None,
        );

        // No time has passed before the first commit
        assert_eq!(p.get(0.0, 0.0, &LIMITS, 5.0).v, 0.0);

        p.update(0.0, 5.0);
        let first = p.get(0.0, 0.0, &LIMITS, 5.1);
        let again = p.get(0.0, 0.0, &LIMITS, 5.1);
        assert_eq!(first, again);
        assert!((first.v - 0.1).abs() < 1e-12);
        assert!((first.a - 1.0).abs() < 1e-9);

        p.update(first.v, 5.1);
        assert!((p.get(0.0, 0.0, &LIMITS, 5.2).v - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_stops_at_goal() {
        let mut p = OnlineProfile::new(
            DisplacementState::from_velocity(2.0),
            DisplacementState::default(),
            10.0,
            None,
        );
        p.update(2.0, 0.0);

        // 0.5 m from the end the stopping velocity is sqrt(2 a d) = 1
        let s = p.get(9.5, 0.0, &LIMITS, 0.01);
        assert!((s.v - 1.0).abs() < 1e-12);

        // A large tracking error keeps the budget open
        let s = p.get(9.5, 2.0, &LIMITS, 0.01);
        assert!((s.v - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_generated_backward_bound() {
        struct SlowEnd;
        impl MotionConstraints for SlowEnd {
            fn get(&self, s: f64) -> SimpleConstraints {
                if s > 8.0 {
                    SimpleConstraints::new(0.5, 1.0)
                } else {
                    LIMITS
                }
            }
        }

        let mut p = generate_online_profile(
            DisplacementState::from_velocity(2.0),
            DisplacementState::default(),
            10.0,
            &SlowEnd,
            0.25,
        )
        .unwrap();
        p.update(2.0, 0.0);

        // The bound from the slow end is already active before it
        let v = p.get(7.5, 0.0, &LIMITS, 0.01).v;
        assert!(v < 2.0);
        assert!(v * v <= 0.25 + 2.0 * 1.0 * 0.5 + 1e-6);
    }
}
