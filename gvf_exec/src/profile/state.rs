//! # Displacement states and segments

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use util::maths::EPSILON;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic state at one displacement along a profile.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DisplacementState {
    /// Displacement, m
    pub x: f64,

    /// Velocity, m/s
    pub v: f64,

    /// Acceleration, m/s^2
    pub a: f64,
}

/// A constant acceleration piece of a profile, starting at `start` and
/// covering `dx` metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DisplacementSegment {
    pub start: DisplacementState,
    pub dx: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DisplacementState {
    pub fn new(x: f64, v: f64, a: f64) -> Self {
        Self { x, v, a }
    }

    /// A state at zero displacement with the given velocity and no
    /// acceleration.
    pub fn from_velocity(v: f64) -> Self {
        Self { x: 0.0, v, a: 0.0 }
    }

    /// Propagate the state forward by `dx` at constant acceleration.
    ///
    /// Velocity follows v^2 = v0^2 + 2 a dx, and is clamped at zero where
    /// a deceleration would stop the motion before `dx`.
    pub fn get(&self, dx: f64) -> Self {
        Self {
            x: self.x + dx,
            v: (self.v * self.v + 2.0 * self.a * dx).max(0.0).sqrt(),
            a: self.a,
        }
    }
}

impl DisplacementSegment {
    pub fn new(start: DisplacementState, dx: f64) -> Self {
        Self { start, dx }
    }

    /// State at `dx` into the segment.
    pub fn get(&self, dx: f64) -> DisplacementState {
        self.start.get(dx)
    }

    pub fn end(&self) -> DisplacementState {
        self.start.get(self.dx)
    }

    /// Time taken to cover the segment.
    pub fn duration(&self) -> f64 {
        let v0 = self.start.v;
        let a = self.start.a;

        if a.abs() < EPSILON {
            if self.dx <= 0.0 {
                0.0
            } else if v0 > EPSILON {
                self.dx / v0
            } else {
                std::f64::INFINITY
            }
        } else {
            ((self.end().v - v0) / a).max(0.0)
        }
    }

    /// Split the segment at `dx`, returning the two halves.
    pub fn split(&self, dx: f64) -> (Self, Self) {
        let dx = dx.max(0.0).min(self.dx);
        (
            Self::new(self.start, dx),
            Self::new(self.get(dx), self.dx - dx),
        )
    }

    /// The same segment traversed from the other end.
    ///
    /// Only the velocities at either end are guaranteed to swap. The
    /// displacement of the start state is left for the owning profile to
    /// renumber.
    pub fn reversed(&self) -> Self {
        let end = self.end();
        Self::new(DisplacementState::new(0.0, end.v, -end.a), self.dx)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_state_propagation() {
        let s = DisplacementState::new(1.0, 2.0, 1.5);
        let e = s.get(4.0);
        assert_eq!(e.x, 5.0);
        assert!((e.v * e.v - (4.0 + 2.0 * 1.5 * 4.0)).abs() < 1e-12);
        assert_eq!(e.a, 1.5);

        // Decelerating past a stop clamps at zero
        let stop = DisplacementState::new(0.0, 1.0, -1.0).get(10.0);
        assert_eq!(stop.v, 0.0);
    }

    #[test]
    fn test_segment_duration() {
        // Accelerate from rest: x = a t^2 / 2
        let acc = DisplacementSegment::new(DisplacementState::new(0.0, 0.0, 2.0), 4.0);
        assert!((acc.duration() - 2.0).abs() < 1e-12);

        let coast = DisplacementSegment::new(DisplacementState::from_velocity(2.0), 3.0);
        assert!((coast.duration() - 1.5).abs() < 1e-12);

        let stopped = DisplacementSegment::new(DisplacementState::from_velocity(0.0), 1.0);
        assert!(stopped.duration().is_infinite());

        let empty = DisplacementSegment::new(DisplacementState::from_velocity(0.0), 0.0);
        assert_eq!(empty.duration(), 0.0);
    }

    #[test]
    fn test_split_and_reverse() {
        let seg = DisplacementSegment::new(DisplacementState::new(0.0, 1.0, 1.0), 4.0);

        let (a, b) = seg.split(1.5);
        assert_eq!(a.dx, 1.5);
        assert_eq!(b.dx, 2.5);
        assert_eq!(b.start, seg.get(1.5));
        assert!((b.end().v - seg.end().v).abs() < 1e-12);

        let rev = seg.reversed();
        assert_eq!(rev.start.v, seg.end().v);
        assert_eq!(rev.start.a, -1.0);
        assert!((rev.end().v - seg.start.v).abs() < 1e-12);
        assert!((rev.duration() - seg.duration()).abs() < 1e-12);
    }
}
