//! # Displacement profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{DisplacementSegment, DisplacementState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered, contiguous list of constant acceleration segments starting at
/// zero displacement.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DisplacementProfile {
    segments: Vec<DisplacementSegment>,
    length_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DisplacementProfile {
    /// Build a profile from segments, renumbering each segment's start
    /// displacement so the profile is contiguous from zero.
    pub fn new(mut segments: Vec<DisplacementSegment>) -> Self {
        let mut x = 0.0;
        for seg in segments.iter_mut() {
            seg.start.x = x;
            x += seg.dx;
        }

        Self {
            segments,
            length_m: x,
        }
    }

    /// State at displacement `x`, clamped onto the profile.
    pub fn get(&self, x: f64) -> DisplacementState {
        let mut remaining = x.max(0.0).min(self.length_m);

        for seg in self.segments.iter() {
            if remaining <= seg.dx {
                return seg.get(remaining);
            }
            remaining -= seg.dx;
        }

        self.segments
            .last()
            .map(|s| s.end())
            .unwrap_or_default()
    }

    pub fn length(&self) -> f64 {
        self.length_m
    }

    /// Time taken to traverse the whole profile.
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration()).sum()
    }

    pub fn start(&self) -> DisplacementState {
        self.get(0.0)
    }

    pub fn end(&self) -> DisplacementState {
        self.get(self.length_m)
    }

    pub fn segments(&self) -> &[DisplacementSegment] {
        &self.segments
    }

    /// The profile traversed from the end back to the start.
    pub fn reversed(&self) -> Self {
        Self::new(self.segments.iter().rev().map(|s| s.reversed()).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn trapezoid() -> DisplacementProfile {
        DisplacementProfile::new(vec![
            DisplacementSegment::new(DisplacementState::new(0.0, 0.0, 1.0), 2.0),
            DisplacementSegment::new(DisplacementState::from_velocity(2.0), 4.0),
            DisplacementSegment::new(DisplacementState::new(0.0, 2.0, -1.0), 2.0),
        ])
    }

    #[test]
    fn test_get() {
        let p = trapezoid();
        assert_eq!(p.length(), 8.0);

        assert_eq!(p.start().v, 0.0);
        assert!(p.end().v.abs() < 1e-9);
        assert!((p.get(4.0).v - 2.0).abs() < 1e-12);
        assert_eq!(p.get(4.0).x, 4.0);

        // Clamped outside the profile
        assert_eq!(p.get(-1.0), p.start());
        assert_eq!(p.get(100.0), p.end());

        // Start displacements are renumbered
        assert_eq!(p.segments()[2].start.x, 6.0);
    }

    #[test]
    fn test_duration() {
        // 2 s up, 2 s coasting, 2 s down
        assert!((trapezoid().duration() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_reversed() {
        let p = trapezoid();
        let r = p.reversed();

        assert_eq!(r.length(), p.length());
        assert!((r.duration() - p.duration()).abs() < 1e-9);
        for i in 0..=16 {
            let x = i as f64 * 0.5;
            assert!((r.get(x).v - p.get(p.length() - x).v).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty() {
        let p = DisplacementProfile::new(Vec::new());
        assert_eq!(p.length(), 0.0);
        assert_eq!(p.get(1.0), DisplacementState::default());
        assert_eq!(p.duration(), 0.0);
    }
}
