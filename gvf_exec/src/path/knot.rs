//! # Knots and waypoints

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use super::PathError;
use crate::vec2;
use util::maths::EPSILON;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A waypoint as supplied by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position in the field frame
    pub position_m: Vector2<f64>,

    /// Direction of travel through the waypoint.
    ///
    /// If not given, interior waypoints use the direction from the previous
    /// to the next waypoint and end waypoints use the chord direction.
    #[serde(default)]
    pub tangent_rad: Option<f64>,

    /// Curvature of the path at the waypoint. Giving a curvature on either
    /// end of a segment makes it quintic.
    #[serde(default)]
    pub curvature_m: Option<f64>,

    /// Speed limit for the segment starting at this waypoint.
    #[serde(default)]
    pub speed_ms: Option<f64>,
}

/// Boundary conditions of a polynomial segment at one end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knot {
    /// Position in the field frame
    pub position: Vector2<f64>,

    /// First derivative with respect to the segment parameter `t`. The
    /// magnitude is the chord length of the segment.
    pub deriv: Vector2<f64>,

    /// Second derivative with respect to `t`, seeding the curvature.
    pub second_deriv: Option<Vector2<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(x_m: f64, y_m: f64, tangent_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            tangent_rad: Some(tangent_rad),
            curvature_m: None,
            speed_ms: None,
        }
    }

    pub fn with_curvature(mut self, curvature_m: f64) -> Self {
        self.curvature_m = Some(curvature_m);
        self
    }

    pub fn with_speed(mut self, speed_ms: f64) -> Self {
        self.speed_ms = Some(speed_ms);
        self
    }
}

impl Knot {
    pub fn new(position: Vector2<f64>, deriv: Vector2<f64>) -> Self {
        Self {
            position,
            deriv,
            second_deriv: None,
        }
    }

    pub fn with_second_deriv(mut self, second_deriv: Vector2<f64>) -> Self {
        self.second_deriv = Some(second_deriv);
        self
    }

    /// Build a knot at a waypoint for a segment with the given chord length.
    fn from_waypoint(wp: &Waypoint, tangent_rad: f64, chord_m: f64) -> Self {
        let deriv = vec2::from_polar(chord_m, tangent_rad);

        // For a curve with |r'| = chord and no tangential acceleration,
        // r'' = k * chord^2 * normal
        let second_deriv = wp
            .curvature_m
            .map(|k| vec2::from_polar(k * chord_m * chord_m, tangent_rad + std::f64::consts::FRAC_PI_2));

        Self {
            position: wp.position_m,
            deriv,
            second_deriv,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert waypoints into one (start, end) knot pair per segment.
///
/// Fails if fewer than two waypoints are given or if two consecutive
/// waypoints coincide.
pub fn knot_pairs(waypoints: &[Waypoint]) -> Result<Vec<(Knot, Knot)>, PathError> {
    if waypoints.len() < 2 {
        return Err(PathError::NotEnoughWaypoints(waypoints.len()));
    }

    // Check chords before resolving tangents, since tangent defaults are
    // chord directions
    for (i, pair) in waypoints.windows(2).enumerate() {
        if (pair[1].position_m - pair[0].position_m).norm() < EPSILON {
            return Err(PathError::CoincidentKnots(i, i + 1));
        }
    }

    let tangents: Vec<f64> = (0..waypoints.len())
        .map(|i| resolve_tangent(waypoints, i))
        .collect();

    Ok(waypoints
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let chord_m = (pair[1].position_m - pair[0].position_m).norm();
            (
                Knot::from_waypoint(&pair[0], tangents[i], chord_m),
                Knot::from_waypoint(&pair[1], tangents[i + 1], chord_m),
            )
        })
        .collect())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Tangent direction of waypoint `i`, defaulting as described on
/// `Waypoint::tangent_rad`.
fn resolve_tangent(waypoints: &[Waypoint], i: usize) -> f64 {
    if let Some(t) = waypoints[i].tangent_rad {
        return t;
    }

    let last = waypoints.len() - 1;
    let (from, to) = if i == 0 {
        (0, 1)
    } else if i == last {
        (last - 1, last)
    } else {
        (i - 1, i + 1)
    };

    vec2::angle(&(waypoints[to].position_m - waypoints[from].position_m))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_knot_pairs() {
        let wps = vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(3.0, 4.0, std::f64::consts::FRAC_PI_2).with_curvature(0.5),
        ];

        let pairs = knot_pairs(&wps).unwrap();
        assert_eq!(pairs.len(), 1);

        let (k0, k1) = pairs[0];
        assert!((k0.deriv - Vector2::new(5.0, 0.0)).norm() < 1e-12);
        assert!((k1.deriv - Vector2::new(0.0, 5.0)).norm() < 1e-12);
        assert!(k0.second_deriv.is_none());

        // Normal of a +y tangent is -x, scaled by k * chord^2
        let d2 = k1.second_deriv.unwrap();
        assert!((d2 - Vector2::new(-12.5, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_default_tangents() {
        let mut wps = vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(1.0, 1.0, 0.0),
            Waypoint::new(2.0, 0.0, 0.0),
        ];
        for wp in wps.iter_mut() {
            wp.tangent_rad = None;
        }

        assert!((resolve_tangent(&wps, 0) - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert!(resolve_tangent(&wps, 1).abs() < 1e-12);
        assert!((resolve_tangent(&wps, 2) + std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_waypoints() {
        assert_eq!(
            knot_pairs(&[Waypoint::new(0.0, 0.0, 0.0)]),
            Err(PathError::NotEnoughWaypoints(1))
        );
        assert_eq!(
            knot_pairs(&[
                Waypoint::new(0.0, 0.0, 0.0),
                Waypoint::new(1.0, 0.0, 0.0),
                Waypoint::new(1.0, 0.0, 0.0)
            ]),
            Err(PathError::CoincidentKnots(1, 2))
        );
    }
}
