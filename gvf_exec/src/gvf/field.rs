//! # Guiding vector field

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use super::{ErrorMap, ErrorMapping, GvfError};
use crate::path::Path;
use crate::vec2;
use drive_if::Pose;
use util::maths::{angle_wrap, sign, EPSILON};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Smallest magnitude of the projection derivative denominator.
pub const SINGULAR_PROJECTION_LIMIT: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A guiding vector field around a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuidingVectorField {
    /// Convergence gain. Larger values turn towards the path more sharply.
    pub k_n: f64,

    #[serde(default)]
    pub error_map: ErrorMap,
}

/// The field at one point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GvfResult {
    /// Unit direction of the field
    pub vector: Vector2<f64>,

    /// Derivative of `vector` with respect to distance travelled along it
    pub deriv: Vector2<f64>,

    /// Rate of change of the projected arc length with respect to distance
    /// travelled along the field
    pub proj_deriv: f64,

    /// Signed cross track error, positive when the point is left of the path
    pub error: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GuidingVectorField {
    pub fn new(k_n: f64, error_map: ErrorMap) -> Result<Self, GvfError> {
        let field = Self { k_n, error_map };
        field.validate()?;
        Ok(field)
    }

    pub fn validate(&self) -> Result<(), GvfError> {
        if !self.k_n.is_finite() || self.k_n < 0.0 {
            return Err(GvfError::InvalidGain(self.k_n));
        }
        self.error_map.validate()
    }

    /// Evaluate the field at `point`, whose projection onto the path is at
    /// arc length `s`.
    ///
    /// The derivative is found in closed form. Moving along the field at unit
    /// speed changes the projection at rate
    ///
    ///   ds/dx = (u . t) / (1 - (p - r) . r'')
    ///
    /// and the cross track error at rate u . n. The denominator vanishes at
    /// the centre of curvature of the path, and grows small far from the
    /// path on sharp curves. This is reported rather than clamped.
    pub fn get(&self, path: &Path, s: f64, point: &Vector2<f64>) -> Result<GvfResult, GvfError> {
        let path_point = path.point(s).vec;
        let tangent = path.deriv(s).vec;
        let second_deriv = path.second_deriv(s).vec;

        if !(tangent.norm() > EPSILON) {
            return Err(GvfError::ZeroDirection(s));
        }

        let normal = vec2::perp(&tangent);
        let displacement = path_point - point;
        let error = displacement.norm() * sign(vec2::cross(&displacement, &tangent));

        let weight = self.k_n * self.error_map.map(error);
        let vector = tangent - normal * weight;
        let norm = vector.norm();
        let unit = vector / norm;

        let denom = 1.0 - (point - path_point).dot(&second_deriv);
        if denom.abs() < SINGULAR_PROJECTION_LIMIT {
            return Err(GvfError::SingularProjection(denom));
        }
        let proj_deriv = unit.dot(&tangent) / denom;

        let error_deriv = unit.dot(&normal);
        let tangent_deriv = second_deriv * proj_deriv;
        let normal_deriv = vec2::perp(&tangent_deriv);
        let vector_deriv = tangent_deriv
            - normal_deriv * weight
            - normal * (self.k_n * self.error_map.deriv(error) * error_deriv);

        // d/dx (v / |v|) = (v' (v . v) - v (v . v')) / |v|^3
        let deriv = (vector_deriv * vector.dot(&vector) - vector * vector.dot(&vector_deriv))
            / (norm * norm * norm);

        Ok(GvfResult {
            vector: unit,
            deriv,
            proj_deriv,
            error,
        })
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Whether a robot at `pose`, projecting to arc length `s`, has completed
/// the path.
///
/// Requires the remaining arc length and the distance to the end of the path
/// to both be below `epsilon_m`, and if `theta_epsilon_rad` is given the
/// heading error to the path heading to be below it.
pub fn is_finished(
    path: &Path,
    s: f64,
    pose: &Pose,
    epsilon_m: f64,
    theta_epsilon_rad: Option<f64>,
) -> bool {
    let end = path.end();

    let heading_ok = theta_epsilon_rad.map_or(true, |theta_epsilon| {
        angle_wrap(path.point(s).heading - pose.heading_rad).abs() < theta_epsilon
    });

    path.length() - s < epsilon_m && (pose.position_m - end.vec).norm() < epsilon_m && heading_ok
}

/// Rate and acceleration of the projection of a point moving with `vel` and
/// `accel` onto the path, where the point currently projects to `s`.
///
/// Found by differentiating (p - r(s)) . r'(s) = 0 twice in time:
///
///   ds/dt   = (v . t) / D
///   d2s/dt2 = (a . t + 2 ds/dt (v . r2) + (ds/dt)^2 (p - r) . r3) / D
///
/// with D = 1 - (p - r) . r2, where r2 and r3 are the second and third
/// derivatives of the path.
pub fn projection_rates(
    path: &Path,
    s: f64,
    point: &Vector2<f64>,
    vel: &Vector2<f64>,
    accel: &Vector2<f64>,
) -> Result<(f64, f64), GvfError> {
    let offset = point - path.point(s).vec;
    let tangent = path.deriv(s).vec;
    let second_deriv = path.second_deriv(s).vec;
    let third_deriv = path.third_deriv(s).vec;

    let denom = 1.0 - offset.dot(&second_deriv);
    if denom.abs() < SINGULAR_PROJECTION_LIMIT {
        return Err(GvfError::SingularProjection(denom));
    }

    let s_dot = vel.dot(&tangent) / denom;
    let s_ddot = (accel.dot(&tangent)
        + 2.0 * s_dot * vel.dot(&second_deriv)
        + s_dot * s_dot * offset.dot(&third_deriv))
        / denom;

    Ok((s_dot, s_ddot))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::{ArcParams, HeadingInterp, Waypoint};

    fn straight() -> Path {
        Path::from_waypoints(
            &[Waypoint::new(0.0, 0.0, 0.0), Waypoint::new(10.0, 0.0, 0.0)],
            HeadingInterp::default(),
            &ArcParams::default(),
        )
        .unwrap()
    }

    fn curved() -> Path {
        Path::from_waypoints(
            &[
                Waypoint::new(0.0, 0.0, 0.0),
                Waypoint::new(6.0, 3.0, std::f64::consts::FRAC_PI_4),
            ],
            HeadingInterp::default(),
            &ArcParams::default(),
        )
        .unwrap()
    }

    fn angle_to_tangent(field: &GuidingVectorField, path: &Path, point: Vector2<f64>) -> f64 {
        let s = path.nearest(&point).unwrap();
        let r = field.get(path, s, &point).unwrap();
        vec2::signed_angle(&path.deriv(s).vec, &r.vector)
    }

    #[test]
    fn test_on_path_follows_tangent() {
        let path = curved();
        let field = GuidingVectorField::new(2.0, ErrorMap::Linear).unwrap();

        let s = 3.0;
        let r = field.get(&path, s, &path.point(s).vec).unwrap();
        assert_eq!(r.error, 0.0);
        assert!((r.vector - path.deriv(s).vec).norm() < 1e-12);
        assert!((r.proj_deriv - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_error_sign() {
        let path = straight();
        let field = GuidingVectorField::new(1.0, ErrorMap::Linear).unwrap();

        // Left of the path the field turns right, towards the path
        let left = field.get(&path, 3.0, &Vector2::new(3.0, 2.0)).unwrap();
        assert!((left.error - 2.0).abs() < 1e-9);
        assert!(left.vector[1] < 0.0);

        let right = field.get(&path, 3.0, &Vector2::new(3.0, -2.0)).unwrap();
        assert!((right.error + 2.0).abs() < 1e-9);
        assert!(right.vector[1] > 0.0);
    }

    #[test]
    fn test_convergence() {
        let path = straight();
        let map = ErrorMap::Arctan {
            power: 1.0,
            stretch: 4.0,
        };
        let field = GuidingVectorField::new(1.0, map).unwrap();

        // The angle to the tangent shrinks as the point approaches the path
        let mut last = std::f64::INFINITY;
        for &y in [3.0, 2.0, 1.0, 0.5, 0.1].iter() {
            let angle = angle_to_tangent(&field, &path, Vector2::new(4.0, y)).abs();
            assert!(angle < last);
            last = angle;
        }

        // A larger gain turns further towards the path
        let point = Vector2::new(4.0, 1.0);
        let mut last = 0.0;
        for &k_n in [0.25, 0.5, 1.0, 2.0, 4.0].iter() {
            let field = GuidingVectorField::new(k_n, map).unwrap();
            let angle = -angle_to_tangent(&field, &path, point);
            assert!(angle > last);
            last = angle;
        }
    }

    #[test]
    fn test_derivative_matches_difference() {
        let path = curved();
        let maps = [
            ErrorMap::Linear,
            ErrorMap::DampedPower {
                power: 2.0,
                stretch: 0.5,
            },
        ];

        for map in maps.iter() {
            let field = GuidingVectorField::new(1.5, *map).unwrap();

            for &(s0, offset) in [(2.0, 0.3), (4.0, -0.25)].iter() {
                let normal = vec2::perp(&path.deriv(s0).vec);
                let point = path.point(s0).vec + normal * offset;
                let s = path.project(&point, s0);

                let r = field.get(&path, s, &point).unwrap();

                let h = 1e-5;
                let next = point + r.vector * h;
                let s_next = path.project(&next, s);
                let r_next = field.get(&path, s_next, &next).unwrap();

                let fd = (r_next.vector - r.vector) / h;
                assert!(
                    (fd - r.deriv).norm() < 1e-3,
                    "{:?}: {} vs {}",
                    map,
                    fd,
                    r.deriv
                );

                // Arc lengths carry the arc table's small approximation error
                let fd_s = (s_next - s) / h;
                assert!((fd_s - r.proj_deriv).abs() < 0.05 * r.proj_deriv.abs());
            }
        }
    }

    #[test]
    fn test_singular_projection() {
        let path = curved();
        let field = GuidingVectorField::new(1.0, ErrorMap::Linear).unwrap();

        // The centre of curvature, where (p - r) . r'' = 1
        let s = 2.0;
        let r2 = path.second_deriv(s).vec;
        let centre = path.point(s).vec + r2 / r2.norm_squared();

        match field.get(&path, s, &centre) {
            Err(GvfError::SingularProjection(_)) => (),
            r => panic!("Expected a singular projection, got {:?}", r),
        }
    }

    #[test]
    fn test_invalid_field() {
        assert_eq!(
            GuidingVectorField::new(-1.0, ErrorMap::Linear),
            Err(GvfError::InvalidGain(-1.0))
        );
        assert!(GuidingVectorField::new(
            1.0,
            ErrorMap::Arctan {
                power: 1.0,
                stretch: -1.0
            }
        )
        .is_err());
    }

    #[test]
    fn test_is_finished() {
        let path = straight();
        let end = path.length();

        assert!(is_finished(&path, end, &Pose::new(10.0, 0.0, 0.0), 0.01, None));
        assert!(!is_finished(&path, end - 0.5, &Pose::new(9.5, 0.0, 0.0), 0.01, None));

        // At the end but off to the side
        assert!(!is_finished(&path, end, &Pose::new(10.0, 0.1, 0.0), 0.01, None));

        // Heading check only applies when asked for
        let turned = Pose::new(10.0, 0.0, 0.5);
        assert!(is_finished(&path, end, &turned, 0.01, None));
        assert!(!is_finished(&path, end, &turned, 0.01, Some(0.1)));
    }

    #[test]
    fn test_projection_rates_match_difference() {
        let path = curved();
        let field = GuidingVectorField::new(1.0, ErrorMap::Linear).unwrap();

        let s0 = 3.0;
        let normal = vec2::perp(&path.deriv(s0).vec);
        let p0 = path.point(s0).vec + normal * 0.5;
        let vel = Vector2::new(1.0, 0.4);
        let accel = Vector2::new(-0.3, 0.8);

        let s = path.project(&p0, s0);
        let (s_dot, s_ddot) = projection_rates(&path, s, &p0, &vel, &accel).unwrap();

        // Along the field's own direction the rate is the projection
        // derivative
        let r = field.get(&path, s, &p0).unwrap();
        let (s_dot_field, _) =
            projection_rates(&path, s, &p0, &r.vector, &Vector2::zeros()).unwrap();
        assert!((s_dot_field - r.proj_deriv).abs() < 1e-9);

        // Central differences of the projection along the trajectory
        let h = 1e-2;
        let at = |t: f64| path.project(&(p0 + vel * t + accel * (0.5 * t * t)), s);
        let (s_prev, s_next) = (at(-h), at(h));

        let fd_dot = (s_next - s_prev) / (2.0 * h);
        let fd_ddot = (s_next - 2.0 * s + s_prev) / (h * h);

        assert!((fd_dot - s_dot).abs() < 0.02 * s_dot.abs(), "{} vs {}", fd_dot, s_dot);
        assert!(
            (fd_ddot - s_ddot).abs() < 0.03 * s_ddot.abs(),
            "{} vs {}",
            fd_ddot,
            s_ddot
        );
    }
}
