//! # 2D vector helpers
//!
//! Small operations on `nalgebra::Vector2` which the geometry code needs
//! everywhere.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Z component of the cross product of two planar vectors.
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

/// Rotate a vector by `angle_rad` about Z+.
pub fn rotate(v: &Vector2<f64>, angle_rad: f64) -> Vector2<f64> {
    let (sin, cos) = angle_rad.sin_cos();
    Vector2::new(v[0] * cos - v[1] * sin, v[0] * sin + v[1] * cos)
}

/// Rotate a vector by +90 degrees.
pub fn perp(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v[1], v[0])
}

/// Build a vector from a magnitude and an angle.
pub fn from_polar(mag: f64, angle_rad: f64) -> Vector2<f64> {
    let (sin, cos) = angle_rad.sin_cos();
    Vector2::new(mag * cos, mag * sin)
}

/// Angle of a vector to the X+ axis, in (-pi, pi].
pub fn angle(v: &Vector2<f64>) -> f64 {
    v[1].atan2(v[0])
}

/// Signed angle needed to rotate `a` onto `b`, in (-pi, pi].
pub fn signed_angle(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    cross(a, b).atan2(a.dot(b))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rotate_perp() {
        let v = Vector2::new(1.0, 2.0);
        let r = rotate(&v, std::f64::consts::FRAC_PI_2);
        let p = perp(&v);
        assert!((r - p).norm() < 1e-12);
        assert!((rotate(&v, -0.3) - rotate(&rotate(&v, 0.2), -0.5)).norm() < 1e-12);
    }

    #[test]
    fn test_signed_angle() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, -3.0);
        assert!((signed_angle(&a, &b) + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((cross(&a, &b) + 3.0).abs() < 1e-12);
    }
}
