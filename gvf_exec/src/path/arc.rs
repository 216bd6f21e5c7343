//! # Circular arcs
//!
//! A three point circular arc approximating a small piece of a polynomial
//! segment. If the three points are collinear the arc degenerates to a
//! straight line.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix2, Vector2};
use serde::Serialize;

// Internal
use crate::vec2;
use util::maths::sign;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Determinant magnitude of the circle fitting system below which the points
/// are treated as collinear.
pub const COLLINEAR_DET_LIMIT: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An arc through three points on a curve, covering `t` in
/// [`t_start`, `t_end`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arc {
    /// First point on the arc
    pub start: Vector2<f64>,

    /// Last point on the arc
    pub end: Vector2<f64>,

    /// Center of the circle, or the start point for a line.
    center: Vector2<f64>,

    /// Signed curvature of the circle, zero for a line.
    curvature: f64,

    /// Angle of `start` about the center, or the direction of a line.
    angle_offset_rad: f64,

    /// Arc length from start to end
    length: f64,

    /// Curve parameter at the start point
    pub t_start: f64,

    /// Curve parameter at the end point
    pub t_end: f64,

    /// Curve curvature at the start point
    k_start: f64,

    /// Rate of change of curve curvature along the arc
    dk_ds: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Arc {
    /// Fit an arc through three points.
    ///
    /// The center `c` satisfies |s - c| = |m - c| = |e - c|, which gives a
    /// 2x2 linear system. When its determinant is zero the points are
    /// collinear and a straight line from start to end is used instead.
    pub fn from_points(
        start: Vector2<f64>,
        mid: Vector2<f64>,
        end: Vector2<f64>,
        t_start: f64,
        t_end: f64,
    ) -> Self {
        let coeffs = Matrix2::new(
            2.0 * (start[0] - end[0]),
            2.0 * (start[1] - end[1]),
            2.0 * (start[0] - mid[0]),
            2.0 * (start[1] - mid[1]),
        );
        let rhs = Vector2::new(
            start.norm_squared() - end.norm_squared(),
            start.norm_squared() - mid.norm_squared(),
        );

        let center = if coeffs.determinant().abs() < COLLINEAR_DET_LIMIT {
            None
        } else {
            coeffs.try_inverse().map(|inv| inv * rhs)
        };

        match center {
            Some(center) => {
                let to_start = start - center;
                let radius = to_start.norm();

                // Summing the two halves keeps each atan2 well inside (-pi, pi]
                let sweep_rad = vec2::signed_angle(&to_start, &(mid - center))
                    + vec2::signed_angle(&(mid - center), &(end - center));

                Self {
                    start,
                    end,
                    center,
                    curvature: sign(sweep_rad) / radius,
                    angle_offset_rad: vec2::angle(&to_start),
                    length: sweep_rad.abs() * radius,
                    t_start,
                    t_end,
                    k_start: 0.0,
                    dk_ds: 0.0,
                }
            }
            None => Self::line(start, end, t_start, t_end),
        }
    }

    /// A straight line arc from start to end.
    pub fn line(start: Vector2<f64>, end: Vector2<f64>, t_start: f64, t_end: f64) -> Self {
        Self {
            start,
            end,
            center: start,
            curvature: 0.0,
            angle_offset_rad: vec2::angle(&(end - start)),
            length: (end - start).norm(),
            t_start,
            t_end,
            k_start: 0.0,
            dk_ds: 0.0,
        }
    }

    /// Set the curve curvature at either end, interpolated linearly along
    /// the arc by `curvature_at`.
    pub fn set_curvature(&mut self, k_start: f64, k_end: f64) {
        self.k_start = k_start;
        self.dk_ds = if self.length > 0.0 {
            (k_end - k_start) / self.length
        } else {
            0.0
        };
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Curvature of the fitted circle, zero for a line.
    pub fn circle_curvature(&self) -> f64 {
        self.curvature
    }

    pub fn is_line(&self) -> bool {
        self.curvature == 0.0
    }

    /// Interpolated curve curvature at arc length `s` from the arc start.
    pub fn curvature_at(&self, s: f64) -> f64 {
        self.k_start + self.dk_ds * s
    }

    /// Curve parameter at arc length `s` from the arc start.
    ///
    /// The angle swept about the center is proportional to the length
    /// travelled, so the fraction of the sweep gives the fraction of the
    /// `t` span.
    pub fn t_at(&self, s: f64) -> f64 {
        if self.length <= 0.0 {
            return self.t_start;
        }

        let fraction = (s / self.length).max(0.0).min(1.0);

        self.t_start + (self.t_end - self.t_start) * fraction
    }

    /// Point on the arc at arc length `s` from the arc start.
    pub fn point_at(&self, s: f64) -> Vector2<f64> {
        if self.is_line() {
            self.center + vec2::from_polar(s, self.angle_offset_rad)
        } else {
            self.center
                + vec2::from_polar(
                    1.0 / self.curvature.abs(),
                    self.angle_offset_rad + s * self.curvature,
                )
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_collinear_points() {
        let arc = Arc::from_points(
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 2.0),
            0.0,
            1.0,
        );

        assert!(arc.is_line());
        assert_eq!(arc.circle_curvature(), 0.0);
        assert!((arc.length() - 8f64.sqrt()).abs() < 1e-12);
        assert!(!arc.t_at(1.0).is_nan());
        assert!((arc.t_at(arc.length() / 2.0) - 0.5).abs() < 1e-12);
        assert!((arc.point_at(arc.length()) - Vector2::new(2.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_coincident_points() {
        let p = Vector2::new(3.0, -1.0);
        let arc = Arc::from_points(p, p, p, 0.2, 0.4);

        assert!(arc.is_line());
        assert_eq!(arc.length(), 0.0);
        assert_eq!(arc.t_at(0.0), 0.2);
        assert!(!arc.point_at(0.0)[0].is_nan());
    }

    #[test]
    fn test_quarter_circle() {
        // Counter clockwise quarter of the unit circle
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let arc = Arc::from_points(
            Vector2::new(1.0, 0.0),
            Vector2::new(h, h),
            Vector2::new(0.0, 1.0),
            0.0,
            1.0,
        );

        assert!((arc.circle_curvature() - 1.0).abs() < 1e-9);
        assert!((arc.length() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert!((arc.point_at(arc.length() / 2.0) - Vector2::new(h, h)).norm() < 1e-9);
        assert!((arc.t_at(arc.length() / 4.0) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_clockwise_arc() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let arc = Arc::from_points(
            Vector2::new(0.0, 1.0),
            Vector2::new(h, h),
            Vector2::new(1.0, 0.0),
            0.0,
            1.0,
        );

        assert!((arc.circle_curvature() + 1.0).abs() < 1e-9);
        assert!((arc.point_at(arc.length()) - Vector2::new(1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_t_at_maps_sweep_to_span() {
        // Clockwise, so the curvature is negative
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let arc = Arc::from_points(
            Vector2::new(0.0, 1.0),
            Vector2::new(h, h),
            Vector2::new(1.0, 0.0),
            0.4,
            0.6,
        );

        assert!((arc.t_at(arc.length() / 2.0) - 0.5).abs() < 1e-9);
        assert!((arc.t_at(arc.length() * 0.75) - 0.55).abs() < 1e-9);

        // Outside the arc the parameter is held at the ends of the span
        assert_eq!(arc.t_at(-1.0), 0.4);
        assert!((arc.t_at(arc.length() + 1.0) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_curvature_interpolation() {
        let mut arc = Arc::line(Vector2::new(0.0, 0.0), Vector2::new(2.0, 0.0), 0.0, 1.0);
        arc.set_curvature(0.1, 0.3);

        assert!((arc.curvature_at(1.0) - 0.2).abs() < 1e-12);
    }
}
