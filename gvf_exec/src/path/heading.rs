//! # Heading interpolation
//!
//! An omnidirectional robot does not have to face along the path. The
//! heading interpolator decides which way it faces at each point, and
//! supplies the heading together with its arc-length derivatives so that
//! the two can never disagree.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use super::SegmentDerivs;
use crate::vec2;
use util::maths::{angle_wrap, lin_map};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Heading and its first two derivatives with respect to arc length.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HeadingDerivs {
    pub heading_rad: f64,
    pub deriv: f64,
    pub second_deriv: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A heading policy along a path.
pub trait HeadingInterpolator {
    /// Evaluate the heading at global arc length `s` on a path of
    /// `path_length`, given the unit-speed curve derivatives at that point.
    fn heading(&self, s: f64, path_length: f64, curve: &SegmentDerivs) -> HeadingDerivs;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The available heading policies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HeadingInterp {
    /// Face along the path tangent, plus a constant offset (pi to drive
    /// backwards).
    Tangent {
        #[serde(default)]
        offset_rad: f64,
    },

    /// Hold a single heading for the whole path.
    Constant { heading_rad: f64 },

    /// Turn at a constant rate per metre from one heading to another, taking
    /// the shortest way round.
    Linear { start_rad: f64, end_rad: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for HeadingInterp {
    fn default() -> Self {
        HeadingInterp::Tangent { offset_rad: 0.0 }
    }
}

impl HeadingInterpolator for HeadingInterp {
    fn heading(&self, s: f64, path_length: f64, curve: &SegmentDerivs) -> HeadingDerivs {
        match *self {
            HeadingInterp::Tangent { offset_rad } => tangent_heading(curve, offset_rad),
            HeadingInterp::Constant { heading_rad } => HeadingDerivs {
                heading_rad: angle_wrap(heading_rad),
                deriv: 0.0,
                second_deriv: 0.0,
            },
            HeadingInterp::Linear { start_rad, end_rad } => {
                let delta_rad = angle_wrap(end_rad - start_rad);

                if path_length <= 0.0 {
                    return HeadingDerivs {
                        heading_rad: angle_wrap(start_rad),
                        ..Default::default()
                    };
                }

                HeadingDerivs {
                    heading_rad: angle_wrap(lin_map(
                        (0.0, path_length),
                        (start_rad, start_rad + delta_rad),
                        s,
                    )),
                    deriv: delta_rad / path_length,
                    second_deriv: 0.0,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// For a unit-speed curve the heading rate is the curvature r' x r'', and its
/// derivative reduces to r' x r''' since r'' x r'' vanishes.
fn tangent_heading(curve: &SegmentDerivs, offset_rad: f64) -> HeadingDerivs {
    let d1: &Vector2<f64> = &curve.deriv;

    HeadingDerivs {
        heading_rad: angle_wrap(vec2::angle(d1) + offset_rad),
        deriv: vec2::cross(d1, &curve.second_deriv),
        second_deriv: vec2::cross(d1, &curve.third_deriv),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    fn turning_left() -> SegmentDerivs {
        // Unit speed along +y, curving left with k = 0.5, k' = 0.1
        SegmentDerivs {
            position: Vector2::new(1.0, 1.0),
            deriv: Vector2::new(0.0, 1.0),
            second_deriv: Vector2::new(-0.5, 0.0),
            third_deriv: Vector2::new(-0.1, -0.25),
        }
    }

    #[test]
    fn test_tangent_heading() {
        let h = HeadingInterp::default().heading(0.0, 10.0, &turning_left());
        assert!((h.heading_rad - PI / 2.0).abs() < 1e-12);
        assert!((h.deriv - 0.5).abs() < 1e-12);
        assert!((h.second_deriv - 0.1).abs() < 1e-12);

        let rev = HeadingInterp::Tangent { offset_rad: PI }.heading(0.0, 10.0, &turning_left());
        assert!((rev.heading_rad + PI / 2.0).abs() < 1e-12);
        assert_eq!(rev.deriv, h.deriv);
    }

    #[test]
    fn test_constant_heading() {
        let h = HeadingInterp::Constant { heading_rad: 0.3 }.heading(4.0, 10.0, &turning_left());
        assert!((h.heading_rad - 0.3).abs() < 1e-12);
        assert_eq!(h.deriv, 0.0);
        assert_eq!(h.second_deriv, 0.0);
    }

    #[test]
    fn test_linear_heading_short_way() {
        // From just below pi to just above -pi is a short turn through pi
        let interp = HeadingInterp::Linear {
            start_rad: PI - 0.1,
            end_rad: -PI + 0.1,
        };

        let mid = interp.heading(5.0, 10.0, &turning_left());
        assert!((mid.heading_rad.abs() - PI).abs() < 1e-9);
        assert!((mid.deriv - 0.02).abs() < 1e-12);

        let end = interp.heading(10.0, 10.0, &turning_left());
        assert!((end.heading_rad - (-PI + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_deserialise() {
        let h: HeadingInterp = util::params::load_from_str(
            "type = \"Linear\"\nstart_rad = 0.0\nend_rad = 1.0",
        )
        .unwrap();
        assert_eq!(
            h,
            HeadingInterp::Linear {
                start_rad: 0.0,
                end_rad: 1.0
            }
        );

        let t: HeadingInterp = util::params::load_from_str("type = \"Tangent\"").unwrap();
        assert_eq!(t, HeadingInterp::default());
    }
}
