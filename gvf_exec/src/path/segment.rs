//! # Path segments
//!
//! A polynomial segment together with its arc table, evaluated in the arc
//! length domain.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{ArcParams, ArcTable, PathError, PolySegment};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of Newton-like iterations used when projecting onto a curve.
pub const PROJECT_ITERATIONS: usize = 10;

/// Segments shorter than this are rejected, since `dt/ds` is unbounded.
const MIN_SEGMENT_LENGTH_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One segment of a path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSegment {
    curve: PolySegment,
    arcs: ArcTable,

    /// Speed limit applying to the whole segment
    speed_limit_ms: Option<f64>,
}

/// Position and unit-speed derivatives of a curve at one arc length.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SegmentDerivs {
    pub position: Vector2<f64>,
    pub deriv: Vector2<f64>,
    pub second_deriv: Vector2<f64>,
    pub third_deriv: Vector2<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Order of a derivative with respect to arc length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Position,
    First,
    Second,
    Third,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Order {
    /// The order for a derivative count, if supported.
    pub fn from_index(n: usize) -> Result<Self, PathError> {
        match n {
            0 => Ok(Order::Position),
            1 => Ok(Order::First),
            2 => Ok(Order::Second),
            3 => Ok(Order::Third),
            _ => Err(PathError::UnsupportedDerivative(n)),
        }
    }
}

impl SegmentDerivs {
    pub fn get(&self, order: Order) -> Vector2<f64> {
        match order {
            Order::Position => self.position,
            Order::First => self.deriv,
            Order::Second => self.second_deriv,
            Order::Third => self.third_deriv,
        }
    }
}

impl PathSegment {
    /// Parametrise a curve by arc length.
    pub fn new(
        curve: PolySegment,
        params: &ArcParams,
        speed_limit_ms: Option<f64>,
    ) -> Result<Self, PathError> {
        params.validate()?;

        let arcs = ArcTable::build(&curve, params);

        if !(arcs.length() >= MIN_SEGMENT_LENGTH_M) {
            return Err(PathError::DegenerateSegment);
        }

        Ok(Self {
            curve,
            arcs,
            speed_limit_ms,
        })
    }

    pub fn length(&self) -> f64 {
        self.arcs.length()
    }

    pub fn curve(&self) -> &PolySegment {
        &self.curve
    }

    pub fn arcs(&self) -> &ArcTable {
        &self.arcs
    }

    pub fn speed_limit_ms(&self) -> Option<f64> {
        self.speed_limit_ms
    }

    /// Curve parameter at local arc length `s`.
    pub fn t_at(&self, s: f64) -> f64 {
        self.arcs.t_at(s)
    }

    /// Curvature at local arc length `s`, read from the arc table.
    pub fn curvature(&self, s: f64) -> f64 {
        self.arcs.curvature_at(s)
    }

    /// Position and derivatives with respect to arc length at local arc
    /// length `s`.
    ///
    /// The `t` derivatives are chain-ruled using t' = 1/|r'(t)| and its
    /// derivatives t'' and t'''.
    pub fn derivs(&self, s: f64) -> SegmentDerivs {
        let t = self.t_at(s);

        let d1 = self.curve.get(t, 1);
        let d2 = self.curve.get(t, 2);
        let d3 = self.curve.get(t, 3);

        let speed = d1.norm();
        let d1_d2 = d1.dot(&d2);

        let t1 = 1.0 / speed;
        let t2 = -d1_d2 / speed.powi(4);
        let t3 = 4.0 * d1_d2 * d1_d2 / speed.powi(7)
            - (d2.norm_squared() + d1.dot(&d3)) / speed.powi(5);

        SegmentDerivs {
            position: self.curve.get(t, 0),
            deriv: d1 * t1,
            second_deriv: d2 * (t1 * t1) + d1 * t2,
            third_deriv: d3 * t1.powi(3) + d2 * (3.0 * t1 * t2) + d1 * t3,
        }
    }

    /// Local arc length of the point on this segment nearest `point`,
    /// iterating from `guess`.
    pub fn project(&self, point: &Vector2<f64>, guess: f64) -> f64 {
        let length = self.length();
        let mut s = guess.max(0.0).min(length);

        for _ in 0..PROJECT_ITERATIONS {
            let d = self.derivs(s);
            s = (s + (point - d.position).dot(&d.deriv)).max(0.0).min(length);
        }

        s
    }

    /// Local arc length of the arc start nearest `point`, used to seed a
    /// projection.
    pub fn coarse_nearest(&self, point: &Vector2<f64>) -> f64 {
        self.arcs
            .iter_starts()
            .map(|(s, arc)| (s, (arc.start - point).norm_squared()))
            .fold((0.0, std::f64::INFINITY), |best, cand| {
                if cand.1 < best.1 {
                    cand
                } else {
                    best
                }
            })
            .0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::Knot;

    fn curve() -> PolySegment {
        PolySegment::fit(
            &Knot::new(Vector2::new(0.0, 0.0), Vector2::new(8.0, 0.0)),
            &Knot::new(Vector2::new(6.0, 4.0), Vector2::new(0.0, 8.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_unit_speed_derivs() {
        let seg = PathSegment::new(curve(), &ArcParams::default(), None).unwrap();

        for i in 0..=20 {
            let s = seg.length() * i as f64 / 20.0;
            let d = seg.derivs(s);

            assert!((d.deriv.norm() - 1.0).abs() < 1e-9);

            // Unit speed means acceleration is purely normal
            assert!(d.deriv.dot(&d.second_deriv).abs() < 1e-9);
        }
    }

    #[test]
    fn test_derivs_match_curvature() {
        let seg = PathSegment::new(curve(), &ArcParams::default(), None).unwrap();

        for i in 0..=20 {
            let s = seg.length() * i as f64 / 20.0;
            let t = seg.t_at(s);
            let k = seg.curve().curvature(t);
            let d = seg.derivs(s);

            // |r''| is the magnitude of the curvature at the same t
            assert!((d.second_deriv.norm() - k.abs()).abs() < 1e-9);

            // Differentiating r' . r'' = 0 gives r' . r''' = -k^2
            assert!((d.deriv.dot(&d.third_deriv) + k * k).abs() < 1e-9);
        }
    }

    #[test]
    fn test_order_from_index() {
        assert_eq!(Order::from_index(2), Ok(Order::Second));
        assert_eq!(Order::from_index(4), Err(PathError::UnsupportedDerivative(4)));
    }
}
