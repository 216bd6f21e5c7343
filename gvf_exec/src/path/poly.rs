//! # Polynomial segments
//!
//! Each axis of a segment is a polynomial in `t` whose coefficients are
//! solved from the boundary conditions at both knots. The boundary condition
//! matrices are constant, so the solve is exact and needs no iteration.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Matrix4, Matrix6, Vector2, Vector4, Vector6};
use serde::Serialize;

// Internal
use super::{Knot, PathError};
use crate::vec2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A polynomial with coefficients stored lowest power first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

/// A planar curve made of one polynomial per axis, parametrised by `t` in
/// [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolySegment {
    x: Polynomial,
    y: Polynomial,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Polynomial {
    pub fn new(coeffs: Vec<f64>) -> Self {
        Self { coeffs }
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Value of the `n`th derivative at `t`.
    pub fn get(&self, t: f64, n: usize) -> f64 {
        // Horner's method over the differentiated coefficients
        self.coeffs
            .iter()
            .enumerate()
            .skip(n)
            .rev()
            .fold(0.0, |acc, (i, c)| acc * t + c * falling_factorial(i, n))
    }
}

impl PolySegment {
    /// Fit a segment between two knots.
    ///
    /// A cubic Hermite is used unless either knot has a second derivative, in
    /// which case a quintic is used with the missing second derivative taken
    /// as zero.
    pub fn fit(start: &Knot, end: &Knot) -> Result<Self, PathError> {
        match (start.second_deriv, end.second_deriv) {
            (None, None) => Self::fit_cubic(start, end),
            (s, e) => Self::fit_quintic(
                start,
                end,
                s.unwrap_or_else(Vector2::zeros),
                e.unwrap_or_else(Vector2::zeros),
            ),
        }
    }

    /// Position (`n = 0`) or `n`th derivative with respect to `t`.
    pub fn get(&self, t: f64, n: usize) -> Vector2<f64> {
        Vector2::new(self.x.get(t, n), self.y.get(t, n))
    }

    /// Signed curvature at `t`, positive when turning left.
    pub fn curvature(&self, t: f64) -> f64 {
        let d1 = self.get(t, 1);
        let d2 = self.get(t, 2);

        vec2::cross(&d1, &d2) / d1.norm().powi(3)
    }

    pub fn degree(&self) -> usize {
        self.x.degree().max(self.y.degree())
    }

    fn fit_cubic(start: &Knot, end: &Knot) -> Result<Self, PathError> {
        // Rows: p(0), p'(0), p(1), p'(1)
        #[rustfmt::skip]
        let lu = Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            1.0, 1.0, 1.0, 1.0,
            0.0, 1.0, 2.0, 3.0,
        ).lu();

        let solve = |b: Vector4<f64>| {
            lu.solve(&b)
                .map(|c| Polynomial::new(c.iter().copied().collect()))
                .ok_or(PathError::SingularFit)
        };
        let axis = |i: usize| {
            Vector4::new(start.position[i], start.deriv[i], end.position[i], end.deriv[i])
        };

        Ok(Self {
            x: solve(axis(0))?,
            y: solve(axis(1))?,
        })
    }

    fn fit_quintic(
        start: &Knot,
        end: &Knot,
        start_second: Vector2<f64>,
        end_second: Vector2<f64>,
    ) -> Result<Self, PathError> {
        // Rows: p(0), p'(0), p''(0), p(1), p'(1), p''(1)
        #[rustfmt::skip]
        let lu = Matrix6::new(
            1.0, 0.0, 0.0, 0.0,  0.0,  0.0,
            0.0, 1.0, 0.0, 0.0,  0.0,  0.0,
            0.0, 0.0, 2.0, 0.0,  0.0,  0.0,
            1.0, 1.0, 1.0, 1.0,  1.0,  1.0,
            0.0, 1.0, 2.0, 3.0,  4.0,  5.0,
            0.0, 0.0, 2.0, 6.0, 12.0, 20.0,
        ).lu();

        let solve = |b: Vector6<f64>| {
            lu.solve(&b)
                .map(|c| Polynomial::new(c.iter().copied().collect()))
                .ok_or(PathError::SingularFit)
        };
        let axis = |i: usize| {
            Vector6::new(
                start.position[i],
                start.deriv[i],
                start_second[i],
                end.position[i],
                end.deriv[i],
                end_second[i],
            )
        };

        Ok(Self {
            x: solve(axis(0))?,
            y: solve(axis(1))?,
        })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// i! / (i - n)!, the factor gained by the power `i` term after `n`
/// derivatives.
fn falling_factorial(i: usize, n: usize) -> f64 {
    ((i + 1 - n)..=i).fold(1.0, |acc, k| acc * k as f64)
}
