//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default tolerance used for floating point comparisons.
pub const EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Returns true if `a` and `b` are within `EPSILON` of each other.
pub fn epsilon_eq<T>(a: T, b: T) -> bool
where
    T: Float,
{
    (a - b).abs() < T::from(EPSILON).unwrap_or_else(T::epsilon)
}

/// Sign of a value, returning zero for zero.
///
/// `f64::signum` returns 1 for +0.0, which is not wanted when the sign
/// selects a side of a line.
pub fn sign<T>(value: T) -> T
where
    T: Float,
{
    if value > T::zero() {
        T::one()
    } else if value < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// Wrap an angle into the range (-pi, pi].
pub fn angle_wrap<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t = pi_t + pi_t;

    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    // rem_euclid maps +pi to -pi, keep the upper bound inclusive
    if wrapped == -pi_t {
        pi_t
    } else {
        wrapped
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_angle_wrap() {
        assert!(epsilon_eq(angle_wrap(0f64), 0f64));
        assert!(epsilon_eq(angle_wrap(PI), PI));
        assert!(epsilon_eq(angle_wrap(-PI), PI));
        assert!(epsilon_eq(angle_wrap(3.0 * PI / 2.0), -PI / 2.0));
        assert!(epsilon_eq(angle_wrap(-3.0 * PI / 2.0), PI / 2.0));
        assert!(epsilon_eq(angle_wrap(4.0 * PI + 0.1), 0.1));
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(0f64), 0f64);
        assert_eq!(sign(-0f64), 0f64);
        assert_eq!(sign(2.5f64), 1f64);
        assert_eq!(sign(-1e-12f64), -1f64);
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 10f64), (1f64, 3f64), 5f64), 2f64);
        assert_eq!(lin_map((0f64, 2f64), (1f64, -1f64), 2f64), -1f64);
    }
}
