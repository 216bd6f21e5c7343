//! # Error maps
//!
//! Shape the signed cross track error into the weight given to the normal
//! vector of the field. Saturating maps keep the robot from turning straight
//! at the path when it is far away.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::GvfError;
use util::maths::sign;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A scalar mapping of the cross track error together with its derivative.
pub trait ErrorMapping {
    fn map(&self, error: f64) -> f64;

    fn deriv(&self, error: f64) -> f64;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The available error maps.
///
/// With `u = |x/b|^p` for power `p` and stretch `b`:
///  - `Linear`: f(x) = x
///  - `DampedPower`: f(x) = sign(x) u / (1 + u)
///  - `Arctan`: f(x) = atan(sign(x) u) / (pi/2)
///
/// Both saturating maps tend to +/-1 for large errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ErrorMap {
    Linear,
    DampedPower { power: f64, stretch: f64 },
    Arctan { power: f64, stretch: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ErrorMap {
    fn default() -> Self {
        ErrorMap::Linear
    }
}

impl ErrorMap {
    /// Check the map's power and stretch.
    pub fn validate(&self) -> Result<(), GvfError> {
        match *self {
            ErrorMap::Linear => Ok(()),
            ErrorMap::DampedPower { power, stretch } | ErrorMap::Arctan { power, stretch } => {
                if !(power >= 1.0) || !power.is_finite() {
                    Err(GvfError::InvalidErrorMap("power must be at least 1"))
                } else if !(stretch > 0.0) || !stretch.is_finite() {
                    Err(GvfError::InvalidErrorMap("stretch must be positive"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl ErrorMapping for ErrorMap {
    fn map(&self, error: f64) -> f64 {
        match *self {
            ErrorMap::Linear => error,
            ErrorMap::DampedPower { power, stretch } => {
                let u = (error / stretch).abs().powf(power);
                sign(error) * u / (1.0 + u)
            }
            ErrorMap::Arctan { power, stretch } => {
                let u = (error / stretch).abs().powf(power);
                (sign(error) * u).atan() / std::f64::consts::FRAC_PI_2
            }
        }
    }

    fn deriv(&self, error: f64) -> f64 {
        match *self {
            ErrorMap::Linear => 1.0,
            ErrorMap::DampedPower { power, stretch } => {
                let x = (error / stretch).abs();
                let u = x.powf(power);
                power / stretch * x.powf(power - 1.0) / ((1.0 + u) * (1.0 + u))
            }
            ErrorMap::Arctan { power, stretch } => {
                let x = (error / stretch).abs();
                let u = x.powf(power);
                power / stretch * x.powf(power - 1.0)
                    / (std::f64::consts::FRAC_PI_2 * (1.0 + u * u))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MAPS: [ErrorMap; 5] = [
        ErrorMap::Linear,
        ErrorMap::DampedPower {
            power: 1.0,
            stretch: 0.5,
        },
        ErrorMap::DampedPower {
            power: 2.5,
            stretch: 1.0,
        },
        ErrorMap::Arctan {
            power: 1.0,
            stretch: 2.0,
        },
        ErrorMap::Arctan {
            power: 3.0,
            stretch: 0.4,
        },
    ];

    #[test]
    fn test_odd_and_zero() {
        for m in MAPS.iter() {
            assert_eq!(m.map(0.0), 0.0);
            for &x in [0.1, 0.7, 3.0].iter() {
                assert!((m.map(-x) + m.map(x)).abs() < 1e-12);
                assert!(m.map(x) > 0.0);
            }
        }
    }

    #[test]
    fn test_derivative_matches_difference() {
        let h = 1e-6;
        for m in MAPS.iter() {
            for &x in [-2.0, -0.3, 0.2, 0.9, 4.0].iter() {
                let fd = (m.map(x + h) - m.map(x - h)) / (2.0 * h);
                assert!(
                    (m.deriv(x) - fd).abs() < 1e-6,
                    "{:?} at {}: {} vs {}",
                    m,
                    x,
                    m.deriv(x),
                    fd
                );
            }
        }
    }

    #[test]
    fn test_saturation() {
        for m in MAPS.iter().skip(1) {
            assert!(m.map(1e6) <= 1.0);
            assert!(m.map(1e6) > 0.99);
        }

        // Unit power maps have slope 1/b at zero
        let m = ErrorMap::DampedPower {
            power: 1.0,
            stretch: 0.5,
        };
        assert!((m.deriv(0.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(MAPS.iter().all(|m| m.validate().is_ok()));

        let low_power = ErrorMap::Arctan {
            power: 0.5,
            stretch: 1.0,
        };
        assert!(low_power.validate().is_err());

        let no_stretch = ErrorMap::DampedPower {
            power: 2.0,
            stretch: 0.0,
        };
        assert!(no_stretch.validate().is_err());
    }

    #[test]
    fn test_deserialise() {
        let m: ErrorMap =
            util::params::load_from_str("type = \"DampedPower\"\npower = 2.0\nstretch = 0.5")
                .unwrap();
        assert_eq!(
            m,
            ErrorMap::DampedPower {
                power: 2.0,
                stretch: 0.5
            }
        );
    }
}
