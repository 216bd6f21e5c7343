//! # Arc-length parametrisation
//!
//! Builds the table of arcs used to map arc length back onto the curve
//! parameter `t` of a polynomial segment.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// Internal
use super::{Arc, PathError, PolySegment};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters controlling the adaptive subdivision of a segment into arcs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcParams {
    /// Largest change in curvature accepted across a single arc, 1/m
    pub max_delta_k: f64,

    /// Largest arc length accepted, m
    pub max_arc_length_m: f64,

    /// Maximum bisection depth. Arcs at this depth are accepted regardless
    /// of the two limits above.
    pub max_depth: usize,
}

/// The accepted arcs of a segment, sorted by start parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcTable {
    arcs: Vec<Arc>,

    /// Arc length at the start of each arc
    starts_m: Vec<f64>,

    length_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ArcParams {
    fn default() -> Self {
        Self {
            max_delta_k: 0.01,
            max_arc_length_m: 0.25,
            max_depth: 30,
        }
    }
}

impl ArcParams {
    /// Check the parameters describe a terminating subdivision.
    pub fn validate(&self) -> Result<(), PathError> {
        if !(self.max_delta_k > 0.0) {
            return Err(PathError::InvalidArcParams("max_delta_k must be positive"));
        }
        if !(self.max_arc_length_m > 0.0) {
            return Err(PathError::InvalidArcParams(
                "max_arc_length_m must be positive",
            ));
        }
        if self.max_depth > 64 {
            return Err(PathError::InvalidArcParams("max_depth must be at most 64"));
        }
        Ok(())
    }
}

impl ArcTable {
    /// Subdivide a curve into arcs.
    pub fn build(curve: &PolySegment, params: &ArcParams) -> Self {
        let mut arcs = Vec::new();
        subdivide(curve, params, 0.0, 1.0, 0, &mut arcs);

        arcs.sort_by_key(|a| OrderedFloat(a.t_start));

        let mut starts_m = Vec::with_capacity(arcs.len());
        let mut length_m = 0.0;
        for arc in arcs.iter() {
            starts_m.push(length_m);
            length_m += arc.length();
        }

        trace!(
            "Parametrised degree {} segment into {} arcs, {:.3} m",
            curve.degree(),
            arcs.len(),
            length_m
        );

        Self {
            arcs,
            starts_m,
            length_m,
        }
    }

    pub fn length(&self) -> f64 {
        self.length_m
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    /// Curve parameter at arc length `s`, clamped to the table.
    pub fn t_at(&self, s: f64) -> f64 {
        match self.locate(s) {
            Some((arc, local)) => arc.t_at(local),
            None => 0.0,
        }
    }

    /// Interpolated curvature at arc length `s`.
    pub fn curvature_at(&self, s: f64) -> f64 {
        match self.locate(s) {
            Some((arc, local)) => arc.curvature_at(local),
            None => 0.0,
        }
    }

    /// Arc length at the start of each arc, paired with the arc.
    pub fn iter_starts(&self) -> impl Iterator<Item = (f64, &Arc)> {
        self.starts_m.iter().copied().zip(self.arcs.iter())
    }

    /// Find the arc containing `s` and the distance along it.
    fn locate(&self, s: f64) -> Option<(&Arc, f64)> {
        let s = s.max(0.0).min(self.length_m);

        // Index of the last arc starting at or before s
        let idx = self
            .starts_m
            .partition_point(|&start| start <= s)
            .saturating_sub(1);

        self.arcs.get(idx).map(|arc| (arc, s - self.starts_m[idx]))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Recursively bisect [t0, t1] until each piece is well approximated by an
/// arc.
fn subdivide(
    curve: &PolySegment,
    params: &ArcParams,
    t0: f64,
    t1: f64,
    depth: usize,
    arcs: &mut Vec<Arc>,
) {
    let t_mid = 0.5 * (t0 + t1);

    let mut arc = Arc::from_points(
        curve.get(t0, 0),
        curve.get(t_mid, 0),
        curve.get(t1, 0),
        t0,
        t1,
    );

    let k0 = curve.curvature(t0);
    let k1 = curve.curvature(t1);

    let needs_split =
        (k1 - k0).abs() > params.max_delta_k || arc.length() > params.max_arc_length_m;

    if needs_split && depth < params.max_depth {
        subdivide(curve, params, t0, t_mid, depth + 1, arcs);
        subdivide(curve, params, t_mid, t1, depth + 1, arcs);
    } else {
        arc.set_curvature(k0, k1);
        arcs.push(arc);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::Knot;
    use nalgebra::Vector2;

    fn s_curve() -> PolySegment {
        PolySegment::fit(
            &Knot::new(Vector2::new(0.0, 0.0), Vector2::new(6.0, 0.0)),
            &Knot::new(Vector2::new(5.0, 3.0), Vector2::new(6.0, 0.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_arcs_contiguous_and_limited() {
        let params = ArcParams::default();
        let table = ArcTable::build(&s_curve(), &params);

        let arcs = table.arcs();
        assert!(arcs.len() > 1);
        assert_eq!(arcs[0].t_start, 0.0);
        assert_eq!(arcs[arcs.len() - 1].t_end, 1.0);

        for pair in arcs.windows(2) {
            assert_eq!(pair[0].t_end, pair[1].t_start);
            assert!((pair[0].end - pair[1].start).norm() < 1e-12);
        }
        for arc in arcs {
            assert!(arc.length() <= params.max_arc_length_m);
        }
    }

    #[test]
    fn test_t_at_monotone() {
        let table = ArcTable::build(&s_curve(), &ArcParams::default());

        let mut last_t = -1.0;
        for i in 0..=200 {
            let s = table.length() * i as f64 / 200.0;
            let t = table.t_at(s);
            assert!(t >= last_t);
            last_t = t;
        }
        assert_eq!(table.t_at(0.0), 0.0);
        assert!((table.t_at(table.length()) - 1.0).abs() < 1e-12);
        assert!((table.t_at(table.length() + 5.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_params() {
        let params = ArcParams {
            max_arc_length_m: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
        assert!(ArcParams::default().validate().is_ok());
    }
}
