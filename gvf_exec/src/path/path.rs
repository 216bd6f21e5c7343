//! # Path
//!
//! This module defines the arc-length parametrised path followed by the
//! controller.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use super::{
    knot::knot_pairs, ArcParams, HeadingInterp, HeadingInterpolator, Order, PathError,
    PathSegment, PolySegment, SegmentDerivs, Waypoint,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest component of the residual along the tangent for which a segment
/// accepts a point as inside its projection domain.
pub const PROJECTION_DOMAIN_TOL_M: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A smooth path made of polynomial segments, parametrised by arc length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    segments: Vec<PathSegment>,

    heading: HeadingInterp,

    length_m: f64,
}

/// One order of derivative of the pose along a path: a planar vector and a
/// heading.
///
/// For order zero this is the position and heading, for order one the unit
/// tangent and heading rate per metre, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PathPoint {
    pub vec: Vector2<f64>,
    pub heading: f64,
}

/// Path definition as loaded from a parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct PathParams {
    pub waypoints: Vec<Waypoint>,

    #[serde(default)]
    pub heading: HeadingInterp,

    #[serde(default)]
    pub arc: ArcParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathParams {
    pub fn build(&self) -> Result<Path, PathError> {
        Path::from_waypoints(&self.waypoints, self.heading, &self.arc)
    }
}

impl Path {
    /// Create a path from already built segments.
    pub fn new(segments: Vec<PathSegment>, heading: HeadingInterp) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::NotEnoughWaypoints(0));
        }

        let length_m = segments.iter().map(|s| s.length()).sum();

        Ok(Self {
            segments,
            heading,
            length_m,
        })
    }

    /// Fit a path through the given waypoints.
    pub fn from_waypoints(
        waypoints: &[Waypoint],
        heading: HeadingInterp,
        params: &ArcParams,
    ) -> Result<Self, PathError> {
        let segments = knot_pairs(waypoints)?
            .iter()
            .zip(waypoints.iter())
            .map(|((start, end), wp)| {
                PathSegment::new(PolySegment::fit(start, end)?, params, wp.speed_ms)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let path = Self::new(segments, heading)?;

        debug!(
            "Built path through {} waypoints: {} segments, {:.3} m",
            waypoints.len(),
            path.segments.len(),
            path.length_m
        );

        Ok(path)
    }

    /// Total arc length of the path.
    pub fn length(&self) -> f64 {
        self.length_m
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn heading_interp(&self) -> &HeadingInterp {
        &self.heading
    }

    /// The `n`th derivative of the pose with respect to arc length at `s`.
    ///
    /// `s` is clamped onto the path. Orders above 3 are not supported.
    pub fn get(&self, s: f64, n: usize) -> Result<PathPoint, PathError> {
        Ok(self.eval(s, Order::from_index(n)?))
    }

    /// Position and heading at `s`.
    pub fn point(&self, s: f64) -> PathPoint {
        self.eval(s, Order::Position)
    }

    /// Unit tangent and heading rate at `s`.
    pub fn deriv(&self, s: f64) -> PathPoint {
        self.eval(s, Order::First)
    }

    pub fn second_deriv(&self, s: f64) -> PathPoint {
        self.eval(s, Order::Second)
    }

    pub fn third_deriv(&self, s: f64) -> PathPoint {
        self.eval(s, Order::Third)
    }

    pub fn start(&self) -> PathPoint {
        self.point(0.0)
    }

    pub fn end(&self) -> PathPoint {
        self.point(self.length_m)
    }

    /// Curvature at `s` from the arc tables.
    pub fn curvature(&self, s: f64) -> f64 {
        let (seg, local) = self.locate(s);
        seg.curvature(local)
    }

    /// Speed limit attached to the segment containing `s`.
    pub fn speed_limit(&self, s: f64) -> Option<f64> {
        self.locate(s).0.speed_limit_ms()
    }

    /// Arc length of the point nearest `point`, iterating from `guess`.
    ///
    /// Each iteration moves `s` by the component of the residual along the
    /// tangent, which is zero at the true projection. The result is the best
    /// projection reachable from `guess`, which on sharp curves may be a
    /// local rather than global minimum.
    pub fn project(&self, point: &Vector2<f64>, guess: f64) -> f64 {
        let mut s = self.clamp(guess);

        for _ in 0..super::segment::PROJECT_ITERATIONS {
            let (seg, local) = self.locate(s);
            let d = seg.derivs(local);
            s = self.clamp(s + (point - d.position).dot(&d.deriv));
        }

        s
    }

    /// Global nearest point search.
    ///
    /// Every segment projects the point from its own coarse seed. A segment
    /// only offers a candidate if the residual is orthogonal to its tangent
    /// there. The closest candidate wins.
    pub fn nearest(&self, point: &Vector2<f64>) -> Result<f64, PathError> {
        let mut best: Option<(f64, f64)> = None;
        let mut offset = 0.0;

        for seg in self.segments.iter() {
            let local = seg.project(point, seg.coarse_nearest(point));
            let d = seg.derivs(local);
            let residual = point - d.position;

            if residual.dot(&d.deriv).abs() < PROJECTION_DOMAIN_TOL_M {
                let dist = residual.norm();
                if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                    best = Some((offset + local, dist));
                }
            }

            offset += seg.length();
        }

        best.map(|(s, _)| s)
            .ok_or(PathError::PointOutsideProjectionDomain(point[0], point[1]))
    }

    fn clamp(&self, s: f64) -> f64 {
        s.max(0.0).min(self.length_m)
    }

    /// Find the segment containing `s` and the local arc length within it,
    /// by walking the segments in order.
    fn locate(&self, s: f64) -> (&PathSegment, f64) {
        let mut remaining = self.clamp(s);
        let last = self.segments.len() - 1;

        for (i, seg) in self.segments.iter().enumerate() {
            if remaining <= seg.length() || i == last {
                return (seg, remaining.min(seg.length()));
            }
            remaining -= seg.length();
        }

        // Unreachable while segments is non-empty, which `new` enforces
        (&self.segments[last], 0.0)
    }

    fn eval(&self, s: f64, order: Order) -> PathPoint {
        let s = self.clamp(s);
        let (seg, local) = self.locate(s);
        let derivs: SegmentDerivs = seg.derivs(local);
        let heading = self.heading.heading(s, self.length_m, &derivs);

        PathPoint {
            vec: derivs.get(order),
            heading: match order {
                Order::Position => heading.heading_rad,
                Order::First => heading.deriv,
                Order::Second => heading.second_deriv,
                // Heading interpolators are at most quadratic in s
                Order::Third => 0.0,
            },
        }
    }
}
