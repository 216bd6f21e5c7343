//! # Profile generation
//!
//! Forward pass, backward pass and merge. The merge follows figure 3.4 of
//! Sprunk, "Planning Motion Trajectories for Mobile Robots Using Splines"
//! (2008).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{
    DisplacementProfile, DisplacementSegment, DisplacementState, MotionConstraints,
    OnlineProfile, ProfileError, SimpleConstraints,
};
use util::maths::{epsilon_eq, EPSILON};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default spacing of constraint samples, m.
pub const DEFAULT_RESOLUTION_M: f64 = 0.25;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a profile from `start` to `goal` over `length` metres.
///
/// Constraints are sampled every `resolution` metres (rounded so the
/// samples fit the length evenly), and each step between samples is limited
/// by the constraint at the step's start.
pub fn generate_profile<C>(
    start: DisplacementState,
    goal: DisplacementState,
    length: f64,
    constraints: &C,
    resolution: f64,
) -> Result<DisplacementProfile, ProfileError>
where
    C: MotionConstraints + ?Sized,
{
    let (samples, dx) = sample(length, constraints, resolution)?;

    let forward = forward_pass(start, &samples, dx);

    let reversed: Vec<SimpleConstraints> = samples.iter().rev().copied().collect();
    let backward = forward_pass(goal, &reversed, dx).reversed();

    let profile = merge(&forward, &backward);

    trace!(
        "Generated profile over {:.3} m from {} samples: {} segments, {:.3} s",
        length,
        samples.len(),
        profile.segments().len(),
        profile.duration()
    );

    Ok(profile)
}

/// Generate an online profile from `start` to `goal` over `length` metres.
///
/// The backward bound starts from the final constraint's maximum velocity
/// rather than the goal, since the ramp down into the goal is handled by the
/// online profile's stopping term.
pub fn generate_online_profile<C>(
    start: DisplacementState,
    goal: DisplacementState,
    length: f64,
    constraints: &C,
    resolution: f64,
) -> Result<OnlineProfile, ProfileError>
where
    C: MotionConstraints + ?Sized,
{
    let (samples, dx) = sample(length, constraints, resolution)?;

    let last = samples
        .last()
        .map(|c| DisplacementState::from_velocity(c.max_vel_ms))
        .unwrap_or_default();

    let reversed: Vec<SimpleConstraints> = samples.iter().rev().copied().collect();
    let backward = forward_pass(last, &reversed, dx).reversed();

    Ok(OnlineProfile::new(start, goal, length, Some(backward)))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample the constraints, returning the samples and their spacing.
fn sample<C>(
    length: f64,
    constraints: &C,
    resolution: f64,
) -> Result<(Vec<SimpleConstraints>, f64), ProfileError>
where
    C: MotionConstraints + ?Sized,
{
    if !length.is_finite() || length < 0.0 {
        return Err(ProfileError::InvalidLength(length));
    }
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(ProfileError::InvalidResolution(resolution));
    }

    let num = ((length / resolution).ceil() as usize).max(2);
    let samples = constraints.sample(length, num);

    for c in samples.iter() {
        if !(c.max_vel_ms >= 0.0) || !(c.max_accel_mss > 0.0) {
            return Err(ProfileError::InvalidConstraints(
                "sampled limits must be non-negative with positive acceleration",
            ));
        }
    }

    Ok((samples, length / (num - 1) as f64))
}

/// Accelerate as hard as allowed from `start`, one step per constraint
/// sample. The final sample only closes the interval and governs no step.
fn forward_pass(
    start: DisplacementState,
    constraints: &[SimpleConstraints],
    dx: f64,
) -> DisplacementProfile {
    let mut segments = Vec::with_capacity(constraints.len());
    let mut v = start.v;

    for c in constraints.iter().take(constraints.len().saturating_sub(1)) {
        let max_vel = c.max_vel_ms;
        let max_accel = c.max_accel_mss;

        if v >= max_vel {
            // Already at the limit, so coast
            let seg = DisplacementSegment::new(DisplacementState::from_velocity(max_vel), dx);
            v = seg.end().v;
            segments.push(seg);
            continue;
        }

        let final_vel = (v * v + 2.0 * max_accel * dx).sqrt();

        if final_vel <= max_vel {
            let seg = DisplacementSegment::new(DisplacementState::new(0.0, v, max_accel), dx);
            v = seg.end().v;
            segments.push(seg);
        } else {
            // Reach the limit part way through the step, then coast
            let accel_dx = (max_vel * max_vel - v * v) / (2.0 * max_accel);
            segments.push(DisplacementSegment::new(
                DisplacementState::new(0.0, v, max_accel),
                accel_dx,
            ));
            segments.push(DisplacementSegment::new(
                DisplacementState::from_velocity(max_vel),
                dx - accel_dx,
            ));
            v = max_vel;
        }
    }

    DisplacementProfile::new(segments)
}

/// Keep the lower of the forward and backward profiles at every
/// displacement.
fn merge(forward: &DisplacementProfile, backward: &DisplacementProfile) -> DisplacementProfile {
    let mut fwd: Vec<DisplacementSegment> = forward.segments().to_vec();
    let mut bwd: Vec<DisplacementSegment> = backward.segments().to_vec();
    let mut merged = Vec::with_capacity(fwd.len() + bwd.len());

    let mut i = 0;
    while i < fwd.len() && i < bwd.len() {
        let mut f = fwd[i];
        let mut b = bwd[i];

        // Split the longer segment so the pair is aligned, pushing its
        // remainder back into its list
        if !epsilon_eq(f.dx, b.dx) {
            if f.dx > b.dx {
                let (head, tail) = f.split(b.dx);
                fwd.insert(i + 1, tail);
                f = head;
            } else {
                let (head, tail) = b.split(f.dx);
                bwd.insert(i + 1, tail);
                b = head;
            }
        }

        let (lower, higher) = if f.start.v <= b.start.v { (f, b) } else { (b, f) };

        if lower.end().v <= higher.end().v {
            merged.push(lower);
        } else {
            match intersection(&lower.start, &higher.start) {
                Some(x) => {
                    let x = x.max(0.0).min(lower.dx);
                    merged.push(DisplacementSegment::new(lower.start, x));
                    merged.push(DisplacementSegment::new(higher.get(x), higher.dx - x));
                }
                None => merged.push(lower),
            }
        }

        i += 1;
    }

    DisplacementProfile::new(merged)
}

/// Displacement at which two constant acceleration curves starting at the
/// same displacement reach the same velocity, or `None` if their
/// accelerations are equal.
fn intersection(s1: &DisplacementState, s2: &DisplacementState) -> Option<f64> {
    let denom = 2.0 * s2.a - 2.0 * s1.a;

    if denom.abs() < EPSILON {
        None
    } else {
        Some((s1.v * s1.v - s2.v * s2.v) / denom)
    }
}
