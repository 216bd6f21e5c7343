//! GVF control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::gvf::ErrorMap;
use crate::profile::{DriveConstraints, DEFAULT_RESOLUTION_M};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for GVF control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Field convergence gain
    pub k_n: f64,

    /// Map from cross track error to the weight of the field's normal
    #[serde(default)]
    pub error_map: ErrorMap,

    /// Distance from the end of the path within which the path is finished
    pub epsilon_m: f64,

    /// Heading error within which the path is finished. If not given the
    /// heading is not checked.
    #[serde(default)]
    pub theta_epsilon_rad: Option<f64>,

    /// Heading controller proportional gain
    pub head_k_p: f64,

    /// Heading controller integral gain
    pub head_k_i: f64,

    /// Heading controller derivative gain
    pub head_k_d: f64,

    /// Remaining arc length below which heading feedback is used
    pub heading_fb_dist_m: f64,

    /// Drivetrain limits
    pub constraints: DriveConstraints,

    /// Static friction feed forward gain
    pub k_s: f64,

    /// Velocity feed forward gain
    pub k_v: f64,

    /// Acceleration feed forward gain
    pub k_a: f64,

    /// Spacing of the constraint samples used for the backward pass
    #[serde(default = "default_resolution")]
    pub profile_resolution_m: f64,

    /// Maximum number of profile queries in one cycle
    #[serde(default = "default_converge_iters")]
    pub max_converge_iters: usize,

    /// Change in velocity below which the profile queries have converged
    #[serde(default = "default_converge_tol")]
    pub converge_tol_ms: f64,

    /// The limit on lateral error. Above this limit the status report flags
    /// an exceedance.
    #[serde(default)]
    pub lat_error_limit_m: Option<f64>,
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION_M
}

fn default_converge_iters() -> usize {
    20
}

fn default_converge_tol() -> f64 {
    1e-4
}
