//! GVF control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::*;
use crate::gvf::{is_finished, projection_rates, GuidingVectorField, GvfError, GvfResult};
use crate::path::{Path, PathError};
use crate::profile::{generate_online_profile, DisplacementState, OnlineProfile, ProfileError};
use drive_if::{DriveCmd, OdomSample, Pose, Twist};
use util::{
    maths::EPSILON,
    module::State,
    params,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// GVF control module state
pub struct GvfCtrl {
    params: Params,

    /// Executing mode
    mode: GvfCtrlMode,

    path: Path,
    field: GuidingVectorField,
    profile: OnlineProfile,

    head_ctrl: PidController,
    feed_forward: FeedForward,

    /// Arc length of the last projection, `None` before the first cycle
    s_m: Option<f64>,

    /// Time of the last cycle, used for the heading controller
    last_time_s: Option<f64>,

    report: StatusReport,
}

/// Data required to initialise GvfCtrl.
pub struct InitData {
    pub params: Params,
    pub path: Path,
}

/// The status report containing the controller's monitoring quantities.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    pub time_s: f64,

    /// Arc length of the projection onto the path
    pub s_m: f64,

    pub pos_x_m: f64,
    pub pos_y_m: f64,
    pub heading_rad: f64,

    /// Signed cross track error to the path, positive to the left
    pub lat_error_m: f64,

    /// The heading error to the path heading
    pub head_error_rad: f64,

    /// Speed and acceleration from the profile
    pub target_vel_ms: f64,
    pub target_accel_mss: f64,

    /// Number of profile queries made during the cycle
    pub converge_iters: usize,

    /// Field frame velocity demand
    pub vel_x_ms: f64,
    pub vel_y_ms: f64,
    pub ang_vel_rads: f64,

    /// Heading controller output
    pub head_fb_rads: f64,

    /// Body frame drive powers
    pub power_x: f64,
    pub power_y: f64,
    pub power_ang: f64,

    /// If true the limit on the lateral error has been exceeded
    pub lat_error_limit_exceeded: bool,

    pub finished: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum GvfCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(#[from] params::LoadError),

    #[error("Invalid parameter: {0}")]
    InvalidParams(&'static str),

    #[error("Path error: {0}")]
    PathError(#[from] PathError),

    #[error("Profile error: {0}")]
    ProfileError(#[from] ProfileError),

    #[error("Vector field error: {0}")]
    GvfError(#[from] GvfError),
}

/// The possible modes of execution of GvfCtrl. Each mode is handled by a
/// `mode_xyz` function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum GvfCtrlMode {
    Following,
    Finished,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for GvfCtrl {
    type InitData = InitData;
    type InitError = GvfCtrlError;

    type InputData = OdomSample;
    type OutputData = DriveCmd;
    type StatusReport = StatusReport;
    type ProcError = GvfCtrlError;

    /// Initialise the GvfCtrl module.
    ///
    /// Builds the vector field and online profile for the given path.
    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        let InitData { params, path } = init_data;

        validate(&params)?;

        let field = GuidingVectorField::new(params.k_n, params.error_map)?;

        let profile = generate_online_profile(
            DisplacementState::default(),
            DisplacementState::default(),
            path.length(),
            &params.constraints.along(&path),
            params.profile_resolution_m,
        )?;

        let head_ctrl = PidController::new(params.head_k_p, params.head_k_i, params.head_k_d);
        let feed_forward = FeedForward::new(params.k_s, params.k_v, params.k_a);

        info!(
            "GvfCtrl initialised on a {:.3} m path with {} segments",
            path.length(),
            path.segments().len()
        );

        Ok(Self {
            params,
            mode: GvfCtrlMode::Following,
            path,
            field,
            profile,
            head_ctrl,
            feed_forward,
            s_m: None,
            last_time_s: None,
            report: StatusReport::default(),
        })
    }

    /// Process GVF control.
    ///
    /// Processing involves:
    ///  1. Projecting the pose onto the path
    ///  1. Checking whether the path is finished
    ///  1. Evaluating the field and the profile
    ///  1. Calculating the drive powers from the field frame demands
    fn proc(
        &mut self,
        odom: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Setup cycle data
        self.report = StatusReport {
            time_s: odom.time_s,
            pos_x_m: odom.pose.position_m[0],
            pos_y_m: odom.pose.position_m[1],
            heading_rad: odom.pose.heading_rad,
            ..Default::default()
        };

        // Mode execution. Each of the mode functions returns the command to
        // output or an error
        let result = match self.mode {
            GvfCtrlMode::Following => self.mode_following(odom),
            GvfCtrlMode::Finished => self.mode_finished(),
        };

        self.last_time_s = Some(odom.time_s);

        Ok((result?, self.report))
    }
}

impl GvfCtrl {
    /// Run one cycle, returning only the drive command.
    pub fn update(&mut self, odom: &OdomSample) -> Result<DriveCmd, GvfCtrlError> {
        self.proc(odom).map(|(cmd, _)| cmd)
    }

    pub fn is_finished(&self) -> bool {
        self.mode == GvfCtrlMode::Finished
    }

    pub fn mode(&self) -> GvfCtrlMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Arc length of the last projection onto the path.
    pub fn s(&self) -> Option<f64> {
        self.s_m
    }

    /// Mode following the path.
    fn mode_following(&mut self, odom: &OdomSample) -> Result<DriveCmd, GvfCtrlError> {
        let pose = odom.pose;
        let now_s = odom.time_s;

        let s = self.project(&pose);
        self.report.s_m = s;

        if is_finished(
            &self.path,
            s,
            &pose,
            self.params.epsilon_m,
            self.params.theta_epsilon_rad,
        ) {
            info!(
                "Path finished at s = {:.3} m, position ({:.3}, {:.3})",
                s, pose.position_m[0], pose.position_m[1]
            );
            self.mode = GvfCtrlMode::Finished;
            return self.mode_finished();
        }

        // ---- FIELD ----

        let mut gvf = self.field.get(&self.path, s, &pose.position_m)?;
        self.report.lat_error_m = gvf.error;

        // At the end of the path the projection can move no further, so drive
        // straight at the end point instead of along the field.
        let at_end = self.path.length() - s < self.params.epsilon_m;
        if at_end {
            let to_end = self.path.end().vec - pose.position_m;
            let dist = to_end.norm();
            if dist > EPSILON {
                gvf.vector = to_end / dist;
            }
            gvf.deriv = Vector2::zeros();
            gvf.proj_deriv = 0.0;
        }

        if let Some(limit) = self.params.lat_error_limit_m {
            if gvf.error.abs() > limit {
                warn!(
                    "Lateral error {:.3} m exceeds the limit of {:.3} m",
                    gvf.error, limit
                );
                self.report.lat_error_limit_exceeded = true;
            }
        }

        // ---- HEADING FEEDBACK ----

        let path_point = self.path.point(s);
        let head_deriv = self.path.deriv(s).heading;
        let head_second_deriv = self.path.second_deriv(s).heading;

        let target = Pose {
            position_m: path_point.vec,
            heading_rad: path_point.heading,
        };
        let head_error = pose_error(&target, &pose).heading_rad;
        self.report.head_error_rad = head_error;

        let head_fb = if self.path.length() - s < self.params.heading_fb_dist_m {
            // The error rate comes from the measured velocity: the path
            // heading moves with the measured projection rate while the robot
            // turns at its measured angular rate.
            let (meas_s_dot, _) = if at_end {
                (0.0, 0.0)
            } else {
                projection_rates(
                    &self.path,
                    s,
                    &pose.position_m,
                    &odom.field_vel.linear,
                    &Vector2::zeros(),
                )?
            };
            let head_error_rate = head_deriv * meas_s_dot - odom.field_vel.angular;

            let dt = self.last_time_s.map(|t| now_s - t);
            self.head_ctrl.get_with_rate(head_error, head_error_rate, dt)
        } else {
            self.head_ctrl.reset();
            0.0
        };
        self.report.head_fb_rads = head_fb;

        // ---- PROFILE ----

        let state = self.converge_profile(s, &gvf, head_deriv, head_fb, now_s);
        self.profile.update(state.v, now_s);

        self.report.target_vel_ms = state.v;
        self.report.target_accel_mss = state.a;

        // ---- FIELD FRAME DEMANDS ----

        let v = state.v;
        let a = state.a;

        let vel = gvf.vector * v;
        let accel = gvf.vector * a + gvf.deriv * (v * v);

        // Once at the end the projection is held there
        let (s_dot, s_ddot) = if at_end {
            (0.0, 0.0)
        } else {
            projection_rates(&self.path, s, &pose.position_m, &vel, &accel)?
        };

        let ang_vel = head_deriv * s_dot + head_fb;
        let ang_accel = head_second_deriv * s_dot * s_dot + head_deriv * s_ddot;

        let field_vel = Twist {
            linear: vel,
            angular: ang_vel,
        };
        let field_accel = Twist {
            linear: accel,
            angular: ang_accel,
        };

        self.report.vel_x_ms = vel[0];
        self.report.vel_y_ms = vel[1];
        self.report.ang_vel_rads = ang_vel;

        // ---- BODY FRAME POWERS ----

        let body_vel = field_to_body_vel(&pose, &field_vel);
        let body_accel = field_to_body_accel(&pose, &field_vel, &field_accel);
        let powers = self.feed_forward.powers(&body_vel, &body_accel);

        self.report.power_x = powers.linear[0];
        self.report.power_y = powers.linear[1];
        self.report.power_ang = powers.angular;

        trace!(
            "GvfCtrl s = {:.3} m, error = {:.3} m, v = {:.3} m/s, powers = ({:.3}, {:.3}, {:.3})",
            s,
            gvf.error,
            v,
            powers.linear[0],
            powers.linear[1],
            powers.angular
        );

        Ok(DriveCmd::BodyPowers(powers))
    }

    /// Mode finished.
    ///
    /// The path is complete and the robot must stay stopped.
    fn mode_finished(&mut self) -> Result<DriveCmd, GvfCtrlError> {
        self.report.finished = true;
        self.report.s_m = self.s_m.unwrap_or_default();
        Ok(DriveCmd::Stop)
    }

    /// Project the pose onto the path, seeding from the previous cycle.
    ///
    /// On the first cycle there is no previous arc length, so the global
    /// nearest point is searched for instead.
    fn project(&mut self, pose: &Pose) -> f64 {
        let s = match self.s_m {
            Some(prev) => self.path.project(&pose.position_m, prev),
            None => match self.path.nearest(&pose.position_m) {
                Ok(s) => {
                    debug!("Initial projection onto path at s = {:.3} m", s);
                    s
                }
                Err(e) => {
                    warn!("{}, projecting from the start of the path instead", e);
                    self.path.project(&pose.position_m, 0.0)
                }
            },
        };

        self.s_m = Some(s);
        s
    }

    /// Query the profile until the velocity settles.
    ///
    /// The angular rate needed at a given speed is h'(s) ds/dx v plus the
    /// heading feedback. Where that exceeds the drivetrain's limit the speed
    /// limit is lowered in proportion and the profile queried again. None of
    /// the queries commit to the profile.
    fn converge_profile(
        &mut self,
        s: f64,
        gvf: &GvfResult,
        head_deriv: f64,
        head_fb: f64,
        now_s: f64,
    ) -> DisplacementState {
        let mut limits = self.params.constraints.at(&self.path, s);
        let mut state = self.profile.get(s, gvf.error, &limits, now_s);
        let mut iters = 1;

        if let Some(max_ang_vel) = self.params.constraints.max_ang_vel_rads {
            while iters < self.params.max_converge_iters {
                if state.v <= EPSILON {
                    break;
                }

                let ang_vel = head_deriv * gvf.proj_deriv * state.v + head_fb;
                if ang_vel.abs() <= max_ang_vel {
                    break;
                }

                let ang_vel_per_vel = (ang_vel / state.v).abs();
                limits.max_vel_ms = limits.max_vel_ms.min(max_ang_vel / ang_vel_per_vel);

                let next = self.profile.get(s, gvf.error, &limits, now_s);
                iters += 1;

                let settled = (next.v - state.v).abs() < self.params.converge_tol_ms;
                state = next;
                if settled {
                    break;
                }
            }
        }

        self.report.converge_iters = iters;
        state
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check the parameters which are not validated by the components built from
/// them.
fn validate(params: &Params) -> Result<(), GvfCtrlError> {
    params.constraints.validate()?;

    if !(params.epsilon_m > 0.0) {
        return Err(GvfCtrlError::InvalidParams("epsilon_m must be positive"));
    }
    if params.theta_epsilon_rad.map_or(false, |t| !(t > 0.0)) {
        return Err(GvfCtrlError::InvalidParams(
            "theta_epsilon_rad must be positive",
        ));
    }
    if params.max_converge_iters == 0 {
        return Err(GvfCtrlError::InvalidParams(
            "max_converge_iters must be at least 1",
        ));
    }
    if !(params.converge_tol_ms > 0.0) {
        return Err(GvfCtrlError::InvalidParams(
            "converge_tol_ms must be positive",
        ));
    }

    Ok(())
}
