//! Main GVF executable entry point.
//!
//! # Architecture
//!
//! The executable follows a path in simulation:
//!
//!     - Load the controller, path and simulation parameters
//!     - Build the path and initialise GvfCtrl
//!     - Main loop:
//!         - Odometry acquisition from the simulated drivetrain
//!         - GvfCtrl processing
//!         - Drive command output
//!         - Status report archiving
//!
//! # Usage
//!
//!     gvf_exec [path_params.toml]
//!
//! The path file is relative to the `params` directory, and defaults to
//! `path.toml`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;

// Internal
use drive_if::{DriveSink, PoseSource};
use gvf_lib::{
    gvf_ctrl::{self, GvfCtrl},
    path::{PathParams, PathPoint},
    sim::{SimDrive, SimParams},
};
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
    time::{Clock, ManualClock},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of one control cycle.
const CYCLE_PERIOD_S: f64 = 0.01;

/// Spacing of the path samples saved to the session.
const PATH_SAMPLE_SPACING_M: f64 = 0.05;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("gvf_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, Some(&session)).wrap_err("Failed to initialise logging")?;

    info!("GVF Path Following Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let path_file = match args.len() {
        1 => "path.toml",
        2 => &args[1],
        n => return Err(eyre!("Expected zero or one argument, found {}", n - 1)),
    };

    let ctrl_params: gvf_ctrl::Params =
        util::params::load("gvf_ctrl.toml").wrap_err("Could not load GvfCtrl params")?;
    let path_params: PathParams = util::params::load(path_file)
        .wrap_err_with(|| format!("Could not load path params from {}", path_file))?;
    let sim_params: SimParams =
        util::params::load("sim.toml").wrap_err("Could not load sim params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let path = path_params.build().wrap_err("Failed to build the path")?;

    info!(
        "Path built: {} waypoints, {:.3} m long",
        path_params.waypoints.len(),
        path.length()
    );

    let num_samples = (path.length() / PATH_SAMPLE_SPACING_M).ceil() as usize + 1;
    let samples: Vec<PathPoint> = (0..num_samples)
        .map(|i| path.point(i as f64 * PATH_SAMPLE_SPACING_M))
        .collect();
    session
        .save_json("path.json", &samples)
        .wrap_err("Failed to save the path samples")?;

    let mut gvf_ctrl = GvfCtrl::init(gvf_ctrl::InitData {
        params: ctrl_params,
        path,
    })
    .wrap_err("Failed to initialise GvfCtrl")?;
    info!("GvfCtrl init complete");

    let clock = ManualClock::new(0.0);
    let mut sim = SimDrive::new(sim_params.start_pose, clock.seconds(), sim_params.k_v);

    let mut archiver =
        Archiver::from_path(&session, "gvf_ctrl.csv").wrap_err("Failed to create the archive")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    while clock.seconds() < sim_params.max_duration_s {
        // ---- DATA INPUT ----

        let odom = sim.sample();

        // ---- CONTROL ALGORITHM PROCESSING ----

        let (cmd, report) = gvf_ctrl
            .proc(&odom)
            .wrap_err("Error during GvfCtrl processing")?;

        // ---- DATA OUTPUT ----

        sim.send(&cmd);

        if let Err(e) = archiver.serialise(report) {
            warn!("Could not archive the GvfCtrl status report: {}", e);
        }

        if gvf_ctrl.is_finished() {
            break;
        }

        clock.advance(CYCLE_PERIOD_S);
        sim.step(clock.seconds());
    }

    let end = sim.pose();

    if gvf_ctrl.is_finished() {
        info!(
            "Path complete after {:.2} s at ({:.3}, {:.3}, {:.3})",
            clock.seconds(),
            end.position_m[0],
            end.position_m[1],
            end.heading_rad
        );
        Ok(())
    } else {
        Err(eyre!(
            "Path not complete after {:.2} s, robot at ({:.3}, {:.3})",
            clock.seconds(),
            end.position_m[0],
            end.position_m[1]
        ))
    }
}
