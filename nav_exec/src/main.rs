//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Load or generate the grid
//!     - Plan the route and extract its turns
//!     - Initialise the pose source and the haptic actuator
//!     - Main loop:
//!         - Pose acquisition (simulated or live)
//!         - Agent update
//!         - Turn alert processing and haptic actuation
//!         - Archiving
//!
//! The loop ends once the pose source is exhausted and no alert is being displayed. A live pose
//! source is never exhausted, so in live mode the executable runs until it is killed.
//!
//! # Usage
//!
//! ```text
//! nav_exec [sim|live]
//! ```
//!
//! The optional argument overrides the pose source set in `nav_exec.toml`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use comms_if::{eqpt::haptic::TurnDirection, net::NetParams};
use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use nav_lib::{
    agent::Agent,
    alert::{ActiveAlert, AlertPhase, TurnAlertEngine},
    data_store::DataStore,
    grid::Grid,
    haptic_client::{Actuator, HapticClient, LogActuator},
    params::NavExecParams,
    pose::{LivePoseSource, PoseSample, PoseSource, PoseSourceKind, SimPoseSource},
    route::RoutePlanner,
};
use util::{
    archive::Archiver,
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Row of the pose archive
#[derive(Serialize)]
struct PoseRecord {
    time_s: f64,
    x: f64,
    y: f64,
    heading_rad: f64,
}

/// Row of the alert archive
#[derive(Serialize)]
struct AlertRecord {
    time_s: f64,
    turn_idx: usize,
    direction: TurnDirection,
    angle_deg: f64,
    distance: f64,
    level: Option<u8>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Haptic Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let mut params: NavExecParams =
        util::params::load("nav_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // A single argument overrides the pose source
    if args.len() == 2 {
        params.pose.source = args[1]
            .parse()
            .map_err(|e: String| eyre!(e))
            .wrap_err("Invalid pose source argument")?;
        info!("Pose source set to {:?} from the command line", params.pose.source);
    } else if args.len() > 2 {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    if !(params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "The cycle period must be positive, found {}",
            params.cycle_period_s
        ));
    }

    session.save("params.json", params.clone());

    // ---- INITIALISE GRID ----

    let mut rng = match params.grid.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let grid_path = host::get_sw_root()
        .wrap_err("Could not find the software root")?
        .join(&params.grid.grid_file);

    let grid = Grid::load_or_generate(&params.grid, &grid_path, &mut rng)
        .wrap_err("Failed to initialise the grid")?;

    info!(
        "Grid is {} x {}, from {:?} to {:?}",
        grid.width(),
        grid.height(),
        grid.start(),
        grid.end()
    );

    // ---- PLAN ROUTE ----

    let planner = RoutePlanner::new(params.route.clone(), params.grid.cell_size);
    let route = planner.plan(&grid).wrap_err("Failed to plan a route")?;

    session.save("route.json", route.clone());

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut pose_source: Box<dyn PoseSource> = match params.pose.source {
        PoseSourceKind::Sim => {
            let s = SimPoseSource::new(&route.path, params.grid.cell_size, params.pose.sim.clone())
                .wrap_err("Failed to initialise the SimPoseSource")?;
            if !params.alert.supports_sample_spacing(s.max_spacing()) {
                warn!(
                    "Simulated poses are up to {:.1} apart, which is too coarse for an alert \
                    distance of {:.1}, turns may be missed. Reduce pose.sim.interpolation_step \
                    or increase alert.alert_distance.",
                    s.max_spacing(),
                    params.alert.alert_distance
                );
            }
            Box::new(s)
        }
        PoseSourceKind::Live => {
            let s = LivePoseSource::new(&net_params, &params.pose.live, params.grid.cell_size)
                .wrap_err("Failed to initialise the LivePoseSource")?;
            info!("Listening for poses on {:?}", s.local_addr());
            Box::new(s)
        }
    };
    info!("{:?} pose source initialised", params.pose.source);

    let mut actuator: Box<dyn Actuator> = match net_params.haptic_endpoint {
        Some(ref endpoint) => {
            let c = HapticClient::new(endpoint).wrap_err("Failed to initialise the HapticClient")?;
            info!("HapticClient initialised, sending to {}", endpoint);
            Box::new(c)
        }
        None => {
            info!("No haptic endpoint configured, haptic commands will only be logged");
            Box::new(LogActuator::default())
        }
    };

    let mut agent = Agent::default();
    let mut alert_engine = TurnAlertEngine::new(params.alert.clone(), route.turn_points.clone());

    let mut ds = DataStore::default();

    let mut pose_arch =
        Archiver::from_path(&session, "poses.csv").wrap_err("Failed to create the pose archive")?;
    let mut alert_arch = Archiver::from_path(&session, "alerts.csv")
        .wrap_err("Failed to create the alert archive")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(params.cycle_period_s);
    let cycle_frequency_hz = 1.0 / params.cycle_period_s;

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz, util::session::get_elapsed_seconds());

        // ---- DATA INPUT ----

        ds.pose = pose_source.next_pose(ds.time_s);
        agent.update(ds.pose);

        if ds.is_1_hz_cycle {
            match agent.pose() {
                Some(p) => debug!(
                    "Agent at ({:.1}, {:.1}) heading {:.1} deg, {} cycle(s) since last pose",
                    p.position.x,
                    p.position.y,
                    p.heading_rad.to_degrees(),
                    agent.num_consec_missed()
                ),
                None => debug!("No pose received yet"),
            }
        }

        // ---- ALERT PROCESSING ----

        ds.alert_report = alert_engine.step(ds.pose.as_ref(), ds.time_s, actuator.as_mut());

        // ---- WRITE ARCHIVES ----

        if let Some(ref p) = ds.pose {
            if let Err(e) = pose_arch.serialise(PoseRecord::from(p)) {
                warn!("Could not archive pose: {}", e);
            }
        }

        if let Some(ref a) = ds.alert_report.triggered {
            if let Err(e) = alert_arch.serialise(AlertRecord::from(a)) {
                warn!("Could not archive alert: {}", e);
            }
        }

        // ---- STOP CONDITION ----

        if pose_source.is_exhausted() && alert_engine.phase() == AlertPhase::Idle {
            info!("Pose source exhausted, stopping");
            ds.cycle_end();
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    info!(
        "{} cycles, {} poses received, {} of {} turns alerted",
        ds.num_cycles,
        ds.num_poses_received,
        ds.num_alerts,
        alert_engine.turn_points().len()
    );

    session.exit();

    info!("End of execution");

    Ok(())
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl From<&PoseSample> for PoseRecord {
    fn from(p: &PoseSample) -> Self {
        Self {
            time_s: p.time_s,
            x: p.position.x,
            y: p.position.y,
            heading_rad: p.heading_rad,
        }
    }
}

impl From<&ActiveAlert> for AlertRecord {
    fn from(a: &ActiveAlert) -> Self {
        Self {
            time_s: a.trigger_time_s,
            turn_idx: a.turn_idx,
            direction: a.direction,
            angle_deg: a.angle_deg,
            distance: a.distance,
            level: a.level,
        }
    }
}
