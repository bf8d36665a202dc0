//! Main navigation executable entry point.
//!
//! Runs one pathfinding solve end to end: either a request loaded from a
//! JSON file given on the command line, or the built-in demonstration
//! arena. The resulting path and command stream are logged and saved into
//! the session directory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::eyre::{Result, WrapErr};
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use comms_if::nav::{Direction, ObstacleSpec, PathRequest};
use nav_lib::params::NavParams;
use nav_lib::solve;
use util::logger::{logger_init, LevelFilter};
use util::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec", about = "Arena navigation path solver")]
struct Opt {
    /// Path to a TOML parameter file overriding the built-in defaults
    #[structopt(long)]
    params: Option<PathBuf>,

    /// Path to a JSON pathfinding request; the demonstration arena is used
    /// when not given
    #[structopt(long)]
    request: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // Initialise session and logger
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to start the session")?;
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Load parameters
    let params: NavParams = match &opt.params {
        Some(path) => util::params::load(path).wrap_err("Failed to load parameters")?,
        None => NavParams::default(),
    };

    // Load or build the request
    let request = match &opt.request {
        Some(path) => {
            let json = std::fs::read_to_string(path).wrap_err("Failed to read the request")?;
            serde_json::from_str(&json).wrap_err("Failed to parse the request")?
        }
        None => demo_request(),
    };

    request.validate().wrap_err("Invalid request")?;

    info!("Solving for {} obstacles", request.obstacles.len());
    for ob in &request.obstacles {
        info!("    Obstacle {}: ({}, {}) facing {:?}", ob.id, ob.x, ob.y, ob.d);
    }

    let response = solve(&request, &params)?;

    info!(
        "Cost {:.1}, {} poses, runtime {:.3}s",
        response.cost,
        response.path.len(),
        response.runtime
    );
    info!("Commands ({}):", response.commands.len());
    for (i, cmd) in response.commands.iter().enumerate() {
        info!("    [{:2}] {}", i + 1, cmd);
    }

    session.save("solve/response.json", &response);

    Ok(())
}

/// The five-obstacle demonstration arena.
fn demo_request() -> PathRequest {
    PathRequest {
        robot_x: 1,
        robot_y: 1,
        robot_dir: Direction::North,
        obstacles: vec![
            ObstacleSpec { x: 0, y: 17, d: Direction::East, id: 1 },
            ObstacleSpec { x: 5, y: 12, d: Direction::South, id: 2 },
            ObstacleSpec { x: 7, y: 5, d: Direction::North, id: 3 },
            ObstacleSpec { x: 15, y: 2, d: Direction::West, id: 4 },
            ObstacleSpec { x: 11, y: 14, d: Direction::East, id: 5 },
        ],
    }
}
