//! Solver parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::nav::{ARENA_HEIGHT, ARENA_WIDTH};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tunable parameters of the navigation solver.
///
/// All distances are in grid cells (1 cell = 10 cm) unless noted otherwise.
/// Defaults match the values tuned on the robot; a TOML file containing any
/// subset of the fields can be loaded with [`util::params::load`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavParams {
    /// Number of cells along the arena x axis.
    pub arena_width: i32,

    /// Number of cells along the arena y axis.
    pub arena_height: i32,

    /// Cells occupied by an obstacle.
    pub obstacle_size: i32,

    /// Robot half-extent from its centre cell.
    pub robot_offset: i32,

    /// Clearance multiplier applied to the padding radii.
    pub expanded_cell: i32,

    /// Clearance radius for straight motion.
    pub padding: i32,

    /// Clearance radius around the endpoints of a turn arc.
    pub turn_padding: f64,

    /// Clearance radius around the sampled interior points of a turn arc.
    pub mid_turn_padding: f64,

    /// Minimum front-of-robot gap needed to view an obstacle.
    pub min_clearance: i32,

    /// Cost multiplier per 90 degree rotation.
    pub turn_factor: u64,

    /// Cost multiplier for reversing primitives.
    pub reverse_factor: u64,

    /// Cost added when a step lands within `padding` of an obstacle.
    pub safe_cost: u64,

    /// Penalty for off-centre viewing poses.
    pub screenshot_cost: u64,

    /// Penalty for a non-ideal viewing distance.
    pub distance_cost: u64,

    /// Budget of viewpoint combinations explored per obstacle subset.
    pub iterations: u32,

    /// Long and short axis displacements of a 3-point turn arc.
    pub turn_displacement: (i32, i32),

    /// Speed for straight-line commands (0-100).
    pub straight_speed: u32,

    /// Speed for turn manoeuvres (0-100).
    pub turn_speed: u32,

    /// Emit a distance-calibration command pair before centre-aligned
    /// captures.
    pub use_distance_calibration: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for NavParams {
    fn default() -> Self {
        let robot_offset = 1;
        let expanded_cell = 1;

        // Paddings derive from the robot's half-extent plus one clearance
        // cell
        let padding = (robot_offset + 1) * expanded_cell;

        NavParams {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            obstacle_size: 1,
            robot_offset,
            expanded_cell,
            padding,
            turn_padding: padding as f64,
            mid_turn_padding: padding as f64,
            min_clearance: 1,
            turn_factor: 5,
            reverse_factor: 0,
            safe_cost: 1000,
            screenshot_cost: 100,
            distance_cost: 1000,
            iterations: 5000,
            turn_displacement: (2, 1),
            straight_speed: 50,
            turn_speed: 30,
            use_distance_calibration: false,
        }
    }
}
