//! # Path planning
//!
//! Pose-graph search and visit ordering over the arena. A [`Solver`] owns
//! the memoisation tables for exactly one request; nothing is shared between
//! solves.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod pose_graph;
pub mod tsp;
pub mod visit_order;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::collections::HashMap;
use std::time::Instant;

// Internal
use comms_if::moto::Motion;
use comms_if::nav::{Direction, PathRequest, PathResponse, PathState};

use crate::arena::{Arena, Obstacle, Pose};
use crate::moto_ctrl::CommandGenerator;
use crate::params::NavParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose on the planned path, tagged when an image capture happens there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPose {
    pub pose: Pose,
    pub screenshot: Option<String>,
}

/// A neighbouring pose reachable with a single motion primitive.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Neighbour {
    pub pose: Pose,
    pub safe_cost: u64,
    pub motion: Motion,
}

/// Per-request path solver.
///
/// Holds the arena together with the memoisation tables built up during the
/// solve. The tables are discarded with the solver.
pub struct Solver {
    pub(crate) arena: Arena,
    pub(crate) start: Pose,
    pub(crate) params: NavParams,

    /// Neighbour sets, cached per pose.
    pub(crate) neighbour_cache: HashMap<Pose, Vec<Neighbour>>,

    /// Pose sequences between endpoint pairs, stored in both orientations.
    pub(crate) path_table: HashMap<(Pose, Pose), Vec<Pose>>,

    /// Leg costs between endpoint pairs, symmetric.
    pub(crate) cost_table: HashMap<(Pose, Pose), u64>,

    /// Motion primitive driving a directed pose edge, stored once per
    /// unordered pair.
    pub(crate) motion_table: HashMap<(Pose, Pose), Motion>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised during a solve.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// No obstacle subset admits a path; the request is infeasible and the
    /// service layer reports it as unprocessable.
    #[error("No valid path found for the given obstacles")]
    NoPathFound,

    /// A viewpoint referenced an obstacle id missing from the arena.
    #[error("Obstacle with id {0} not found")]
    UnknownObstacle(u32),

    /// The motion table had no entry for an edge of the final path.
    #[error("No motion recorded between {0:?} and {1:?}")]
    MissingMotion(Pose, Pose),

    /// A capture pose carried a heading with no relative-position rule.
    #[error("Cannot compute the capture position for heading {0:?}")]
    NonCardinalHeading(Direction),

    /// A screenshot tag could not be parsed back into an obstacle id.
    #[error("Malformed screenshot tag {0:?}")]
    MalformedTag(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Solver {
    /// Create a solver for the given arena and robot start pose.
    pub fn new(arena: Arena, start: Pose, params: &NavParams) -> Self {
        Solver {
            arena,
            start,
            params: params.clone(),
            neighbour_cache: HashMap::new(),
            path_table: HashMap::new(),
            cost_table: HashMap::new(),
            motion_table: HashMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the full pipeline for one request: choose the visit order, compile
/// the motions and produce the controller command stream.
///
/// The request is assumed to have passed [`PathRequest::validate`].
pub fn solve(request: &PathRequest, params: &NavParams) -> Result<PathResponse, PlanError> {
    let solve_start = Instant::now();

    let mut arena = Arena::new(params);
    for spec in &request.obstacles {
        arena.add_obstacle(Obstacle::from_spec(spec));
    }

    let start = Pose {
        x: request.robot_x,
        y: request.robot_y,
        dir: request.robot_dir,
    };

    let mut solver = Solver::new(arena, start, params);

    let (path, cost) = solver.optimal_path()?;

    let motion_path = solver.motion_path(&path)?;
    let commands = CommandGenerator::new(params).generate(&motion_path, &path);

    let runtime = solve_start.elapsed().as_secs_f64();
    info!("Path found in {:.3}s, cost = {}", runtime, cost);

    let path = path
        .into_iter()
        .map(|p| PathState {
            x: p.pose.x,
            y: p.pose.y,
            d: p.pose.dir,
            s: p.screenshot,
        })
        .collect();

    Ok(PathResponse {
        path,
        commands,
        cost,
        runtime,
    })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::nav::ObstacleSpec;

    fn request(obstacles: Vec<ObstacleSpec>) -> PathRequest {
        PathRequest {
            robot_x: 1,
            robot_y: 1,
            robot_dir: Direction::North,
            obstacles,
        }
    }

    fn five_obstacle_request() -> PathRequest {
        request(vec![
            ObstacleSpec { x: 0, y: 17, d: Direction::East, id: 1 },
            ObstacleSpec { x: 5, y: 12, d: Direction::South, id: 2 },
            ObstacleSpec { x: 7, y: 5, d: Direction::North, id: 3 },
            ObstacleSpec { x: 15, y: 2, d: Direction::West, id: 4 },
            ObstacleSpec { x: 11, y: 14, d: Direction::East, id: 5 },
        ])
    }

    fn snap_tags(response: &PathResponse) -> Vec<String> {
        response
            .commands
            .iter()
            .filter_map(|cmd| cmd.strip_prefix("SNAP").map(String::from))
            .collect()
    }

    /// Every pose of the path lies in the arena interior and every
    /// consecutive pair is a straight step or a legal turn arc.
    fn assert_path_well_formed(response: &PathResponse) {
        for state in &response.path {
            assert!(state.x >= 1 && state.x <= 18, "x out of interior: {}", state.x);
            assert!(state.y >= 1 && state.y <= 18, "y out of interior: {}", state.y);
        }

        for pair in response.path.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let dx = b.x - a.x;
            let dy = b.y - a.y;

            if a.d == b.d {
                let (ux, uy) = a.d.unit_vec();
                assert!(
                    (dx, dy) == (ux, uy) || (dx, dy) == (-ux, -uy),
                    "illegal straight step ({}, {})",
                    dx,
                    dy
                );
            } else {
                assert_eq!(
                    Direction::turn_cost(a.d, b.d),
                    1,
                    "path may not flip heading in one step"
                );
                let (adx, ady) = (dx.abs(), dy.abs());
                assert!(
                    (adx, ady) == (2, 1) || (adx, ady) == (1, 2),
                    "illegal turn displacement ({}, {})",
                    dx,
                    dy
                );
            }
        }
    }

    #[test]
    fn test_single_obstacle() {
        let req = request(vec![ObstacleSpec {
            x: 5,
            y: 5,
            d: Direction::East,
            id: 1,
        }]);

        let response = solve(&req, &NavParams::default()).unwrap();

        assert!(response.cost > 0.0);
        assert!(!response.commands.is_empty());
        assert_eq!(response.commands.last().unwrap(), "FIN");

        let tags = snap_tags(&response);
        assert_eq!(tags.len(), 1);
        assert!(tags[0].starts_with("1_"));

        assert_path_well_formed(&response);
    }

    #[test]
    fn test_two_obstacles_both_scanned() {
        let req = request(vec![
            ObstacleSpec { x: 0, y: 17, d: Direction::East, id: 1 },
            ObstacleSpec { x: 15, y: 2, d: Direction::West, id: 4 },
        ]);

        let response = solve(&req, &NavParams::default()).unwrap();

        let tags = snap_tags(&response);
        assert_eq!(tags.len(), 2);

        // The SNAP order matches the tag order along the returned path
        let path_tags: Vec<String> = response
            .path
            .iter()
            .filter_map(|p| p.s.clone())
            .collect();
        assert_eq!(tags, path_tags);

        assert_path_well_formed(&response);
    }

    #[test]
    fn test_five_obstacles_all_scanned() {
        let response = solve(&five_obstacle_request(), &NavParams::default()).unwrap();

        assert!(response.runtime > 0.0);

        let mut scanned_ids: Vec<u32> = snap_tags(&response)
            .iter()
            .map(|tag| tag.split('_').next().unwrap().parse().unwrap())
            .collect();
        scanned_ids.sort_unstable();
        assert_eq!(scanned_ids, vec![1, 2, 3, 4, 5]);

        // One SNAP per tagged pose
        let tagged = response.path.iter().filter(|p| p.s.is_some()).count();
        assert_eq!(snap_tags(&response).len(), tagged);

        assert_path_well_formed(&response);
    }

    #[test]
    fn test_skip_obstacle_not_scanned() {
        let req = request(vec![
            ObstacleSpec { x: 5, y: 12, d: Direction::Skip, id: 2 },
            ObstacleSpec { x: 7, y: 5, d: Direction::North, id: 3 },
        ]);

        let response = solve(&req, &NavParams::default()).unwrap();

        let tags = snap_tags(&response);
        assert_eq!(tags.len(), 1);
        assert!(tags[0].starts_with("3_"));
    }

    #[test]
    fn test_unreachable_obstacle_is_infeasible() {
        // The robot starts on top of the only obstacle, so neither leaving
        // the start cell nor any viewing leg is possible
        let req = request(vec![ObstacleSpec {
            x: 1,
            y: 1,
            d: Direction::East,
            id: 1,
        }]);

        match solve(&req, &NavParams::default()) {
            Err(PlanError::NoPathFound) => (),
            other => panic!("Expected NoPathFound, got {:?}", other.map(|r| r.cost)),
        }
    }

    #[test]
    fn test_obstacle_order_invariance() {
        let forward = five_obstacle_request();
        let mut reversed = forward.clone();
        reversed.obstacles.reverse();

        let params = NavParams::default();
        let a = solve(&forward, &params).unwrap();
        let b = solve(&reversed, &params).unwrap();

        assert_eq!(a.path, b.path);
        assert_eq!(a.commands, b.commands);
        assert_eq!(a.cost, b.cost);
    }

    #[test]
    fn test_solve_is_idempotent() {
        let req = five_obstacle_request();
        let params = NavParams::default();

        let a = solve(&req, &params).unwrap();
        let b = solve(&req, &params).unwrap();

        assert_eq!(a.path, b.path);
        assert_eq!(a.commands, b.commands);
        assert_eq!(a.cost, b.cost);
    }

    #[test]
    fn test_snap_tags_match_format() {
        let response = solve(&five_obstacle_request(), &NavParams::default()).unwrap();

        for tag in snap_tags(&response) {
            let mut parts = tag.split('_');
            let id = parts.next().unwrap();
            let rel = parts.next().unwrap();

            assert!(id.chars().all(|c| c.is_ascii_digit()));
            assert!(matches!(rel, "C" | "L" | "R"));
            assert!(parts.next().is_none());
        }
    }
}
