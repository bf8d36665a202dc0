//! Obstacles and their viewing poses

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::nav::{Direction, ObstacleSpec};
use serde::Serialize;

// Internal
use super::Pose;
use crate::params::NavParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An obstacle cell together with the direction its printed symbol faces.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Obstacle {
    pub x: i32,
    pub y: i32,
    pub face: Direction,
    pub id: u32,
}

/// A pose from which an obstacle's symbol can be photographed, with the
/// penalty charged for ending a leg there.
#[derive(Debug, Clone, Copy)]
pub struct Viewpoint {
    pub pose: Pose,

    /// Id of the obstacle this viewpoint faces.
    pub target_id: u32,

    /// Extra cost added when this pose is entered as a leg's goal.
    pub penalty: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Obstacle {
    pub fn from_spec(spec: &ObstacleSpec) -> Self {
        Obstacle {
            x: spec.x,
            y: spec.y,
            face: spec.d,
            id: spec.id,
        }
    }

    /// True if `other` occupies the same cell with the same face.
    pub fn same_placement(&self, other: &Obstacle) -> bool {
        self.x == other.x && self.y == other.y && self.face == other.face
    }

    /// Candidate camera poses for this obstacle, before reachability
    /// filtering.
    ///
    /// Four candidates per face, all heading back at the symbol: camera left
    /// of centre, camera right of centre, the ideal centred pose one cell
    /// further back, and the close centred pose. Enumeration order is fixed;
    /// downstream tie-breaks depend on it.
    pub fn view_candidates(&self, params: &NavParams) -> Vec<Viewpoint> {
        // Along-axis gap between robot centre and obstacle centre
        let gap = params.min_clearance + params.obstacle_size + params.robot_offset;

        let off_centre = params.screenshot_cost + params.distance_cost;
        let close_up = params.distance_cost;

        let candidates: [(i32, i32, Direction, u64); 4] = match self.face {
            Direction::North => [
                (self.x - 1, self.y + gap, Direction::South, off_centre),
                (self.x + 1, self.y + gap, Direction::South, off_centre),
                (self.x, self.y + gap + 1, Direction::South, 0),
                (self.x, self.y + gap, Direction::South, close_up),
            ],
            Direction::South => [
                (self.x + 1, self.y - gap, Direction::North, off_centre),
                (self.x - 1, self.y - gap, Direction::North, off_centre),
                (self.x, self.y - gap - 1, Direction::North, 0),
                (self.x, self.y - gap, Direction::North, close_up),
            ],
            Direction::East => [
                (self.x + gap, self.y + 1, Direction::West, off_centre),
                (self.x + gap, self.y - 1, Direction::West, off_centre),
                (self.x + gap + 1, self.y, Direction::West, 0),
                (self.x + gap, self.y, Direction::West, close_up),
            ],
            Direction::West => [
                (self.x - gap, self.y + 1, Direction::East, off_centre),
                (self.x - gap, self.y - 1, Direction::East, off_centre),
                (self.x - gap - 1, self.y, Direction::East, 0),
                (self.x - gap, self.y, Direction::East, close_up),
            ],
            Direction::Skip => return Vec::new(),
        };

        candidates
            .iter()
            .map(|&(x, y, dir, penalty)| Viewpoint {
                pose: Pose { x, y, dir },
                target_id: self.id,
                penalty,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
