//! # Navigation service interface types
//!
//! The request and response bodies of the pathfinding service. The HTTP
//! wrapper passes these through unchanged: transport belongs to the wrapper,
//! the schema is owned here.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of cells along the arena x axis.
pub const ARENA_WIDTH: i32 = 20;

/// Number of cells along the arena y axis.
pub const ARENA_HEIGHT: i32 = 20;

/// Maximum number of obstacles accepted in a single request.
pub const MAX_OBSTACLES: usize = 8;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A cardinal heading on the arena grid, or `Skip` for an obstacle whose
/// symbol never needs to be viewed.
///
/// Encoded on the wire as 0/2/4/6 for north/east/south/west and 8 for skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Direction {
    North,
    East,
    South,
    West,
    Skip,
}

/// An unrecognised direction code was received.
#[derive(Debug, Error)]
#[error("Invalid direction code {0}, expected one of 0, 2, 4, 6, 8")]
pub struct DirectionError(pub u8);

/// Errors raised by request validation at the service boundary.
///
/// The solver core assumes a validated request, so every check lives here.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Robot position ({0}, {1}) is outside the arena")]
    RobotOutsideArena(i32, i32),

    #[error("Robot heading must be a cardinal direction, got {0:?}")]
    RobotHeadingNotCardinal(Direction),

    #[error("Expected between 1 and 8 obstacles, got {0}")]
    BadObstacleCount(usize),

    #[error("Obstacle {0} position ({1}, {2}) is outside the arena")]
    ObstacleOutsideArena(u32, i32, i32),

    #[error("Obstacle ids must be positive")]
    NonPositiveObstacleId,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single obstacle in a pathfinding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub x: i32,
    pub y: i32,

    /// The direction the obstacle's printed symbol faces outward.
    pub d: Direction,

    pub id: u32,
}

/// Request body for a pathfinding solve.
///
/// The robot fields default to the arena's usual start pose, (1, 1) facing
/// north.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequest {
    #[serde(default = "default_robot_coord")]
    pub robot_x: i32,

    #[serde(default = "default_robot_coord")]
    pub robot_y: i32,

    #[serde(default)]
    pub robot_dir: Direction,

    pub obstacles: Vec<ObstacleSpec>,
}

fn default_robot_coord() -> i32 {
    1
}

/// A single pose in the computed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathState {
    pub x: i32,
    pub y: i32,
    pub d: Direction,

    /// Screenshot tag, set when an image is captured at this pose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
}

/// Response body for a successful solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResponse {
    pub path: Vec<PathState>,
    pub commands: Vec<String>,
    pub cost: f64,
    pub runtime: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Direction {
    /// The four motion headings, in fixed enumeration order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The wire encoding of this direction.
    pub fn code(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 2,
            Direction::South => 4,
            Direction::West => 6,
            Direction::Skip => 8,
        }
    }

    /// True for the four motion headings.
    pub fn is_cardinal(self) -> bool {
        !matches!(self, Direction::Skip)
    }

    /// Unit displacement of a single cell step along this heading.
    pub fn unit_vec(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::Skip => (0, 0),
        }
    }

    /// Minimum number of 90 degree rotations between two headings (0, 1
    /// or 2).
    pub fn turn_cost(from: Direction, to: Direction) -> u64 {
        let diff = (i32::from(from.code() / 2) - i32::from(to.code() / 2)).rem_euclid(4);
        diff.min(4 - diff) as u64
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::North
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        direction.code()
    }
}

impl TryFrom<u8> for Direction {
    type Error = DirectionError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Direction::North),
            2 => Ok(Direction::East),
            4 => Ok(Direction::South),
            6 => Ok(Direction::West),
            8 => Ok(Direction::Skip),
            c => Err(DirectionError(c)),
        }
    }
}

impl PathRequest {
    /// Validate the request against the schema bounds.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.robot_x < 0
            || self.robot_x >= ARENA_WIDTH
            || self.robot_y < 0
            || self.robot_y >= ARENA_HEIGHT
        {
            return Err(RequestError::RobotOutsideArena(self.robot_x, self.robot_y));
        }

        if !self.robot_dir.is_cardinal() {
            return Err(RequestError::RobotHeadingNotCardinal(self.robot_dir));
        }

        if self.obstacles.is_empty() || self.obstacles.len() > MAX_OBSTACLES {
            return Err(RequestError::BadObstacleCount(self.obstacles.len()));
        }

        for ob in &self.obstacles {
            if ob.x < 0 || ob.x >= ARENA_WIDTH || ob.y < 0 || ob.y >= ARENA_HEIGHT {
                return Err(RequestError::ObstacleOutsideArena(ob.id, ob.x, ob.y));
            }
            if ob.id == 0 {
                return Err(RequestError::NonPositiveObstacleId);
            }
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn request(obstacles: Vec<ObstacleSpec>) -> PathRequest {
        PathRequest {
            robot_x: 1,
            robot_y: 1,
            robot_dir: Direction::North,
            obstacles,
        }
    }

    #[test]
    fn test_direction_codes() {
        for &dir in Direction::CARDINALS.iter() {
            assert_eq!(Direction::try_from(dir.code()).unwrap(), dir);
        }
        assert_eq!(Direction::try_from(8).unwrap(), Direction::Skip);
        assert!(Direction::try_from(3).is_err());
    }

    #[test]
    fn test_direction_serde() {
        let json = serde_json::to_string(&Direction::West).unwrap();
        assert_eq!(json, "6");
        assert_eq!(
            serde_json::from_str::<Direction>("4").unwrap(),
            Direction::South
        );
        assert!(serde_json::from_str::<Direction>("5").is_err());
    }

    #[test]
    fn test_turn_cost() {
        assert_eq!(Direction::turn_cost(Direction::North, Direction::North), 0);
        assert_eq!(Direction::turn_cost(Direction::North, Direction::East), 1);
        assert_eq!(Direction::turn_cost(Direction::North, Direction::West), 1);
        assert_eq!(Direction::turn_cost(Direction::North, Direction::South), 2);
        assert_eq!(Direction::turn_cost(Direction::West, Direction::East), 2);
        assert_eq!(Direction::turn_cost(Direction::East, Direction::South), 1);
    }

    #[test]
    fn test_request_validation() {
        let ob = ObstacleSpec {
            x: 5,
            y: 5,
            d: Direction::East,
            id: 1,
        };

        assert!(request(vec![ob]).validate().is_ok());

        // No obstacles
        assert!(request(vec![]).validate().is_err());

        // Too many obstacles
        let many = (1..=9)
            .map(|id| ObstacleSpec { id, ..ob })
            .collect::<Vec<_>>();
        assert!(request(many).validate().is_err());

        // Obstacle out of bounds
        assert!(request(vec![ObstacleSpec { x: 20, ..ob }]).validate().is_err());

        // Zero id
        assert!(request(vec![ObstacleSpec { id: 0, ..ob }]).validate().is_err());

        // Robot outside the arena
        let mut req = request(vec![ob]);
        req.robot_y = -1;
        assert!(req.validate().is_err());

        // Robot heading must be cardinal
        let mut req = request(vec![ob]);
        req.robot_dir = Direction::Skip;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_path_state_serde_omits_null_tag() {
        let state = PathState {
            x: 1,
            y: 2,
            d: Direction::North,
            s: None,
        };
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#"{"x":1,"y":2,"d":0}"#
        );

        let tagged = PathState {
            s: Some("3_C".into()),
            ..state
        };
        assert_eq!(
            serde_json::to_string(&tagged).unwrap(),
            r#"{"x":1,"y":2,"d":0,"s":"3_C"}"#
        );
    }
}
