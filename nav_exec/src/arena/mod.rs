//! # Arena model
//!
//! The discretised arena: grid bounds plus the obstacle set, answering the
//! reachability and turn-clearance queries used by the pose-graph search.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod obstacle;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::nav::Direction;
use serde::Serialize;

// Internal
use crate::params::NavParams;

pub use obstacle::{Obstacle, Viewpoint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A robot position and heading on the arena grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pose {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
}

/// The arena: grid bounds plus the obstacle set.
///
/// Obstacles are kept sorted by (x, y) so that any permutation of the input
/// list produces the same solve.
#[derive(Debug, Clone)]
pub struct Arena {
    size_x: i32,
    size_y: i32,
    obstacles: Vec<Obstacle>,
    params: NavParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Arena {
    /// Create an empty arena with the parameterised grid size.
    pub fn new(params: &NavParams) -> Self {
        Arena {
            size_x: params.arena_width,
            size_y: params.arena_height,
            obstacles: Vec::new(),
            params: params.clone(),
        }
    }

    /// Add an obstacle, silently dropping duplicates at the same cell and
    /// face.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        if self
            .obstacles
            .iter()
            .any(|ob| ob.same_placement(&obstacle))
        {
            return;
        }

        self.obstacles.push(obstacle);
        self.obstacles.sort_by_key(|ob| (ob.x, ob.y));
    }

    /// Remove all obstacles.
    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Look up an obstacle by its request id.
    pub fn find_obstacle_by_id(&self, id: u32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|ob| ob.id == id)
    }

    /// True if (x, y) lies strictly inside the arena border.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        0 < x && x < self.size_x - 1 && 0 < y && y < self.size_y - 1
    }

    /// True if the robot centre can safely occupy (x, y).
    ///
    /// Requires the interior bound and, for every obstacle, a Manhattan
    /// distance greater than the padding together with a Chebyshev distance
    /// of at least the padding.
    pub fn reachable(&self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }

        self.obstacles.iter().all(|ob| {
            let dx = (ob.x - x).abs();
            let dy = (ob.y - y).abs();

            dx + dy > self.params.padding && dx.max(dy) >= self.params.padding
        })
    }

    /// True if a 3-point turn arc from (x, y) facing `dir` to
    /// (new_x, new_y) can be swept without clipping an obstacle.
    ///
    /// Both endpoints are checked against the turn padding, and three
    /// sampled points on the arc interior against the mid-turn padding.
    pub fn turn_reachable(&self, x: i32, y: i32, new_x: i32, new_y: i32, dir: Direction) -> bool {
        if !self.in_bounds(x, y) || !self.in_bounds(new_x, new_y) {
            return false;
        }

        let samples = match turn_arc_samples(x, y, new_x, new_y, dir) {
            Some(s) => s,
            None => return false,
        };

        self.obstacles.iter().all(|ob| {
            euclid(ob.x - x, ob.y - y) >= self.params.turn_padding
                && euclid(ob.x - new_x, ob.y - new_y) >= self.params.turn_padding
                && samples.iter().all(|&(px, py)| {
                    euclid_f(ob.x as f64 - px, ob.y as f64 - py) >= self.params.mid_turn_padding
                })
        })
    }

    /// Viewing poses for every visitable obstacle: one (possibly empty)
    /// group per non-skip obstacle, in sorted obstacle order.
    pub fn viewpoints(&self) -> Vec<Vec<Viewpoint>> {
        self.obstacles
            .iter()
            .filter(|ob| ob.face != Direction::Skip)
            .map(|ob| {
                ob.view_candidates(&self.params)
                    .into_iter()
                    .filter(|vp| self.reachable(vp.pose.x, vp.pose.y))
                    .collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn euclid(dx: i32, dy: i32) -> f64 {
    (((dx * dx) + (dy * dy)) as f64).sqrt()
}

fn euclid_f(dx: f64, dy: f64) -> f64 {
    (dx * dx + dy * dy).sqrt()
}

/// Three points near the curve swept by the robot during a 3-point turn.
///
/// Built from the midpoint M of the two endpoints and the right-angle
/// vertex R of the enclosing L shape: one point pulled from M halfway
/// towards the start, the midpoint of R and M, and one point pulled from M
/// halfway towards the end.
fn turn_arc_samples(
    x: i32,
    y: i32,
    new_x: i32,
    new_y: i32,
    dir: Direction,
) -> Option<[(f64, f64); 3]> {
    let (x, y) = (x as f64, y as f64);
    let (new_x, new_y) = (new_x as f64, new_y as f64);
    let (mid_x, mid_y) = ((x + new_x) / 2.0, (y + new_y) / 2.0);

    match dir {
        Direction::North | Direction::South => {
            let (tr_x, tr_y) = (x, new_y);
            Some([
                ((x + mid_x) / 2.0, mid_y),
                ((tr_x + mid_x) / 2.0, (tr_y + mid_y) / 2.0),
                (mid_x, (new_y + mid_y) / 2.0),
            ])
        }
        Direction::East | Direction::West => {
            let (tr_x, tr_y) = (new_x, y);
            Some([
                (mid_x, (y + mid_y) / 2.0),
                ((tr_x + mid_x) / 2.0, (tr_y + mid_y) / 2.0),
                ((new_x + mid_x) / 2.0, mid_y),
            ])
        }
        Direction::Skip => None,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::NavParams;

    fn arena_with(obstacles: &[(i32, i32, Direction, u32)]) -> Arena {
        let mut arena = Arena::new(&NavParams::default());
        for &(x, y, face, id) in obstacles {
            arena.add_obstacle(Obstacle { x, y, face, id });
        }
        arena
    }

    #[test]
    fn test_bounds() {
        let arena = arena_with(&[]);

        assert!(arena.in_bounds(1, 1));
        assert!(arena.in_bounds(18, 18));
        assert!(!arena.in_bounds(0, 5));
        assert!(!arena.in_bounds(5, 0));
        assert!(!arena.in_bounds(19, 5));
        assert!(!arena.in_bounds(5, 19));
    }

    #[test]
    fn test_reachable_clearance() {
        let arena = arena_with(&[(10, 10, Direction::North, 1)]);

        // Far away from the obstacle
        assert!(arena.reachable(1, 1));

        // On top of and diagonally adjacent to the obstacle
        assert!(!arena.reachable(10, 10));
        assert!(!arena.reachable(11, 11));

        // Axis-aligned two cells away has Manhattan distance equal to the
        // padding, still blocked
        assert!(!arena.reachable(12, 10));
        assert!(!arena.reachable(10, 12));

        // Chebyshev 2 with Manhattan 3 clears both checks
        assert!(arena.reachable(12, 11));
        assert!(arena.reachable(12, 12));

        // Three cells away on one axis
        assert!(arena.reachable(13, 10));
    }

    #[test]
    fn test_duplicate_obstacles_dropped() {
        let arena = arena_with(&[
            (5, 5, Direction::North, 1),
            (5, 5, Direction::North, 2),
            (5, 5, Direction::East, 3),
        ]);

        assert_eq!(arena.obstacles().len(), 2);
    }

    #[test]
    fn test_obstacles_sorted_by_position() {
        let arena = arena_with(&[
            (9, 2, Direction::North, 1),
            (3, 8, Direction::East, 2),
            (3, 1, Direction::South, 3),
        ]);

        let positions: Vec<(i32, i32)> =
            arena.obstacles().iter().map(|ob| (ob.x, ob.y)).collect();
        assert_eq!(positions, vec![(3, 1), (3, 8), (9, 2)]);
    }

    #[test]
    fn test_turn_reachable_empty_arena() {
        let arena = arena_with(&[]);

        // North to east forward arc with the (2, 1) displacement
        assert!(arena.turn_reachable(5, 5, 7, 6, Direction::North));

        // Arc ending outside the interior
        assert!(!arena.turn_reachable(17, 5, 19, 6, Direction::North));
    }

    #[test]
    fn test_turn_blocked_by_obstacle() {
        // Obstacle sits right in the middle of the swept arc
        let arena = arena_with(&[(6, 6, Direction::North, 1)]);

        assert!(!arena.turn_reachable(5, 5, 7, 6, Direction::North));
    }

    #[test]
    fn test_viewpoints_skip_obstacle() {
        let arena = arena_with(&[
            (10, 10, Direction::Skip, 1),
            (5, 5, Direction::East, 2),
        ]);

        // The skip obstacle contributes no viewpoint group at all
        let views = arena.viewpoints();
        assert_eq!(views.len(), 1);
        assert!(views[0].iter().all(|vp| vp.target_id == 2));
    }

    #[test]
    fn test_viewpoints_east_facing() {
        let arena = arena_with(&[(5, 5, Direction::East, 1)]);

        let views = arena.viewpoints();
        assert_eq!(views.len(), 1);

        let poses: Vec<(i32, i32)> = views[0].iter().map(|vp| (vp.pose.x, vp.pose.y)).collect();
        assert_eq!(poses, vec![(8, 6), (8, 4), (9, 5), (8, 5)]);

        // All viewpoints face back at the obstacle
        assert!(views[0].iter().all(|vp| vp.pose.dir == Direction::West));

        // Ideal distance carries no penalty, the close centred pose only the
        // distance penalty
        let penalties: Vec<u64> = views[0].iter().map(|vp| vp.penalty).collect();
        assert_eq!(penalties, vec![1100, 1100, 0, 1000]);
    }
}
