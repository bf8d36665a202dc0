//! Pose-graph search
//!
//! A* over the discrete pose space {(x, y, heading)}, memoising the
//! resulting paths, leg costs and per-edge motion primitives in the solver's
//! tables.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

// Internal
use comms_if::moto::Motion;
use comms_if::nav::Direction;

use super::{Neighbour, Solver};
use crate::arena::Pose;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Solver {
    /// A* search between two poses, recording the result in the path and
    /// cost tables. Re-searching a known pair is a no-op.
    ///
    /// `end_penalty` is the goal pose's viewing penalty, charged when the
    /// goal is entered.
    pub(crate) fn astar_search(&mut self, start: Pose, end: Pose, end_penalty: u64) {
        if self.path_table.contains_key(&(start, end)) {
            return;
        }

        let mut g_dist: HashMap<Pose, u64> = HashMap::new();
        g_dist.insert(start, 0);

        let mut visited: HashSet<Pose> = HashSet::new();
        let mut parent: HashMap<Pose, Pose> = HashMap::new();

        // Min-heap on (f, x, y, heading); ties on f resolve by (x, y,
        // heading) ascending
        let mut open = BinaryHeap::new();
        open.push(Reverse((
            estimate_distance(start, end),
            start.x,
            start.y,
            start.dir,
        )));

        while let Some(Reverse((_, x, y, dir))) = open.pop() {
            let pose = Pose { x, y, dir };

            if visited.contains(&pose) {
                continue;
            }

            if pose == end {
                self.record_path(start, end, &parent, g_dist[&pose]);
                return;
            }

            visited.insert(pose);
            let dist = g_dist[&pose];

            for nb in self.neighbours(pose) {
                if visited.contains(&nb.pose) {
                    continue;
                }

                if !self.motion_table.contains_key(&(pose, nb.pose))
                    && !self.motion_table.contains_key(&(nb.pose, pose))
                {
                    self.motion_table.insert((pose, nb.pose), nb.motion);
                }

                let motion_cost = self.params.turn_factor * Direction::turn_cost(dir, nb.pose.dir)
                    + self.params.reverse_factor * nb.motion.reverse_cost()
                    + nb.safe_cost;

                let goal_penalty = if nb.pose == end { end_penalty } else { 0 };
                let tentative = dist + motion_cost + goal_penalty;

                if g_dist.get(&nb.pose).map_or(true, |&g| g > tentative) {
                    g_dist.insert(nb.pose, tentative);
                    open.push(Reverse((
                        tentative + estimate_distance(nb.pose, end),
                        nb.pose.x,
                        nb.pose.y,
                        nb.pose.dir,
                    )));
                    parent.insert(nb.pose, pose);
                }
            }
        }
    }

    /// Poses reachable from `pose` with a single primitive, cached per
    /// pose.
    pub(crate) fn neighbours(&mut self, pose: Pose) -> Vec<Neighbour> {
        if let Some(cached) = self.neighbour_cache.get(&pose) {
            return cached.clone();
        }

        let mut neighbours = Vec::new();
        let (big, small) = self.params.turn_displacement;

        for &heading in Direction::CARDINALS.iter() {
            if heading == pose.dir {
                // Straight steps along the current heading
                let (dx, dy) = heading.unit_vec();

                let straights = [
                    (pose.x + dx, pose.y + dy, Motion::Forward),
                    (pose.x - dx, pose.y - dy, Motion::Reverse),
                ];

                for &(nx, ny, motion) in straights.iter() {
                    if self.arena.reachable(nx, ny) {
                        neighbours.push(Neighbour {
                            pose: Pose {
                                x: nx,
                                y: ny,
                                dir: heading,
                            },
                            safe_cost: self.safe_cost(nx, ny),
                            motion,
                        });
                    }
                }
            } else {
                // 3-point turn arcs into the new heading
                for (nx, ny, motion) in turn_targets(pose, heading, big, small) {
                    if self
                        .arena
                        .turn_reachable(pose.x, pose.y, nx, ny, pose.dir)
                    {
                        neighbours.push(Neighbour {
                            pose: Pose {
                                x: nx,
                                y: ny,
                                dir: heading,
                            },
                            safe_cost: self.safe_cost(nx, ny),
                            motion,
                        });
                    }
                }
            }
        }

        self.neighbour_cache.insert(pose, neighbours.clone());
        neighbours
    }

    /// Proximity shaping: the full safe cost if any obstacle lies within
    /// the padding on both axes of the destination cell, else zero.
    fn safe_cost(&self, x: i32, y: i32) -> u64 {
        let close = self.arena.obstacles().iter().any(|ob| {
            (ob.x - x).abs() <= self.params.padding && (ob.y - y).abs() <= self.params.padding
        });

        if close {
            self.params.safe_cost
        } else {
            0
        }
    }

    /// Store the reconstructed path and its cost for both orientations of
    /// the endpoint pair.
    fn record_path(&mut self, start: Pose, end: Pose, parent: &HashMap<Pose, Pose>, cost: u64) {
        self.cost_table.insert((start, end), cost);
        self.cost_table.insert((end, start), cost);

        let mut path = Vec::new();
        let mut pointer = end;
        while let Some(&prev) = parent.get(&pointer) {
            path.push(pointer);
            pointer = prev;
        }
        path.push(pointer);

        self.path_table.insert((end, start), path.clone());
        path.reverse();
        self.path_table.insert((start, end), path);
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Manhattan distance between two poses; heading is ignored.
fn estimate_distance(a: Pose, b: Pose) -> u64 {
    ((a.x - b.x).abs() + (a.y - b.y).abs()) as u64
}

/// The two arc destinations for a 90 degree heading change, paired with the
/// primitive that drives each.
///
/// `big` and `small` are the long and short axis displacements of the arc.
/// Opposed heading pairs have no arc and yield nothing.
fn turn_targets(pose: Pose, to: Direction, big: i32, small: i32) -> Vec<(i32, i32, Motion)> {
    let (x, y) = (pose.x, pose.y);

    match (pose.dir, to) {
        (Direction::North, Direction::East) => vec![
            (x + big, y + small, Motion::ForwardRightTurn),
            (x - small, y - big, Motion::ReverseLeftTurn),
        ],
        (Direction::East, Direction::North) => vec![
            (x + small, y + big, Motion::ForwardLeftTurn),
            (x - big, y - small, Motion::ReverseRightTurn),
        ],
        (Direction::East, Direction::South) => vec![
            (x + small, y - big, Motion::ForwardRightTurn),
            (x - big, y + small, Motion::ReverseLeftTurn),
        ],
        (Direction::South, Direction::East) => vec![
            (x + big, y - small, Motion::ForwardLeftTurn),
            (x - small, y + big, Motion::ReverseRightTurn),
        ],
        (Direction::South, Direction::West) => vec![
            (x - big, y - small, Motion::ForwardRightTurn),
            (x + small, y + big, Motion::ReverseLeftTurn),
        ],
        (Direction::West, Direction::South) => vec![
            (x - small, y - big, Motion::ForwardLeftTurn),
            (x + big, y + small, Motion::ReverseRightTurn),
        ],
        (Direction::West, Direction::North) => vec![
            (x - small, y + big, Motion::ForwardRightTurn),
            (x + big, y - small, Motion::ReverseLeftTurn),
        ],
        (Direction::North, Direction::West) => vec![
            (x - big, y + small, Motion::ForwardLeftTurn),
            (x + small, y - big, Motion::ReverseRightTurn),
        ],
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::arena::Arena;
    use crate::params::NavParams;

    fn solver() -> Solver {
        let params = NavParams::default();
        let arena = Arena::new(&params);
        let start = Pose {
            x: 1,
            y: 1,
            dir: Direction::North,
        };
        Solver::new(arena, start, &params)
    }

    #[test]
    fn test_straight_line_path() {
        let mut solver = solver();
        let start = Pose {
            x: 1,
            y: 1,
            dir: Direction::North,
        };
        let end = Pose {
            x: 1,
            y: 5,
            dir: Direction::North,
        };

        solver.astar_search(start, end, 0);

        let path = &solver.path_table[&(start, end)];
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), end);

        // Forward steps only, no turns, no obstacles: zero accumulated cost
        assert_eq!(solver.cost_table[&(start, end)], 0);
    }

    #[test]
    fn test_cost_table_symmetric() {
        let mut solver = solver();
        let start = Pose {
            x: 1,
            y: 1,
            dir: Direction::North,
        };
        let end = Pose {
            x: 8,
            y: 9,
            dir: Direction::West,
        };

        solver.astar_search(start, end, 0);

        assert_eq!(
            solver.cost_table[&(start, end)],
            solver.cost_table[&(end, start)]
        );

        let forward = &solver.path_table[&(start, end)];
        let mut backward = solver.path_table[&(end, start)].clone();
        backward.reverse();
        assert_eq!(*forward, backward);
    }

    #[test]
    fn test_goal_penalty_recorded() {
        let mut solver = solver();
        let start = Pose {
            x: 1,
            y: 1,
            dir: Direction::North,
        };
        let end = Pose {
            x: 1,
            y: 4,
            dir: Direction::North,
        };

        solver.astar_search(start, end, 100);

        assert_eq!(solver.cost_table[&(start, end)], 100);
    }

    #[test]
    fn test_search_same_pose() {
        let mut solver = solver();
        let pose = Pose {
            x: 4,
            y: 4,
            dir: Direction::East,
        };

        solver.astar_search(pose, pose, 0);

        assert_eq!(solver.path_table[&(pose, pose)], vec![pose]);
        assert_eq!(solver.cost_table[&(pose, pose)], 0);
    }

    #[test]
    fn test_neighbours_have_no_heading_flip() {
        let mut solver = solver();

        for &dir in Direction::CARDINALS.iter() {
            let pose = Pose { x: 9, y: 9, dir };

            for nb in solver.neighbours(pose) {
                assert_ne!(
                    Direction::turn_cost(dir, nb.pose.dir),
                    2,
                    "neighbour reversed its heading in one step"
                );
            }
        }
    }

    #[test]
    fn test_neighbours_in_open_space() {
        let mut solver = solver();
        let pose = Pose {
            x: 9,
            y: 9,
            dir: Direction::North,
        };

        let neighbours = solver.neighbours(pose);

        // Two straight steps plus two arcs for each of the three other
        // headings... but only 90 degree changes are legal, so two headings
        // contribute
        let straights = neighbours
            .iter()
            .filter(|nb| nb.pose.dir == Direction::North)
            .count();
        let arcs = neighbours.len() - straights;

        assert_eq!(straights, 2);
        assert_eq!(arcs, 4);
    }

    #[test]
    fn test_safe_cost_near_obstacle() {
        let params = NavParams::default();
        let mut arena = Arena::new(&params);
        arena.add_obstacle(crate::arena::Obstacle {
            x: 10,
            y: 10,
            face: Direction::North,
            id: 1,
        });

        let solver = Solver::new(
            arena,
            Pose {
                x: 1,
                y: 1,
                dir: Direction::North,
            },
            &params,
        );

        assert_eq!(solver.safe_cost(10, 12), 1000);
        assert_eq!(solver.safe_cost(12, 12), 1000);
        assert_eq!(solver.safe_cost(13, 10), 0);
        assert_eq!(solver.safe_cost(1, 1), 0);
    }

    #[test]
    fn test_turn_targets_match_arc_table() {
        let pose = Pose {
            x: 5,
            y: 5,
            dir: Direction::North,
        };

        assert_eq!(
            turn_targets(pose, Direction::East, 2, 1),
            vec![
                (7, 6, Motion::ForwardRightTurn),
                (4, 3, Motion::ReverseLeftTurn)
            ]
        );

        assert_eq!(
            turn_targets(pose, Direction::West, 2, 1),
            vec![
                (3, 6, Motion::ForwardLeftTurn),
                (6, 3, Motion::ReverseRightTurn)
            ]
        );

        // A heading flip is not a turn
        assert!(turn_targets(pose, Direction::South, 2, 1).is_empty());
    }
}
