//! Visit-order solving
//!
//! Chooses one viewing pose per obstacle and the order in which to visit
//! them, preferring obstacle subsets that cover as much of the arena's
//! symbols as possible.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use ndarray::Array2;

// Internal
use comms_if::nav::Direction;

use super::{tsp, PlanError, PlannedPose, Solver};
use crate::arena::{Obstacle, Pose, Viewpoint};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Sentinel cost for endpoint pairs with no recorded path.
const UNREACHED: f64 = 1e9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A node of the visit graph: the start pose, or one selected viewpoint.
#[derive(Debug, Clone, Copy)]
struct VisitState {
    pose: Pose,
    penalty: u64,
    target: Option<u32>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Solver {
    /// Compute the minimum-cost path visiting one viewing pose per
    /// obstacle, together with its cost.
    ///
    /// Obstacle subsets are tried in popcount-descending mask order, so the
    /// solver prefers visiting every obstacle and degrades to smaller
    /// subsets only when no wider one admits a path. Returns
    /// [`PlanError::NoPathFound`] when every subset fails.
    pub fn optimal_path(&mut self) -> Result<(Vec<PlannedPose>, f64), PlanError> {
        let views = self.arena.viewpoints();
        let num_views = views.len();

        let mut best_cost = UNREACHED;
        let mut best_path: Vec<PlannedPose> = Vec::new();

        for mask in visit_masks(num_views) {
            // The selected viewpoint groups, and the flattened endpoint
            // sequence starting at the robot pose
            let mut visit_states = vec![VisitState {
                pose: self.start,
                penalty: 0,
                target: None,
            }];
            let mut selected_groups: Vec<&[Viewpoint]> = Vec::new();

            for (i, group) in views.iter().enumerate() {
                if mask & (1u32 << (num_views - 1 - i)) != 0 {
                    selected_groups.push(group.as_slice());
                    visit_states.extend(group.iter().map(|vp| VisitState {
                        pose: vp.pose,
                        penalty: vp.penalty,
                        target: Some(vp.target_id),
                    }));
                }
            }

            debug!(
                "Visit mask {:#010b}: {} endpoint poses",
                mask,
                visit_states.len()
            );

            // Fill the path and cost tables for every endpoint pair
            for i in 0..visit_states.len() {
                for j in (i + 1)..visit_states.len() {
                    let (a, b) = (visit_states[i], visit_states[j]);
                    self.astar_search(a.pose, b.pose, b.penalty);
                }
            }

            let mut budget = self.params.iterations;
            let combinations = view_combinations(&selected_groups, &mut budget);

            for combination in &combinations {
                // Indices into visit_states of the chosen viewpoints, with
                // the accumulated viewing penalties
                let mut chosen = vec![0usize];
                let mut penalty_sum = 0u64;
                let mut next_idx = 1usize;

                for (group_idx, group) in selected_groups.iter().enumerate() {
                    let pick = combination[group_idx];
                    chosen.push(next_idx + pick);
                    penalty_sum += group[pick].penalty;
                    next_idx += group.len();
                }

                let n = chosen.len();
                let mut cost_matrix = Array2::<f64>::zeros((n, n));

                for a in 0..n.saturating_sub(1) {
                    for b in (a + 1)..n {
                        let key = (visit_states[chosen[a]].pose, visit_states[chosen[b]].pose);
                        let leg = self
                            .cost_table
                            .get(&key)
                            .map(|&c| c as f64)
                            .unwrap_or(UNREACHED);

                        cost_matrix[[a, b]] = leg;
                        cost_matrix[[b, a]] = leg;
                    }
                }

                // Open tour: ending anywhere is free
                cost_matrix.column_mut(0).fill(0.0);

                let (permutation, distance) = tsp::solve_open_tour(&cost_matrix);
                let total = distance + penalty_sum as f64;

                if total >= best_cost {
                    continue;
                }

                best_cost = total;
                best_path = self.stitch_path(&visit_states, &chosen, &permutation)?;
            }

            // The first mask whose exploration produced a path wins
            if !best_path.is_empty() {
                if (mask.count_ones() as usize) < num_views {
                    warn!(
                        "Only {} of {} obstacles are visitable",
                        mask.count_ones(),
                        num_views
                    );
                }
                break;
            }
        }

        if best_path.is_empty() {
            return Err(PlanError::NoPathFound);
        }

        Ok((best_path, best_cost))
    }

    /// Concatenate the memoised leg paths in tour order, re-attaching a
    /// screenshot tag to the final pose of each leg.
    fn stitch_path(
        &self,
        visit_states: &[VisitState],
        chosen: &[usize],
        permutation: &[usize],
    ) -> Result<Vec<PlannedPose>, PlanError> {
        let mut path = vec![PlannedPose {
            pose: visit_states[0].pose,
            screenshot: None,
        }];

        for leg in permutation.windows(2) {
            let from = visit_states[chosen[leg[0]]];
            let to = visit_states[chosen[leg[1]]];

            let leg_path = &self.path_table[&(from.pose, to.pose)];
            path.extend(leg_path.iter().skip(1).map(|&pose| PlannedPose {
                pose,
                screenshot: None,
            }));

            if let Some(target_id) = to.target {
                let obstacle = self
                    .arena
                    .find_obstacle_by_id(target_id)
                    .ok_or(PlanError::UnknownObstacle(target_id))?;

                if let Some(last) = path.last_mut() {
                    let rel = capture_relative_position(last.pose, obstacle)?;
                    last.screenshot = Some(format!("{}_{}", target_id, rel));
                }
            }
        }

        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// All non-empty obstacle subset masks, widest subsets first.
///
/// Masks of equal popcount stay in ascending numeric order. Bit i, counted
/// from the most significant bit of the n-bit word, selects obstacle i.
fn visit_masks(n: usize) -> Vec<u32> {
    let mut masks: Vec<u32> = (1..(1u32 << n)).collect();
    masks.sort_by_key(|m| std::cmp::Reverse(m.count_ones()));
    masks
}

/// Every way of picking one viewpoint per selected group, depth-first,
/// bounded by a shared expansion budget.
fn view_combinations(groups: &[&[Viewpoint]], budget: &mut u32) -> Vec<Vec<usize>> {
    let mut current = Vec::new();
    let mut result = Vec::new();
    expand_combinations(groups, 0, &mut current, &mut result, budget);
    result
}

fn expand_combinations(
    groups: &[&[Viewpoint]],
    index: usize,
    current: &mut Vec<usize>,
    result: &mut Vec<Vec<usize>>,
    budget: &mut u32,
) {
    if index == groups.len() {
        result.push(current.clone());
        return;
    }

    if *budget == 0 {
        return;
    }
    *budget -= 1;

    for i in 0..groups[index].len() {
        current.push(i);
        expand_combinations(groups, index + 1, current, result, budget);
        current.pop();
    }
}

/// Relative position letter (C, L or R) of the obstacle as seen from the
/// arrival pose.
fn capture_relative_position(pose: Pose, obstacle: &Obstacle) -> Result<char, PlanError> {
    let (x, y) = (pose.x, pose.y);
    let (ox, oy) = (obstacle.x, obstacle.y);

    match pose.dir {
        Direction::North => Ok(if ox == x && oy > y {
            'C'
        } else if ox < x {
            'L'
        } else {
            'R'
        }),
        Direction::South => Ok(if ox == x && oy < y {
            'C'
        } else if ox < x {
            'R'
        } else {
            'L'
        }),
        Direction::East => Ok(if oy == y && ox > x {
            'C'
        } else if oy < y {
            'R'
        } else {
            'L'
        }),
        Direction::West => Ok(if oy == y && ox < x {
            'C'
        } else if oy < y {
            'L'
        } else {
            'R'
        }),
        Direction::Skip => Err(PlanError::NonCardinalHeading(pose.dir)),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
